use thiserror::Error;

#[derive(Debug, Error)]
pub enum TracedeckError {
    #[error("invalid trace: {0}")]
    InvalidTrace(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, TracedeckError>;
