use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TracedeckError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanStatus {
    #[default]
    Ok,
    Error,
}

impl SpanStatus {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for SpanStatus {
    type Err = TracedeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OK" => Ok(Self::Ok),
            "ERROR" => Ok(Self::Error),
            _ => Err(TracedeckError::Parse(format!("unknown span status: {s}"))),
        }
    }
}

/// One timed unit of work within a trace. Start and duration are
/// millisecond offsets from the trace start, not wall-clock times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub service: String,
    pub name: String,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub status: SpanStatus,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Span {
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}
