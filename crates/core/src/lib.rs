pub mod anomaly;
pub mod error;
pub mod filter;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod tree;

pub use error::{Result, TracedeckError};
