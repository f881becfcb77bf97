use serde::{Deserialize, Serialize};

use crate::model::span::{Span, SpanStatus};

/// A normalized trace: the span batch in received order plus derived
/// facts. Built once by `normalize::normalize_trace`, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    pub trace_id: String,
    pub spans: Vec<Span>,
    pub root_span_id: String,
    pub total_duration_ms: f64,
    pub services: Vec<String>,
    pub status: SpanStatus,
}

impl Trace {
    pub fn span(&self, span_id: &str) -> Option<&Span> {
        self.spans.iter().find(|s| s.span_id == span_id)
    }

    pub fn root_span(&self) -> Option<&Span> {
        self.span(&self.root_span_id)
    }

    pub fn error_count(&self) -> usize {
        self.spans.iter().filter(|s| s.status.is_error()).count()
    }
}
