use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::span::SpanStatus;
use crate::model::trace::Trace;

/// One trace-list entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceSummary {
    pub trace_id: String,
    pub root_name: String,
    pub duration_ms: f64,
    pub span_count: usize,
    pub services: Vec<String>,
    pub status: SpanStatus,
}

pub fn summarize(trace: &Trace) -> TraceSummary {
    TraceSummary {
        trace_id: trace.trace_id.clone(),
        root_name: trace
            .root_span()
            .map(|s| s.name.clone())
            .unwrap_or_default(),
        duration_ms: trace.total_duration_ms,
        span_count: trace.spans.len(),
        services: trace.services.clone(),
        status: trace.status,
    }
}

/// Aggregates over a set of traces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TraceSetStats {
    pub total: usize,
    pub avg_duration_ms: f64,
    pub error_count: usize,
    pub service_count: usize,
}

pub fn set_stats<'a, I>(traces: I) -> TraceSetStats
where
    I: IntoIterator<Item = &'a Trace>,
{
    let mut total = 0usize;
    let mut duration_sum = 0.0_f64;
    let mut error_count = 0usize;
    let mut services: BTreeSet<&str> = BTreeSet::new();

    for trace in traces {
        total += 1;
        duration_sum += trace.total_duration_ms;
        if trace.status.is_error() {
            error_count += 1;
        }
        services.extend(trace.services.iter().map(String::as_str));
    }

    TraceSetStats {
        total,
        avg_duration_ms: if total > 0 {
            duration_sum / total as f64
        } else {
            0.0
        },
        error_count,
        service_count: services.len(),
    }
}
