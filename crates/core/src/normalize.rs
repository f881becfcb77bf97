use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::error::{Result, TracedeckError};
use crate::model::span::{Span, SpanStatus};
use crate::model::trace::Trace;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedTrace {
    pub trace: Trace,
    pub anomalies: Vec<Anomaly>,
}

/// Builds a validated `Trace` from a complete span batch.
///
/// Only structurally unusable input is fatal: an empty batch, or a span
/// whose `trace_id` disagrees with the rest. Everything else (dangling
/// parents, multiple roots, negative durations, cycles) is tolerated
/// and reported as anomalies alongside a best-effort result. Derived
/// fields are always recomputed here, never trusted from input.
pub fn normalize_trace(mut spans: Vec<Span>) -> Result<NormalizedTrace> {
    let Some(first) = spans.first() else {
        return Err(TracedeckError::InvalidTrace("empty span batch".to_string()));
    };
    let trace_id = first.trace_id.clone();

    if let Some(stray) = spans.iter().find(|s| s.trace_id != trace_id) {
        return Err(TracedeckError::InvalidTrace(format!(
            "span {} belongs to trace {}, expected {trace_id}",
            stray.span_id, stray.trace_id
        )));
    }

    let mut anomalies = Vec::new();

    for span in &mut spans {
        if span.duration_ms < 0.0 {
            span.duration_ms = 0.0;
            anomalies.push(Anomaly::NegativeDuration(span.span_id.clone()));
        }
    }

    let ids: HashSet<&str> = spans.iter().map(|s| s.span_id.as_str()).collect();
    for span in &spans {
        if let Some(parent) = span.parent_span_id.as_deref()
            && !ids.contains(parent)
        {
            anomalies.push(Anomaly::DanglingParent(span.span_id.clone()));
        }
    }

    if has_cycle(&spans) {
        anomalies.push(Anomaly::CycleDetected);
    }

    let parentless = spans.iter().filter(|s| s.parent_span_id.is_none()).count();
    if parentless > 1 {
        anomalies.push(Anomaly::MultipleRoots);
    }

    // A batch with no parentless span (all parents dangle, or a cycle)
    // still gets a best-effort root: the earliest starter overall.
    let root = earliest(spans.iter().filter(|s| s.parent_span_id.is_none()))
        .or_else(|| earliest(spans.iter()));
    let Some(root) = root else {
        return Err(TracedeckError::InvalidTrace("empty span batch".to_string()));
    };
    let root_span_id = root.span_id.clone();

    let total_duration_ms = spans.iter().map(Span::end_ms).fold(0.0_f64, f64::max);

    let services: Vec<String> = spans
        .iter()
        .map(|s| s.service.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let status = if spans.iter().any(|s| s.status.is_error()) {
        SpanStatus::Error
    } else {
        SpanStatus::Ok
    };

    Ok(NormalizedTrace {
        trace: Trace {
            trace_id,
            spans,
            root_span_id,
            total_duration_ms,
            services,
            status,
        },
        anomalies,
    })
}

fn earliest<'a>(spans: impl Iterator<Item = &'a Span>) -> Option<&'a Span> {
    spans.min_by(|a, b| {
        a.start_ms
            .total_cmp(&b.start_ms)
            .then_with(|| a.span_id.cmp(&b.span_id))
    })
}

/// Upward parent walks with a shared visited map; each walk is bounded
/// by span count. Hitting a span already on the active walk is a cycle.
fn has_cycle(spans: &[Span]) -> bool {
    let parent_of: HashMap<&str, Option<&str>> = spans
        .iter()
        .map(|s| (s.span_id.as_str(), s.parent_span_id.as_deref()))
        .collect();

    // 1 = on the active walk, 2 = known cycle-free
    let mut state: HashMap<&str, u8> = HashMap::new();
    for span in spans {
        let mut path = Vec::new();
        let mut cur = Some(span.span_id.as_str());
        while let Some(id) = cur {
            match state.get(id).copied() {
                Some(1) => return true,
                Some(_) => break,
                None => {}
            }
            state.insert(id, 1);
            path.push(id);
            // Dangling parents end the walk here.
            cur = parent_of.get(id).copied().flatten();
        }
        for id in path {
            state.insert(id, 2);
        }
    }
    false
}
