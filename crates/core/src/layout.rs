use serde::{Deserialize, Serialize};

use crate::model::span::Span;
use crate::model::trace::Trace;

/// Per-span horizontal placement against total trace duration, both
/// fractions clamped to [0, 1]. Rows preserve the trace's span order;
/// a rendering layer maps them straight to percentage positioning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterfallRow {
    pub span: Span,
    pub left_fraction: f64,
    pub width_fraction: f64,
}

/// Spans in chronological order: `start_ms` ascending, ties broken by
/// `span_id` ascending. Deterministic under any input permutation.
pub fn timeline(trace: &Trace) -> Vec<Span> {
    let mut spans = trace.spans.clone();
    spans.sort_by(|a, b| {
        a.start_ms
            .total_cmp(&b.start_ms)
            .then_with(|| a.span_id.cmp(&b.span_id))
    });
    spans
}

pub fn waterfall(trace: &Trace) -> Vec<WaterfallRow> {
    let total = trace.total_duration_ms;
    trace
        .spans
        .iter()
        .map(|span| {
            // A single-instant trace renders every bar at the origin
            // instead of dividing by zero.
            let (left, width) = if total > 0.0 {
                (
                    (span.start_ms / total).clamp(0.0, 1.0),
                    (span.duration_ms / total).clamp(0.0, 1.0),
                )
            } else {
                (0.0, 0.0)
            };
            WaterfallRow {
                span: span.clone(),
                left_fraction: left,
                width_fraction: width,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::span::SpanStatus;
    use crate::normalize::normalize_trace;

    fn span(id: &str, parent: Option<&str>, start: f64, duration: f64) -> Span {
        Span {
            trace_id: "t1".into(),
            span_id: id.into(),
            parent_span_id: parent.map(Into::into),
            service: "api".into(),
            name: format!("op-{id}"),
            start_ms: start,
            duration_ms: duration,
            status: SpanStatus::Ok,
            tags: BTreeMap::new(),
        }
    }

    fn trace(spans: Vec<Span>) -> Trace {
        normalize_trace(spans).unwrap().trace
    }

    #[test]
    fn timeline_sorts_by_start() {
        let trace = trace(vec![
            span("a", None, 0.0, 100.0),
            span("c", Some("a"), 70.0, 20.0),
            span("b", Some("a"), 10.0, 50.0),
        ]);

        let tl = timeline(&trace);
        let ids: Vec<&str> = tl.iter().map(|s| &*s.span_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn timeline_ties_break_by_span_id() {
        let forward = trace(vec![
            span("a", None, 0.0, 10.0),
            span("z", Some("a"), 5.0, 1.0),
            span("m", Some("a"), 5.0, 1.0),
        ]);
        let tl = timeline(&forward);
        let ids: Vec<&str> = tl.iter().map(|s| &*s.span_id).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);

        // Same batch, permuted input, same projection.
        let permuted = trace(vec![
            span("m", Some("a"), 5.0, 1.0),
            span("a", None, 0.0, 10.0),
            span("z", Some("a"), 5.0, 1.0),
        ]);
        assert_eq!(timeline(&forward), timeline(&permuted));
    }

    #[test]
    fn timeline_is_idempotent_and_leaves_input_alone() {
        let trace = trace(vec![
            span("b", Some("a"), 10.0, 5.0),
            span("a", None, 0.0, 20.0),
        ]);
        let before = trace.spans.clone();
        let first = timeline(&trace);
        let second = timeline(&trace);
        assert_eq!(first, second);
        assert_eq!(trace.spans, before);
    }

    #[test]
    fn waterfall_fractions_match_offsets() {
        let trace = trace(vec![
            span("a", None, 0.0, 100.0),
            span("b", Some("a"), 10.0, 50.0),
            span("c", Some("a"), 70.0, 20.0),
        ]);

        let rows = waterfall(&trace);
        assert_eq!(rows[0].left_fraction, 0.0);
        assert_eq!(rows[0].width_fraction, 1.0);
        assert_eq!(rows[1].left_fraction, 0.10);
        assert_eq!(rows[1].width_fraction, 0.50);
        assert_eq!(rows[2].left_fraction, 0.70);
        assert_eq!(rows[2].width_fraction, 0.20);
    }

    #[test]
    fn waterfall_preserves_input_order() {
        let trace = trace(vec![
            span("c", Some("a"), 70.0, 20.0),
            span("a", None, 0.0, 100.0),
        ]);
        let rows = waterfall(&trace);
        let ids: Vec<&str> = rows.iter().map(|r| &*r.span.span_id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn waterfall_clamps_out_of_range_offsets() {
        // Negative start pushes end_ms below duration, so the span is
        // wider than the whole trace.
        let mut odd = span("odd", Some("a"), 0.0, 100.0);
        odd.start_ms = -50.0;
        let trace = trace(vec![span("a", None, 0.0, 40.0), odd]);

        for row in waterfall(&trace) {
            assert!((0.0..=1.0).contains(&row.left_fraction));
            assert!((0.0..=1.0).contains(&row.width_fraction));
        }
    }

    #[test]
    fn zero_duration_trace_degenerates_to_origin() {
        let trace = trace(vec![span("a", None, 0.0, 0.0)]);
        assert_eq!(trace.total_duration_ms, 0.0);

        let rows = waterfall(&trace);
        assert_eq!(rows[0].left_fraction, 0.0);
        assert_eq!(rows[0].width_fraction, 0.0);
    }
}
