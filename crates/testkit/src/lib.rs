use std::collections::BTreeMap;

use tracedeck_core::model::span::{Span, SpanStatus};

pub fn span(
    trace_id: &str,
    span_id: &str,
    parent: Option<&str>,
    service: &str,
    name: &str,
    start_ms: f64,
    duration_ms: f64,
    status: SpanStatus,
) -> Span {
    Span {
        trace_id: trace_id.to_string(),
        span_id: span_id.to_string(),
        parent_span_id: parent.map(str::to_string),
        service: service.to_string(),
        name: name.to_string(),
        start_ms,
        duration_ms,
        status,
        tags: BTreeMap::new(),
    }
}

/// A failing request: api root with a slow redis lookup under it.
pub fn sample_trace(trace_id: &str) -> Vec<Span> {
    let mut child = span(
        trace_id,
        "child",
        Some("root"),
        "api",
        "cache.get redis",
        900.0,
        700.0,
        SpanStatus::Error,
    );
    child
        .tags
        .insert("peer".to_string(), "redis:6379".to_string());

    vec![
        span(
            trace_id,
            "root",
            None,
            "api",
            "GET /v1/orders",
            0.0,
            1800.0,
            SpanStatus::Error,
        ),
        child,
    ]
}

/// A healthy three-service fan-out: gateway root, two children.
pub fn branching_trace(trace_id: &str) -> Vec<Span> {
    vec![
        span(
            trace_id,
            "a",
            None,
            "api-gateway",
            "GET /users",
            0.0,
            100.0,
            SpanStatus::Ok,
        ),
        span(
            trace_id,
            "b",
            Some("a"),
            "auth-service",
            "auth.check",
            10.0,
            50.0,
            SpanStatus::Ok,
        ),
        span(
            trace_id,
            "c",
            Some("a"),
            "user-service",
            "db.query",
            70.0,
            20.0,
            SpanStatus::Ok,
        ),
    ]
}

/// Two traces interleaved in one batch, the way a flat export arrives.
pub fn forest_spans() -> Vec<Span> {
    let mut spans = Vec::new();
    let failing = sample_trace("trace-err");
    let healthy = branching_trace("trace-ok");
    spans.push(healthy[0].clone());
    spans.extend(failing);
    spans.extend(healthy.into_iter().skip(1));
    spans
}
