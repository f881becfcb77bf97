use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracedeck_core::model::span::Span;
use tracedeck_core::normalize::{NormalizedTrace, normalize_trace};

/// Reads a JSON span array from `path` (stdin when `None`) and groups
/// it into normalized traces.
pub fn load_traces(path: Option<&Path>) -> anyhow::Result<Vec<NormalizedTrace>> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed reading stdin")?;
            buf
        }
    };

    let spans: Vec<Span> =
        serde_json::from_str(&raw).context("input is not a JSON span array")?;
    group_traces(spans)
}

/// Splits a flat export into per-trace batches, keeping the first-seen
/// order of trace ids, and normalizes each batch.
pub fn group_traces(spans: Vec<Span>) -> anyhow::Result<Vec<NormalizedTrace>> {
    let span_count = spans.len();
    let mut order: Vec<String> = Vec::new();
    let mut batches: HashMap<String, Vec<Span>> = HashMap::new();
    for span in spans {
        if !batches.contains_key(&span.trace_id) {
            order.push(span.trace_id.clone());
        }
        batches.entry(span.trace_id.clone()).or_default().push(span);
    }

    let mut traces = Vec::with_capacity(order.len());
    for trace_id in &order {
        if let Some(batch) = batches.remove(trace_id) {
            traces.push(normalize_trace(batch)?);
        }
    }

    tracing::debug!(spans = span_count, traces = traces.len(), "loaded span batch");
    Ok(traces)
}
