use std::io::IsTerminal;

use owo_colors::OwoColorize;
use tracedeck_core::layout::{timeline, waterfall};
use tracedeck_core::model::span::{Span, SpanStatus};
use tracedeck_core::model::trace::Trace;
use tracedeck_core::normalize::NormalizedTrace;
use tracedeck_core::summary::{TraceSetStats, TraceSummary};
use tracedeck_core::tree::{TreeLayout, build_tree};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceView {
    Waterfall,
    Timeline,
    Spans,
}

pub fn print_traces_human(summaries: &[TraceSummary], stats: &TraceSetStats) {
    for item in summaries {
        println!(
            "trace={} duration={}ms spans={} status={} root=\"{}\" services={}",
            item.trace_id,
            format_ms(item.duration_ms),
            item.span_count,
            status_label(item.status),
            item.root_name,
            item.services.join(",")
        );
    }
    println!(
        "-- {} of {} traces (avg {}ms, {} errors, {} services) --",
        summaries.len(),
        stats.total,
        format_ms(stats.avg_duration_ms),
        stats.error_count,
        stats.service_count
    );
}

pub fn print_trace_human(normalized: &NormalizedTrace, view: TraceView) {
    let trace = &normalized.trace;
    let tree = build_tree(trace);

    println!(
        "TRACE {} duration={}ms spans={} errors={} status={}",
        trace.trace_id,
        format_ms(trace.total_duration_ms),
        trace.spans.len(),
        trace.error_count(),
        status_label(trace.status)
    );
    for anomaly in normalized.anomalies.iter().chain(&tree.anomalies) {
        println!("anomaly {anomaly}");
    }

    match view {
        TraceView::Waterfall => print_waterfall(trace, &tree),
        TraceView::Timeline => print_timeline(trace),
        TraceView::Spans => {
            for span in &trace.spans {
                print_span_human(span);
            }
        }
    }
}

pub fn print_span_human(span: &Span) {
    println!(
        "SPAN {} service={} name={} status={} start=+{}ms duration={}ms",
        span.span_id,
        span.service,
        span.name,
        status_label(span.status),
        format_ms(span.start_ms),
        format_ms(span.duration_ms)
    );
    for (key, value) in &span.tags {
        println!("  {key}={value}");
    }
}

fn print_waterfall(trace: &Trace, tree: &TreeLayout) {
    // Waterfall rows and tree nodes share the trace's span order.
    for (row, node) in waterfall(trace).iter().zip(&tree.nodes) {
        let indent = "  ".repeat(node.depth);
        println!(
            "{}{} {} |{}| {}ms {}",
            indent,
            row.span.service,
            row.span.name,
            bar(row.left_fraction, row.width_fraction),
            format_ms(row.span.duration_ms),
            status_label(row.span.status)
        );
    }
}

fn print_timeline(trace: &Trace) {
    for span in timeline(trace) {
        println!(
            "+{}ms {} {} ({}ms) {}",
            format_ms(span.start_ms),
            span.service,
            span.name,
            format_ms(span.duration_ms),
            status_label(span.status)
        );
    }
}

/// Maps the layout fractions onto a fixed-width gutter. A zero-width
/// span still gets one cell so an instant remains visible.
fn bar(left_fraction: f64, width_fraction: f64) -> String {
    let left = ((left_fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH - 1);
    let width = ((width_fraction * BAR_WIDTH as f64).round() as usize).clamp(1, BAR_WIDTH - left);
    format!(
        "{}{}{}",
        " ".repeat(left),
        "#".repeat(width),
        " ".repeat(BAR_WIDTH - left - width)
    )
}

fn status_label(status: SpanStatus) -> String {
    if std::io::stdout().is_terminal() {
        match status {
            SpanStatus::Ok => "OK".green().to_string(),
            SpanStatus::Error => "ERROR".red().to_string(),
        }
    } else {
        status.to_string()
    }
}

fn format_ms(ms: f64) -> String {
    if ms.fract() == 0.0 {
        format!("{}", ms as i64)
    } else {
        format!("{ms:.2}")
    }
}
