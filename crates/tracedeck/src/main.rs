mod input;
mod output;
mod telemetry;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracedeck_core::anomaly::Anomaly;
use tracedeck_core::filter::{TagFilter, TraceFilter};
use tracedeck_core::layout::{WaterfallRow, timeline, waterfall};
use tracedeck_core::model::span::{Span, SpanStatus};
use tracedeck_core::model::trace::Trace;
use tracedeck_core::normalize::NormalizedTrace;
use tracedeck_core::summary::{TraceSetStats, TraceSummary, set_stats, summarize};
use tracedeck_core::tree::{TreeLayout, build_tree};

use crate::input::load_traces;
use crate::output::{TraceView, print_span_human, print_trace_human, print_traces_human};
use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "tracedeck")]
#[command(about = "Local trace waterfall and timeline viewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, help = "Span batch JSON file; stdin when omitted")]
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "List traces in a span batch")]
    Traces {
        #[arg(long, help = "Substring match on trace id or service")]
        search: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long, help = "ok or error")]
        status: Option<String>,
        #[arg(long = "where", help = "Tag filter, key=glob")]
        where_filters: Vec<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    #[command(about = "Inspect one trace")]
    Trace {
        trace_id: String,
        #[arg(long, default_value = "waterfall", help = "waterfall, timeline or spans")]
        view: String,
    },
    #[command(about = "Inspect a specific span")]
    Span { trace_id: String, span_id: String },
}

#[derive(Serialize)]
struct TracesPayload {
    traces: Vec<TraceSummary>,
    stats: TraceSetStats,
}

#[derive(Serialize)]
struct TracePayload<'a> {
    trace: &'a Trace,
    anomalies: &'a [Anomaly],
    tree: TreeLayout,
    timeline: Vec<Span>,
    waterfall: Vec<WaterfallRow>,
}

fn main() -> anyhow::Result<()> {
    init_cli_tracing();
    let cli = Cli::parse();
    let loaded = load_traces(cli.input.as_deref())?;

    match cli.command {
        Commands::Traces {
            search,
            service,
            status,
            where_filters,
            limit,
        } => {
            let filter = TraceFilter {
                query: search,
                service,
                status: status.map(|s| SpanStatus::from_str(&s)).transpose()?,
                tag_filters: where_filters
                    .iter()
                    .map(|f| TagFilter::parse(f))
                    .collect::<tracedeck_core::Result<Vec<_>>>()?,
            };

            // Stats cover the whole batch; the filter only narrows the list.
            let stats = set_stats(loaded.iter().map(|n| &n.trace));
            let summaries: Vec<TraceSummary> = loaded
                .iter()
                .filter(|n| filter.matches(&n.trace))
                .take(limit)
                .map(|n| summarize(&n.trace))
                .collect();

            if cli.json {
                print_json(&TracesPayload {
                    traces: summaries,
                    stats,
                })
            } else {
                print_traces_human(&summaries, &stats);
                Ok(())
            }
        }
        Commands::Trace { trace_id, view } => {
            let view = parse_view(&view)?;
            let normalized = find_trace(&loaded, &trace_id)?;

            if cli.json {
                print_json(&TracePayload {
                    trace: &normalized.trace,
                    anomalies: &normalized.anomalies,
                    tree: build_tree(&normalized.trace),
                    timeline: timeline(&normalized.trace),
                    waterfall: waterfall(&normalized.trace),
                })
            } else {
                print_trace_human(normalized, view);
                Ok(())
            }
        }
        Commands::Span { trace_id, span_id } => {
            let normalized = find_trace(&loaded, &trace_id)?;
            let span = normalized
                .trace
                .span(&span_id)
                .with_context(|| format!("span {span_id} not found in trace {trace_id}"))?;

            if cli.json {
                print_json(span)
            } else {
                print_span_human(span);
                Ok(())
            }
        }
    }
}

fn find_trace<'a>(
    loaded: &'a [NormalizedTrace],
    trace_id: &str,
) -> anyhow::Result<&'a NormalizedTrace> {
    loaded
        .iter()
        .find(|n| n.trace.trace_id == trace_id)
        .with_context(|| format!("trace {trace_id} not found in input"))
}

fn parse_view(s: &str) -> anyhow::Result<TraceView> {
    match s {
        "waterfall" => Ok(TraceView::Waterfall),
        "timeline" => Ok(TraceView::Timeline),
        "spans" => Ok(TraceView::Spans),
        other => anyhow::bail!("invalid view: {other}"),
    }
}

fn print_json<T: Serialize>(payload: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
