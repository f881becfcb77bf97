use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tracedeck_core::model::span::SpanStatus;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_tracedeck")
}

fn write_fixture(dir: &tempfile::TempDir, spans: &[tracedeck_core::model::span::Span]) -> PathBuf {
    let path = dir.path().join("spans.json");
    std::fs::write(&path, serde_json::to_string(spans).unwrap()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(bin()).args(args).output().unwrap()
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn traces_lists_every_trace_with_stats_footer() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&["traces", "--input", path.to_str().unwrap()]));
    assert!(out.contains("trace=trace-ok"));
    assert!(out.contains("trace=trace-err"));
    assert!(out.contains("root=\"GET /v1/orders\""));
    assert!(out.contains("-- 2 of 2 traces"));
    assert!(out.contains("1 errors"));
}

#[test]
fn traces_filters_narrow_the_list_but_not_the_stats() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&[
        "traces",
        "--input",
        path.to_str().unwrap(),
        "--status",
        "error",
    ]));
    assert!(out.contains("trace=trace-err"));
    assert!(!out.contains("trace=trace-ok"));
    assert!(out.contains("-- 1 of 2 traces"));
}

#[test]
fn traces_where_filter_matches_span_tags() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&[
        "traces",
        "--input",
        path.to_str().unwrap(),
        "--where",
        "peer=redis:*",
    ]));
    assert!(out.contains("trace=trace-err"));
    assert!(out.contains("-- 1 of 2 traces"));
}

#[test]
fn trace_waterfall_indents_children_and_draws_bars() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&["trace", "trace-err", "--input", path.to_str().unwrap()]));
    assert!(out.contains("TRACE trace-err duration=1800ms spans=2 errors=2"));
    assert!(out.contains("api GET /v1/orders"));
    assert!(out.contains("  api cache.get redis"));
    assert!(out.contains('#'));
    assert!(!out.contains("anomaly"));
}

#[test]
fn trace_timeline_orders_by_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&[
        "trace",
        "trace-ok",
        "--view",
        "timeline",
        "--input",
        path.to_str().unwrap(),
    ]));
    let gateway = out.find("+0ms api-gateway GET /users").unwrap();
    let auth = out.find("+10ms auth-service auth.check").unwrap();
    let user = out.find("+70ms user-service db.query").unwrap();
    assert!(gateway < auth && auth < user);
}

#[test]
fn trace_reports_anomalies_without_failing() {
    let mut spans = testkit::branching_trace("trace-odd");
    spans.push(testkit::span(
        "trace-odd",
        "d",
        Some("missing"),
        "billing",
        "charge.card",
        20.0,
        10.0,
        SpanStatus::Ok,
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &spans);

    let out = stdout_of(&run(&["trace", "trace-odd", "--input", path.to_str().unwrap()]));
    assert!(out.contains("anomaly dangling-parent:d"));
    assert!(out.contains("anomaly orphan-subtree:d"));
    assert!(out.contains("billing charge.card"));
}

#[test]
fn trace_json_payload_carries_all_projections() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&[
        "trace",
        "trace-ok",
        "--json",
        "--input",
        path.to_str().unwrap(),
    ]));
    let payload: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(payload["trace"]["root_span_id"], "a");
    assert_eq!(payload["trace"]["total_duration_ms"], 100.0);
    assert_eq!(payload["anomalies"], serde_json::json!([]));
    assert_eq!(payload["waterfall"][1]["left_fraction"], 0.1);
    assert_eq!(payload["waterfall"][1]["width_fraction"], 0.5);
    assert_eq!(payload["tree"]["nodes"][0]["depth"], 0);
    assert_eq!(payload["timeline"][0]["span_id"], "a");
}

#[test]
fn span_detail_prints_tags() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let out = stdout_of(&run(&[
        "span",
        "trace-err",
        "child",
        "--input",
        path.to_str().unwrap(),
    ]));
    assert!(out.contains("SPAN child service=api name=cache.get redis status=ERROR"));
    assert!(out.contains("peer=redis:6379"));
}

#[test]
fn unknown_trace_id_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, &testkit::forest_spans());

    let output = run(&["trace", "nope", "--input", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn reads_span_batch_from_stdin() {
    let mut child = Command::new(bin())
        .args(["traces"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(serde_json::to_string(&testkit::forest_spans()).unwrap().as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    let out = stdout_of(&output);
    assert!(out.contains("trace=trace-ok"));
}
