//! Run-level reporting: output mode formats, summary literals, and the
//! appended timing report.

use pkgtest_harness::{
    CaseError, ClassSuite, FileBaseline, OutputMode, Runner, RunnerConfig, Suite, TestFixture,
};

struct Fx;

impl TestFixture for Fx {}

fn body_pass(_f: &mut Fx) -> Result<(), CaseError> {
    Ok(())
}

fn body_fail(_f: &mut Fx) -> Result<(), CaseError> {
    Err(CaseError::Assertion("left != right".to_owned()))
}

fn body_error(_f: &mut Fx) -> Result<(), CaseError> {
    Err(CaseError::Unexpected("connection reset".to_owned()))
}

fn plan() -> Vec<Box<dyn Suite>> {
    vec![Box::new(
        ClassSuite::new("Report", || Fx)
            .with_method("ok", body_pass)
            .with_method("bad", body_fail)
            .with_method("broken", body_error),
    )]
}

fn run_with_mode(mode: OutputMode) -> String {
    let dir = tempfile::tempdir().unwrap();
    let mut baseline = FileBaseline::open(dir.path(), "report").unwrap();
    let mut suites = plan();
    let mut out = Vec::new();
    let _ = Runner::new(RunnerConfig {
        mode,
        ..RunnerConfig::default()
    })
    .run(&mut suites, &mut baseline, &mut out)
    .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_parseable_lines_are_machine_splittable() {
    let out = run_with_mode(OutputMode::Parseable);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], format!("{:<60} | pass", "Report.ok"));
    assert_eq!(lines[1], format!("{:<60} | FAIL", "Report.bad"));
    assert_eq!(lines[2], format!("{:<60} | ERROR", "Report.broken"));

    // Every per-test line splits into exactly (id, outcome).
    for line in &lines[..3] {
        let parts: Vec<&str> = line.split(" | ").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].trim_end().starts_with("Report."));
    }
}

#[test]
fn test_verbose_carries_detail_text() {
    let out = run_with_mode(OutputMode::Verbose);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], format!("{:<60}   pass", "Report.ok"));
    assert_eq!(lines[1], format!("{:<60}   FAIL", "Report.bad"));
    assert_eq!(lines[2], "left != right");
    assert_eq!(lines[3], format!("{:<60}   ERROR", "Report.broken"));
    assert_eq!(lines[4], "connection reset");
}

#[test]
fn test_dots_then_listing_then_summary() {
    let out = run_with_mode(OutputMode::Dots);
    // New failures and errors against an empty baseline are uppercase.
    assert!(out.starts_with(".FE\n"));
    assert!(out.contains("ERROR: Report.broken"));
    assert!(out.contains("FAIL: Report.bad"));
    assert!(out.contains("Ran 3 tests in "));
    assert!(out.contains("FAILED (successes=1, failures=1, errors=1, mismatches=2)"));
}

#[test]
fn test_summary_elapsed_has_three_decimals() {
    let out = run_with_mode(OutputMode::Dots);
    let line = out
        .lines()
        .find(|l| l.starts_with("Ran "))
        .expect("summary line present");
    let secs = line
        .strip_prefix("Ran 3 tests in ")
        .and_then(|rest| rest.strip_suffix('s'))
        .expect("well-formed summary line");
    assert_eq!(secs.split('.').nth(1).map(str::len), Some(3));
}

#[test]
fn test_timing_report_written_through_runner() {
    let dir = tempfile::tempdir().unwrap();
    let timing_path = dir.path().join("timing.log");
    let mut baseline = FileBaseline::open(dir.path(), "report").unwrap();
    let mut suites = plan();
    let mut out = Vec::new();
    let _ = Runner::new(RunnerConfig {
        timing_file: Some(timing_path.clone()),
        ..RunnerConfig::default()
    })
    .run(&mut suites, &mut baseline, &mut out)
    .unwrap();

    let report = std::fs::read_to_string(&timing_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    // One class subtotal, the grand total, then the per-method block.
    assert!(lines[0].ends_with(" Report"));
    assert!(lines[1].ends_with(" Total time"));
    assert_eq!(lines[2], "=".repeat(60));
    assert_eq!(
        lines.iter().filter(|l| l.contains("Report ")).count(),
        3,
        "one line per method"
    );
}

#[test]
fn test_second_run_against_saved_baseline_downgrades_to_expected() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut baseline = FileBaseline::open(dir.path(), "report").unwrap();
        let mut suites = plan();
        let mut out = Vec::new();
        let _ = Runner::new(RunnerConfig::default())
            .run(&mut suites, &mut baseline, &mut out)
            .unwrap();
        baseline.save().unwrap();
    }

    let mut baseline = FileBaseline::open(dir.path(), "report").unwrap();
    let mut suites = plan();
    let mut out = Vec::new();
    let summary = Runner::new(RunnerConfig::default())
        .run(&mut suites, &mut baseline, &mut out)
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    // Same failures, but now lowercase (baseline-expected) and mismatch-free.
    assert!(out.starts_with(".fe\n"));
    assert_eq!(summary.mismatches, 0);
    // Still FAILED: classification never changes the judgment.
    assert!(out.contains("FAILED (successes=1, failures=1, errors=1, mismatches=0)"));
}
