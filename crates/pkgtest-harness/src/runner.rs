//! Top-level driver: runs an ordered plan of suites against one collector,
//! prints the run summary, and writes the aggregate timing report.
//!
//! Output contract (exact literals, stable for downstream parsers):
//!
//! ```text
//! Ran <n> test<s> in <t>s     pluralized iff n != 1, t to 3 decimals
//!
//! OK                          or
//! FAILED (successes=<a>, failures=<b>, errors=<c>, mismatches=<d>)
//! ```
//!
//! The timing report lists per-class subtotals ascending, a grand total,
//! then per-method lines ascending, each as `%6.2f` seconds. It is
//! appended to the configured timing file; if that file cannot be opened
//! the report degrades to the error stream and the run still completes.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::baseline::Baseline;
use crate::case::{ExecContext, Interrupted};
use crate::collector::{CollectorConfig, OutputMode, ResultCollector};
use crate::suite::{Suite, TimingEntry};

/// Runner construction options.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub mode: OutputMode,
    /// Abort the whole run at the first baseline-unexpected failure.
    pub bail_on_fail: bool,
    /// Append the timing report here; `None` disables it.
    pub timing_file: Option<PathBuf>,
    /// Coverage pair threaded into each fixture, never inspected.
    pub coverage: Option<ExecContext>,
}

/// Aggregate counts for one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tests_run: usize,
    pub successes: usize,
    pub failures: usize,
    pub errors: usize,
    /// Comparator's count of outcomes that differed from the baseline.
    pub mismatches: usize,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    /// Failures and errors decide success; baseline mismatches never do.
    #[must_use]
    pub fn was_successful(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }
}

/// Drives a run plan to completion and renders the final report.
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run every suite in order against a fresh collector.
    ///
    /// # Errors
    ///
    /// `Err(Interrupted)` on process-level cancellation: the run stops
    /// where it was, nothing further is classified, and no summary is
    /// printed.
    pub fn run(
        &self,
        suites: &mut [Box<dyn Suite>],
        baseline: &mut dyn Baseline,
        stream: &mut dyn Write,
    ) -> Result<RunSummary, Interrupted> {
        info!(
            suites = suites.len(),
            mode = ?self.config.mode,
            bail_on_fail = self.config.bail_on_fail,
            "test run starting"
        );
        let started = Instant::now();
        let mut aborted = false;

        let (tests_run, successes, failures, errors) = {
            let mut collector = ResultCollector::new(
                &mut *baseline,
                &mut *stream,
                CollectorConfig {
                    mode: self.config.mode,
                    bail_on_fail: self.config.bail_on_fail,
                    coverage: self.config.coverage.clone(),
                },
            );
            for suite in suites.iter_mut() {
                if suite.run(&mut collector)?.is_abort() {
                    aborted = true;
                    break;
                }
            }
            if self.config.mode != OutputMode::Verbose {
                collector.print_errors();
            }
            (
                collector.tests_run(),
                collector.success_count(),
                collector.failure_count(),
                collector.error_count(),
            )
        };

        let elapsed = started.elapsed().as_secs_f64();
        let mut timing: Vec<TimingEntry> = Vec::new();
        for suite in suites.iter_mut() {
            timing.extend(suite.take_timing());
        }

        if self.config.mode != OutputMode::Verbose {
            let _ = writeln!(stream, "{}", "-".repeat(70));
        }
        let plural = if tests_run == 1 { "" } else { "s" };
        let _ = writeln!(stream, "Ran {tests_run} test{plural} in {elapsed:.3}s");
        let _ = writeln!(stream);

        let summary = RunSummary {
            tests_run,
            successes,
            failures,
            errors,
            mismatches: baseline.mismatch_count(),
            elapsed_seconds: elapsed,
        };
        if summary.was_successful() {
            let _ = writeln!(stream, "OK");
        } else {
            let _ = writeln!(
                stream,
                "FAILED (successes={}, failures={}, errors={}, mismatches={})",
                summary.successes, summary.failures, summary.errors, summary.mismatches
            );
        }

        self.report_timing(&timing);
        info!(
            tests_run,
            failures, errors, aborted, "test run finished"
        );
        Ok(summary)
    }

    fn report_timing(&self, timing: &[TimingEntry]) {
        let Some(path) = &self.config.timing_file else {
            return;
        };
        if timing.is_empty() {
            return;
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(mut file) => {
                if let Err(err) = write_timing_report(&mut file, timing) {
                    warn!(path = %path.display(), error = %err, "timing report write failed");
                }
            }
            Err(err) => {
                // Non-fatal: degrade to the error stream.
                warn!(
                    path = %path.display(),
                    error = %err,
                    "timing file unavailable, writing timing to stderr"
                );
                let mut stderr = io::stderr();
                if let Err(err) = write_timing_report(&mut stderr, timing) {
                    warn!(error = %err, "timing report write failed on stderr");
                }
            }
        }
    }
}

/// Render the aggregate timing report.
///
/// Per-class subtotals ascending by seconds, a `Total time` line, a
/// separator, per-(class, method) lines ascending, then a closing double
/// separator followed by blank lines. Ties sort by name so the report is
/// deterministic.
///
/// # Errors
///
/// Propagates write failures on `stream`.
pub fn write_timing_report(stream: &mut dyn Write, timing: &[TimingEntry]) -> io::Result<()> {
    if timing.is_empty() {
        return Ok(());
    }

    let mut by_class: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in timing {
        *by_class.entry(entry.class_name.as_str()).or_insert(0.0) += entry.seconds;
    }
    let mut classes: Vec<(f64, &str)> = by_class.into_iter().map(|(c, s)| (s, c)).collect();
    classes.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(b.1)));

    let mut methods: Vec<(f64, &str, &str)> = timing
        .iter()
        .map(|e| (e.seconds, e.class_name.as_str(), e.method_name.as_str()))
        .collect();
    methods.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(b.1)).then(a.2.cmp(b.2)));

    let rule = "=".repeat(60);
    let mut total = 0.0;
    for &(secs, class) in &classes {
        writeln!(stream, "{secs:6.2} {class}")?;
        total += secs;
    }
    writeln!(stream, "{total:6.2} Total time")?;
    writeln!(stream, "{rule}")?;
    for &(secs, class, method) in &methods {
        writeln!(stream, "{secs:6.2} {class} {method}")?;
    }
    writeln!(stream, "{rule}")?;
    writeln!(stream, "{rule}\n\n\n")?;
    Ok(())
}
