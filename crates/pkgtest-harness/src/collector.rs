//! Outcome collection and rendering.
//!
//! The collector receives outcome events from the case wrapper, consults
//! the baseline comparator once per test, and renders the classified
//! outcome in one of three modes:
//!
//! | mode      | behavior |
//! |-----------|----------|
//! | dots      | one character per test: `.` success, `F`/`f` failure, `E`/`e` error (upper = mismatch vs. baseline) |
//! | verbose   | id padded to 60 columns, the outcome literal, then detail text for failures/errors |
//! | parseable | id padded to 60 columns, `" | "`, the outcome literal |
//!
//! The outcome literals are historical and deliberately asymmetric between
//! the success and failure paths (`pass (FAIL)` vs. `FAIL (pass)`); they
//! are reproduced verbatim rather than derived from a uniform boolean
//! contract.
//!
//! Everything is written to a caller-supplied diagnostic stream; write
//! failures on that stream are ignored so they can never change a test's
//! judgment.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::Baseline;
use crate::case::{ExecContext, TestId};

/// Column width the test identifier is left-justified to in verbose and
/// parseable output.
const ID_COLUMNS: usize = 60;

/// How outcomes are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// One character per test, no newlines.
    #[default]
    Dots,
    /// Human-oriented: identifier, outcome, detail text.
    Verbose,
    /// Machine-parseable `id | outcome` lines.
    Parseable,
}

/// Abort signal returned up every call boundary instead of unwinding.
///
/// Produced by the collector when bail-on-fail triggers; each caller
/// checks it and stops dispatching further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Control {
    Continue,
    Abort,
}

impl Control {
    #[must_use]
    pub fn is_abort(self) -> bool {
        self == Self::Abort
    }
}

/// Collector construction options.
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    pub mode: OutputMode,
    /// Abort the whole run at the first baseline-unexpected failure.
    pub bail_on_fail: bool,
    /// Coverage pair threaded into each fixture, never inspected.
    pub coverage: Option<ExecContext>,
}

/// Receives outcome events, classifies them against the baseline, and
/// renders them per the active output mode.
pub struct ResultCollector<'a> {
    baseline: &'a mut dyn Baseline,
    stream: &'a mut dyn Write,
    mode: OutputMode,
    bail_on_fail: bool,
    coverage: Option<ExecContext>,
    successes: Vec<TestId>,
    failures: Vec<(TestId, String)>,
    errors: Vec<(TestId, String)>,
    tests_run: usize,
}

impl<'a> ResultCollector<'a> {
    pub fn new(
        baseline: &'a mut dyn Baseline,
        stream: &'a mut dyn Write,
        config: CollectorConfig,
    ) -> Self {
        Self {
            baseline,
            stream,
            mode: config.mode,
            bail_on_fail: config.bail_on_fail,
            coverage: config.coverage,
            successes: Vec::new(),
            failures: Vec::new(),
            errors: Vec::new(),
            tests_run: 0,
        }
    }

    /// Coverage context to inject into fixtures before execution.
    #[must_use]
    pub fn coverage(&self) -> Option<&ExecContext> {
        self.coverage.as_ref()
    }

    /// Announce a test before its lifecycle runs.
    ///
    /// Dots mode stays silent; the other modes write the padded identifier
    /// so the outcome literal lands in a fixed column.
    pub fn start(&mut self, id: &TestId) {
        self.tests_run += 1;
        match self.mode {
            OutputMode::Dots => {}
            OutputMode::Verbose => {
                let _ = write!(self.stream, "{:<ID_COLUMNS$}   ", id.to_string());
            }
            OutputMode::Parseable => {
                let _ = write!(self.stream, "{:<ID_COLUMNS$} | ", id.to_string());
            }
        }
        let _ = self.stream.flush();
    }

    pub fn add_success(&mut self, id: &TestId) -> Control {
        let signal = self.baseline.classify(id, "pass");
        match self.mode {
            OutputMode::Verbose | OutputMode::Parseable => {
                let literal = if signal { "pass" } else { "pass (FAIL)" };
                let _ = writeln!(self.stream, "{literal}");
            }
            OutputMode::Dots => {
                let _ = write!(self.stream, ".");
            }
        }
        self.successes.push(id.clone());
        Control::Continue
    }

    pub fn add_failure(&mut self, id: &TestId, detail: &str) -> Control {
        let signal = self.baseline.classify(id, "fail");
        match self.mode {
            OutputMode::Verbose | OutputMode::Parseable => {
                let literal = if signal { "FAIL (pass)" } else { "FAIL" };
                let _ = writeln!(self.stream, "{literal}");
                if self.mode == OutputMode::Verbose {
                    let _ = writeln!(self.stream, "{detail}");
                }
            }
            OutputMode::Dots => {
                let _ = write!(self.stream, "{}", if signal { "f" } else { "F" });
            }
        }
        self.failures.push((id.clone(), detail.to_owned()));
        if self.bail_on_fail && !signal {
            debug!(test = %id, "unexpected failure with bail-on-fail, aborting run");
            Control::Abort
        } else {
            Control::Continue
        }
    }

    pub fn add_error(&mut self, id: &TestId, detail: &str) -> Control {
        let signal = self.baseline.classify(id, "error");
        match self.mode {
            OutputMode::Verbose | OutputMode::Parseable => {
                let _ = writeln!(self.stream, "ERROR");
                if self.mode == OutputMode::Verbose {
                    let _ = writeln!(self.stream, "{detail}");
                }
            }
            OutputMode::Dots => {
                let _ = write!(self.stream, "{}", if signal { "e" } else { "E" });
            }
        }
        self.errors.push((id.clone(), detail.to_owned()));
        Control::Continue
    }

    /// Detail listing for every error and failure, used by the runner in
    /// non-verbose modes where the per-test line carried no detail text.
    pub fn print_errors(&mut self) {
        let _ = writeln!(self.stream);
        for (id, detail) in &self.errors {
            let _ = writeln!(self.stream, "{}", "=".repeat(70));
            let _ = writeln!(self.stream, "ERROR: {id}");
            let _ = writeln!(self.stream, "{}", "-".repeat(70));
            let _ = writeln!(self.stream, "{detail}");
        }
        for (id, detail) in &self.failures {
            let _ = writeln!(self.stream, "{}", "=".repeat(70));
            let _ = writeln!(self.stream, "FAIL: {id}");
            let _ = writeln!(self.stream, "{}", "-".repeat(70));
            let _ = writeln!(self.stream, "{detail}");
        }
    }

    #[must_use]
    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Whether the run itself succeeded. Baseline mismatches do not factor
    /// in; only recorded failures and errors do.
    #[must_use]
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }
}
