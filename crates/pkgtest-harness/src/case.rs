//! Single-test execution: identifiers, outcomes, fixtures, and the case
//! wrapper that turns a setUp → body → tearDown sequence into exactly one
//! reported outcome.
//!
//! The wrapper never interprets what a test does; it only sequences the
//! three lifecycle calls and maps their returns onto [`Outcome`] events for
//! the collector. Process-level cancellation ([`Interrupted`]) is the one
//! condition that is never classified: it exits every layer as an `Err`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collector::{Control, ResultCollector};

// ===========================================================================
// Identity
// ===========================================================================

/// Unique name for one test: class plus method.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestId {
    pub class_name: String,
    pub method_name: String,
}

impl TestId {
    #[must_use]
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f.pad so callers can left-justify the identifier in column output.
        f.pad(&format!("{}.{}", self.class_name, self.method_name))
    }
}

// ===========================================================================
// Outcomes
// ===========================================================================

/// Final judgment for a single test.
///
/// `Failure` is an assertion-style mismatch; `Error` is any other raised
/// condition, including setUp/tearDown problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure(String),
    Error(String),
}

impl Outcome {
    /// Wire name handed to the baseline comparator.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Success => "pass",
            Self::Failure(_) => "fail",
            Self::Error(_) => "error",
        }
    }
}

/// Non-success return from a setUp, body, or tearDown call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    /// Assertion-style mismatch; classified as a Failure.
    Assertion(String),
    /// Any other raised condition; classified as an Error.
    Unexpected(String),
    /// Process-level cancellation. Never classified.
    Interrupted,
}

/// Marker for a run cut short by process-level cancellation.
///
/// Propagates unclassified through the case wrapper, the orchestrator, and
/// the runner; no summary is printed for an interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// What a fixture's setUp reports when it completes without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetUp {
    /// Fixture is usable; run the body.
    Ready,
    /// Deliberate short-circuit: run tearDown, report Success, skip the
    /// body. Lets setUp validate preconditions on its own.
    EarlyTearDown,
}

// ===========================================================================
// Fixtures
// ===========================================================================

/// Opaque coverage-instrumentation pair threaded into each fixture.
///
/// The harness passes it through unchanged and never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecContext {
    pub command: String,
    pub env: BTreeMap<String, String>,
}

/// The per-class fixture a suite's test methods execute against.
///
/// All three hooks default to no-ops so trivial fixtures stay trivial.
pub trait TestFixture {
    /// Prepare the fixture. Errors here mean the fixture is unusable and
    /// tearDown will not be attempted for this case.
    fn set_up(&mut self) -> Result<SetUp, CaseError> {
        Ok(SetUp::Ready)
    }

    fn tear_down(&mut self) -> Result<(), CaseError> {
        Ok(())
    }

    /// Receive the coverage context before execution. Fixtures that shell
    /// out to instrumented commands stash it; everyone else ignores it.
    fn attach_context(&mut self, _ctx: &ExecContext) {}
}

/// A test body operating on its class fixture.
pub type TestBody<F> = fn(&mut F) -> Result<(), CaseError>;

/// Per-method execution descriptor.
///
/// Borrows the fixture rather than owning it, so a persistent class can
/// hand the same fixture to every method. `owns_lifecycle` says whether
/// the wrapper runs setUp/tearDown itself or defers to the orchestrator,
/// which has already run the real ones once for the whole class.
pub struct MethodCase<'f, F: TestFixture> {
    pub id: TestId,
    pub body: TestBody<F>,
    pub fixture: &'f mut F,
    pub owns_lifecycle: bool,
}

// ===========================================================================
// Case wrapper
// ===========================================================================

/// Execute one test case and report exactly one outcome to the collector.
///
/// Sequencing with `owns_lifecycle`:
/// 1. setUp. `EarlyTearDown` short-circuits to tearDown + Success; any
///    error reports an Error and skips tearDown entirely.
/// 2. Body. Assertion → Failure, anything else → Error, clean → tentative
///    Success.
/// 3. tearDown, always reached when setUp returned `Ready`. An error here
///    overrides only a tentative Success; after a non-success body the
///    body's outcome stands and the tearDown error is logged.
///
/// Without `owns_lifecycle` steps 1 and 3 are skipped — the orchestrator
/// owns the class lifecycle.
///
/// The returned [`Control`] is the collector's abort signal; callers must
/// stop dispatching further cases on `Control::Abort`.
///
/// # Errors
///
/// Returns `Err(Interrupted)` when any lifecycle call reports
/// cancellation; the case is left unclassified.
pub fn run_case<F: TestFixture>(
    case: MethodCase<'_, F>,
    collector: &mut ResultCollector<'_>,
) -> Result<Control, Interrupted> {
    collector.start(&case.id);

    if case.owns_lifecycle {
        match case.fixture.set_up() {
            Ok(SetUp::Ready) => {}
            Ok(SetUp::EarlyTearDown) => {
                debug!(test = %case.id, "setUp requested early teardown");
                return match case.fixture.tear_down() {
                    Ok(()) => Ok(collector.add_success(&case.id)),
                    Err(CaseError::Interrupted) => Err(Interrupted),
                    Err(CaseError::Assertion(detail) | CaseError::Unexpected(detail)) => {
                        Ok(collector.add_error(&case.id, &detail))
                    }
                };
            }
            Err(CaseError::Interrupted) => return Err(Interrupted),
            Err(CaseError::Assertion(detail) | CaseError::Unexpected(detail)) => {
                // Fixture is assumed unusable: tearDown is skipped.
                return Ok(collector.add_error(&case.id, &detail));
            }
        }
    }

    let mut outcome = match (case.body)(case.fixture) {
        Ok(()) => Outcome::Success,
        Err(CaseError::Assertion(detail)) => Outcome::Failure(detail),
        Err(CaseError::Unexpected(detail)) => Outcome::Error(detail),
        Err(CaseError::Interrupted) => return Err(Interrupted),
    };

    if case.owns_lifecycle {
        match case.fixture.tear_down() {
            Ok(()) => {}
            Err(CaseError::Interrupted) => return Err(Interrupted),
            Err(CaseError::Assertion(detail) | CaseError::Unexpected(detail)) => {
                if outcome == Outcome::Success {
                    outcome = Outcome::Error(detail);
                } else {
                    // The body already produced the reportable outcome; the
                    // comparator must see each test exactly once.
                    warn!(
                        test = %case.id,
                        detail = %detail,
                        "tearDown error after a non-success body"
                    );
                }
            }
        }
    }

    let control = match &outcome {
        Outcome::Success => collector.add_success(&case.id),
        Outcome::Failure(detail) => collector.add_failure(&case.id, detail),
        Outcome::Error(detail) => collector.add_error(&case.id, detail),
    };
    Ok(control)
}
