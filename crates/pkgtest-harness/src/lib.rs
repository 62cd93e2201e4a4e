//! Baseline-aware test execution harness.
//!
//! Layers three capabilities over a plain case/suite/result model:
//!
//! - **Baseline classification**: every outcome is compared against a
//!   persisted record of what the test did last time, so a fresh
//!   regression renders differently from a failure that was already
//!   known ([`baseline`], [`collector`]).
//! - **Persistent fixtures**: a class can share one expensive
//!   setUp/tearDown across all of its methods instead of paying for it
//!   per method ([`suite`]).
//! - **Timing**: per-test wall-clock collection with an aggregate report
//!   sorted by elapsed seconds ([`runner`]).
//!
//! Execution is strictly sequential and single-process. Assertion
//! semantics and test discovery stay with the caller; bodies report
//! through [`CaseError`] and the harness does the rest.
//!
//! ```
//! use pkgtest_harness::{
//!     CaseError, ClassSuite, FileBaseline, Runner, RunnerConfig, Suite, TestFixture,
//! };
//!
//! struct Fx;
//! impl TestFixture for Fx {}
//!
//! fn addition_holds(_fx: &mut Fx) -> Result<(), CaseError> {
//!     Ok(())
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut baseline = FileBaseline::open(dir.path(), "demo").unwrap();
//! let mut suites: Vec<Box<dyn Suite>> = vec![Box::new(
//!     ClassSuite::new("Arithmetic", || Fx).with_method("addition_holds", addition_holds),
//! )];
//! let mut out = Vec::new();
//! let summary = Runner::new(RunnerConfig::default())
//!     .run(&mut suites, &mut baseline, &mut out)
//!     .unwrap();
//! assert!(summary.was_successful());
//! baseline.save().unwrap();
//! ```

pub mod baseline;
pub mod case;
pub mod collector;
pub mod runner;
pub mod suite;

pub use baseline::{Baseline, FileBaseline};
pub use case::{
    CaseError, ExecContext, Interrupted, MethodCase, Outcome, SetUp, TestBody, TestFixture,
    TestId, run_case,
};
pub use collector::{CollectorConfig, Control, OutputMode, ResultCollector};
pub use runner::{RunSummary, Runner, RunnerConfig, write_timing_report};
pub use suite::{ClassSuite, Suite, TestMethod, TimingEntry};
