//! Baseline comparison: the narrow interface the collector consults for
//! each outcome, plus a JSON-file-backed implementation keyed by suite name.
//!
//! The comparator is purely advisory. Its signal changes how an outcome is
//! rendered and counted in the mismatch total; it never changes whether the
//! outcome itself is a Success, Failure, or Error.
//!
//! # Signal contract
//!
//! `classify` returns `true` when the observed outcome kind matches the
//! recorded expectation. The rendering layer intentionally does not impose
//! a uniform meaning on this boolean across outcome kinds — see
//! [`crate::collector`] for the historical literal strings it maps to.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pkgtest_error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::case::TestId;

/// Outcome kind a comparator treats as expected when it has no record.
const DEFAULT_EXPECTATION: &str = "pass";

/// Narrow interface between the harness and the baseline store.
///
/// One `classify` call per executed test, with the final outcome kind
/// (`"pass"`, `"fail"`, or `"error"`), never intermediate states.
pub trait Baseline {
    /// Record the observed outcome and report whether it matched the
    /// baseline's expectation.
    fn classify(&mut self, id: &TestId, observed: &str) -> bool;

    /// Number of tests whose observed outcome differed from the baseline.
    fn mismatch_count(&self) -> usize;
}

/// On-disk baseline record: qualified test id → expected outcome kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct BaselineRecord {
    expected: BTreeMap<String, String>,
}

/// Suite baseline persisted as `<suite>_baseline.json`.
///
/// A missing file is an empty baseline, not an error: every test then
/// defaults to an expected `"pass"`. Observed outcomes accumulate during
/// the run and become the stored expectations on [`FileBaseline::save`].
#[derive(Debug)]
pub struct FileBaseline {
    path: PathBuf,
    record: BaselineRecord,
    observed: BTreeMap<String, String>,
    mismatches: Vec<String>,
}

impl FileBaseline {
    /// Open the baseline for a named suite under `dir`.
    ///
    /// # Errors
    ///
    /// Fails when the suite name is empty, the file cannot be read, or its
    /// contents are not a valid baseline record.
    pub fn open(dir: &Path, suite: &str) -> Result<Self> {
        if suite.is_empty() {
            return Err(HarnessError::Internal("suite must be non-empty".to_owned()));
        }
        let path = dir.join(format!("{suite}_baseline.json"));
        let record = if path.is_file() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|err| HarnessError::BaselineMalformed {
                detail: format!("{}: {err}", path.display()),
            })?
        } else {
            BaselineRecord::default()
        };
        info!(
            suite = suite,
            path = %path.display(),
            known_tests = record.expected.len(),
            "baseline opened"
        );
        Ok(Self {
            path,
            record,
            observed: BTreeMap::new(),
            mismatches: Vec::new(),
        })
    }

    /// Write the updated baseline back to disk.
    ///
    /// Observed outcomes overwrite their expectations; tests that did not
    /// run this time keep their previous records.
    ///
    /// # Errors
    ///
    /// Fails when serialization or the filesystem write fails.
    pub fn save(&self) -> Result<()> {
        let mut merged = self.record.clone();
        for (id, kind) in &self.observed {
            merged.expected.insert(id.clone(), kind.clone());
        }
        let bytes =
            serde_json::to_vec_pretty(&merged).map_err(|err| HarnessError::Serialize {
                detail: format!("baseline record: {err}"),
            })?;
        fs::write(&self.path, bytes).map_err(|_| HarnessError::BaselineWrite {
            path: self.path.clone(),
        })?;
        info!(path = %self.path.display(), tests = merged.expected.len(), "baseline saved");
        Ok(())
    }

    /// Qualified ids whose observed outcome differed from the baseline,
    /// in classification order.
    #[must_use]
    pub fn mismatches(&self) -> &[String] {
        &self.mismatches
    }
}

impl Baseline for FileBaseline {
    fn classify(&mut self, id: &TestId, observed: &str) -> bool {
        let key = id.to_string();
        let expected = self
            .record
            .expected
            .get(&key)
            .map_or(DEFAULT_EXPECTATION, String::as_str);
        let matched = expected == observed;
        if !matched {
            debug!(test = %id, expected, observed, "baseline mismatch");
            self.mismatches.push(key.clone());
        }
        self.observed.insert(key, observed.to_owned());
        matched
    }

    fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }
}
