use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for pkgtest harness operations.
///
/// Structured variants for the common cases; anything that does not fit
/// gets `Internal` with a human-readable description.
#[derive(Error, Debug)]
pub enum HarnessError {
    // === Baseline Errors ===
    /// Baseline file exists but could not be parsed.
    #[error("baseline is malformed: {detail}")]
    BaselineMalformed { detail: String },

    /// Baseline could not be written back to disk.
    #[error("baseline write failed: '{path}'")]
    BaselineWrite { path: PathBuf },

    // === I/O Errors ===
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failure.
    #[error("serialization error: {detail}")]
    Serialize { detail: String },

    // === Catch-all ===
    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used across the harness crates.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = HarnessError::BaselineMalformed {
            detail: "trailing comma".to_owned(),
        };
        assert_eq!(err.to_string(), "baseline is malformed: trailing comma");

        let err = HarnessError::Internal("bad state".to_owned());
        assert_eq!(err.to_string(), "internal error: bad state");
    }

    #[test]
    fn test_io_error_converts() {
        fn open_missing() -> Result<Vec<u8>> {
            Ok(std::fs::read("/nonexistent/pkgtest/path")?)
        }
        let err = open_missing().unwrap_err();
        assert!(matches!(err, HarnessError::Io(_)));
    }
}
