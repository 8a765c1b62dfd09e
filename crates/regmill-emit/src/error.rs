//! Emission error types.

use std::path::PathBuf;

use regmill_check::Violation;

/// Errors producing a single artifact.
///
/// One artifact failing never stops the others; the dispatch records the
/// failure in the run report and moves on.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The model cannot be expressed in this target language.
    #[error("{target}: {message}")]
    Unsupported {
        /// The artifact kind that refused, e.g. "register-package".
        target: &'static str,
        message: String,
    },

    /// Filesystem failure writing the artifact.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a generation run before any artifact is produced.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The model failed validation; emission never starts on an invalid map.
    #[error("register map `{name}` failed validation with {} violation(s)", violations.len())]
    ValidationFailed {
        name: String,
        violations: Vec<Violation>,
    },
}

/// Result type for emission operations.
pub type Result<T> = std::result::Result<T, EmitError>;
