//! Error types for register-map loading.

use std::path::PathBuf;

/// Errors that can occur while loading a register-map description.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The text is not well-formed TOML.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A declaration is well-formed TOML but violates the map schema.
    #[error("schema error in {path}: {message}")]
    Schema {
        /// The declaration the error refers to, e.g. ``register `status`, field `flags` ``.
        path: String,
        message: String,
    },

    /// Description file not found.
    #[error("register map file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// I/O error reading a description file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, SpecError>;
