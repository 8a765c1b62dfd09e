//! Idempotent artifact writing.

use std::path::Path;

use crate::error::{EmitError, Result};

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Returns whether a write happened. Re-running generation over an
/// unchanged model touches nothing, so build systems watching timestamps
/// stay quiet.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == content.as_bytes() {
            return Ok(false);
        }
    }
    std::fs::write(path, content).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
