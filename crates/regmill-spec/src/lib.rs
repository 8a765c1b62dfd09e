//! TOML front end for register map descriptions.
//!
//! A map is written as one `.toml` document: top-level metadata, an ordered
//! `[[register]]` array with nested `[[register.field]]` arrays, and an
//! optional `[[constant]]` array. This crate parses that text and builds the
//! [`RegisterMap`] model, assigning byte addresses and packing fields along
//! the way.
//!
//! Parsing is strict about shape (wrong types and malformed values are
//! errors) but deliberately lax about placement: address collisions and the
//! like survive into the model so the checker can report all of them in one
//! pass, and unknown keys come back as [`BuildWarning`]s rather than errors.

use std::path::Path;

use regmill_core::RegisterMap;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::{build_map, BuildWarning};
pub use error::{Result, SpecError};
pub use loader::parse_document;

/// Load a register map from a `.toml` file.
///
/// The map name defaults to the file stem when the document does not
/// carry a `name` key.
pub fn load_file(path: &Path) -> Result<(RegisterMap, Vec<BuildWarning>)> {
    if !path.exists() {
        return Err(SpecError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    let default_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("map");
    load_str(default_name, &text)
}

/// Parse and build a register map from TOML text.
pub fn load_str(default_name: &str, text: &str) -> Result<(RegisterMap, Vec<BuildWarning>)> {
    let doc = parse_document(text)?;
    build_map(default_name, &doc)
}
