//! TOML parsing for register-map descriptions.

use toml::Table;

use crate::error::{Result, SpecError};

/// Parse register-map text into a raw document tree.
///
/// Pure and permissive: unknown keys survive into the tree (the builder
/// warns about them later); only malformed TOML is rejected, with the line
/// and column of the offending construct.
pub fn parse_document(text: &str) -> Result<Table> {
    text.parse::<Table>().map_err(|e| {
        let offset = e.span().map(|s| s.start).unwrap_or(0);
        let (line, column) = line_column(text, offset);
        SpecError::Syntax {
            line,
            column,
            message: e.message().to_string(),
        }
    })
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(text.len());
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in text.char_indices() {
        if i >= clamped {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
