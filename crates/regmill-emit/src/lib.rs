//! Artifact generation from a validated register map.
//!
//! One model fans out to four artifacts: a VHDL register package, a VHDL
//! bus wrapper, a C header, and an HTML documentation page. Generation is
//! all-or-nothing per map (a map that fails validation produces no files)
//! but independent per artifact (one emitter refusing a map does not stop
//! the others). Files are rewritten only when their content changes, so
//! build systems watching timestamps stay quiet across no-op runs.

pub mod c;
pub mod dispatch;
pub mod error;
pub mod html;
pub mod report;
pub mod vhdl;
pub mod writer;

pub use dispatch::{generate, render, ArtifactKind, EmitConfig};
pub use error::{EmitError, PipelineError, Result};
pub use report::{ArtifactOutcome, ArtifactStatus, GenerationReport};
pub use writer::write_if_changed;
