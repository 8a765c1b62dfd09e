//! Generation run reports.

use std::fmt;
use std::path::PathBuf;

use crate::dispatch::ArtifactKind;
use crate::error::EmitError;

/// What happened to one artifact.
#[derive(Debug)]
pub enum ArtifactStatus {
    /// The file was absent or differed, and was written.
    Written,
    /// The file already held exactly this content; nothing was written.
    Unchanged,
    /// Rendering or writing failed. Sibling artifacts were not affected.
    Failed(EmitError),
}

/// Outcome of one artifact of a generation run.
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    /// Where the artifact was (or would have been) written.
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

/// Summary of one generation run over one register map.
#[derive(Debug)]
pub struct GenerationReport {
    /// Name of the register map.
    pub map_name: String,
    /// Model fingerprint embedded in every artifact header.
    pub fingerprint: String,
    /// One outcome per requested artifact, in emission order.
    pub artifacts: Vec<ArtifactOutcome>,
}

impl GenerationReport {
    /// Whether every artifact rendered and wrote cleanly.
    pub fn all_succeeded(&self) -> bool {
        !self
            .artifacts
            .iter()
            .any(|a| matches!(a.status, ArtifactStatus::Failed(_)))
    }

    /// Number of artifacts actually written to disk.
    pub fn written(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| matches!(a.status, ArtifactStatus::Written))
            .count()
    }

    /// Number of artifacts that failed.
    pub fn failed(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| matches!(a.status, ArtifactStatus::Failed(_)))
            .count()
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.fingerprint.get(..12).unwrap_or(&self.fingerprint);
        writeln!(f, "=== Generation: {} (model {short}) ===", self.map_name)?;
        for a in &self.artifacts {
            let kind = a.kind.to_string();
            match &a.status {
                ArtifactStatus::Written => {
                    writeln!(f, "  {kind:<16} written    {}", a.path.display())?;
                }
                ArtifactStatus::Unchanged => {
                    writeln!(f, "  {kind:<16} unchanged  {}", a.path.display())?;
                }
                ArtifactStatus::Failed(e) => {
                    writeln!(f, "  {kind:<16} FAILED     {e}")?;
                }
            }
        }
        Ok(())
    }
}
