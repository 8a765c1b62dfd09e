//! `regmill generate`: compile specifications into artifacts.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regmill_emit::{ArtifactKind, EmitConfig, PipelineError};

/// Run generation over every specification file.
///
/// Each file compiles independently; one failing map or artifact does not
/// stop the others, but any failure makes the whole run exit non-zero.
pub fn run(specs: &[PathBuf], out: &Path, only: Option<&[String]>) -> Result<()> {
    let config = match only {
        Some(names) => {
            let mut kinds = Vec::with_capacity(names.len());
            for name in names {
                kinds.push(name.parse::<ArtifactKind>().map_err(anyhow::Error::msg)?);
            }
            EmitConfig::with_kinds(out, kinds)
        }
        None => EmitConfig::new(out),
    };

    let mut failures = 0usize;
    for spec in specs {
        let (map, warnings) = regmill_spec::load_file(spec)
            .with_context(|| format!("loading {}", spec.display()))?;
        for w in &warnings {
            eprintln!("warning: {}: {}: {}", spec.display(), w.path, w.message);
        }
        match regmill_emit::generate(&map, &config) {
            Ok(report) => {
                print!("{report}");
                failures += report.failed();
            }
            Err(PipelineError::ValidationFailed { name, violations }) => {
                eprintln!("error: register map `{name}` failed validation:");
                for v in &violations {
                    eprintln!("  {v}");
                }
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!(
            "{failures} failure(s) across {} specification(s)",
            specs.len()
        );
    }
    Ok(())
}
