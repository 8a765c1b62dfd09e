//! `regmill check`: parse, build, and validate without emitting.

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Validate every specification file and report all findings.
pub fn run(specs: &[PathBuf]) -> Result<()> {
    let mut bad = 0usize;
    for spec in specs {
        match regmill_spec::load_file(spec) {
            Ok((map, warnings)) => {
                for w in &warnings {
                    eprintln!("warning: {}: {}: {}", spec.display(), w.path, w.message);
                }
                match regmill_check::validate(&map) {
                    Ok(()) => println!(
                        "{}: ok ({} registers, {} words)",
                        spec.display(),
                        map.registers.len(),
                        map.element_count()
                    ),
                    Err(violations) => {
                        bad += 1;
                        println!("{}: {} violation(s)", spec.display(), violations.len());
                        for v in &violations {
                            println!("  {v}");
                        }
                    }
                }
            }
            Err(e) => {
                bad += 1;
                eprintln!("error: {}: {e}", spec.display());
            }
        }
    }

    if bad > 0 {
        bail!("{bad} of {} specification(s) failed", specs.len());
    }
    Ok(())
}
