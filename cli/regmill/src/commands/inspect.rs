//! `regmill inspect`: print the built model, human-readable or as JSON.

use std::path::Path;

use anyhow::{bail, Context, Result};
use regmill_core::RegisterMap;

pub fn run(spec: &Path, export: Option<&str>) -> Result<()> {
    let (map, warnings) =
        regmill_spec::load_file(spec).with_context(|| format!("loading {}", spec.display()))?;
    for w in &warnings {
        eprintln!("warning: {}: {}: {}", spec.display(), w.path, w.message);
    }

    match export {
        Some("json") => {
            let json = serde_json::to_string_pretty(&map).context("serializing model")?;
            println!("{json}");
        }
        Some(other) => bail!("unknown export format `{other}` (expected json)"),
        None => print_summary(&map),
    }
    Ok(())
}

fn print_summary(map: &RegisterMap) {
    println!("=== Register map: {} ===", map.name);
    if !map.description.is_empty() {
        println!("{}", map.description);
    }
    println!("  Word width:   {} bits", map.word_width);
    println!(
        "  Registers:    {} ({} addressable words)",
        map.registers.len(),
        map.element_count()
    );
    println!("  Address span: {} bytes", map.address_span());
    println!("  Fingerprint:  {}", map.fingerprint());

    for r in &map.registers {
        println!();
        let length = if r.is_array() {
            format!(" x{}", r.count)
        } else {
            String::new()
        };
        println!("  {:#06x}  {} [{}]{length}", r.address, r.name, r.mode);
        if !r.description.is_empty() {
            println!("          {}", r.description);
        }
        for f in &r.fields {
            let bits = if f.width == 1 {
                format!("{:>5}", f.lsb())
            } else {
                format!("{:>2}:{:<2}", f.msb(), f.lsb())
            };
            println!("    {bits}  {}  {} (default {})", f.name, f.kind, f.default);
        }
    }

    if !map.constants.is_empty() {
        println!();
        println!("  Constants:");
        for c in &map.constants {
            println!("    {} = {}", c.name, c.value);
        }
    }
}
