//! The register package: addresses, field ranges, records, and defaults.
//!
//! One package per map, consumed by the generated bus wrapper and by
//! hand-written hardware alike. Every quantity comes straight from the
//! model, so this package and the software-facing artifacts cannot drift
//! apart. Output is byte-identical for identical models.

use regmill_core::{ConstantValue, FieldKind, RegisterMap};

use crate::error::Result;
use crate::vhdl::{bin_literal, check_identifiers, file_header, member_default, member_type};

/// Render `<map>_regs_pkg.vhd`.
pub fn render(map: &RegisterMap) -> Result<String> {
    check_identifiers(map, "register-package")?;

    let p = &map.name;
    let ww = map.word_width;
    let mut v: Vec<String> = Vec::new();

    v.push(file_header(map));
    v.push(String::new());
    v.push("library ieee;".into());
    v.push("use ieee.std_logic_1164.all;".into());
    v.push("use ieee.numeric_std.all;".into());
    v.push(String::new());
    v.push(format!("package {p}_regs_pkg is"));
    v.push(String::new());
    v.push(format!("  constant {p}_word_width : natural := {ww};"));
    v.push(format!("  constant {p}_word_bytes : natural := {};", map.word_bytes()));
    v.push(format!("  constant {p}_address_bits : natural := {};", map.address_bits()));
    v.push(format!("  constant {p}_num_registers : natural := {};", map.element_count()));

    if !map.registers.is_empty() {
        v.push(String::new());
        v.push("  -- Byte addresses.".into());
        for r in &map.registers {
            v.push(format!("  constant {p}_{}_address : natural := {};", r.name, r.address));
            if r.is_array() {
                v.push(format!(
                    "  constant {p}_{}_array_length : natural := {};",
                    r.name, r.count
                ));
                v.push(format!(
                    "  constant {p}_{}_end_address : natural := {};",
                    r.name,
                    r.end_address(map.word_bytes())
                ));
            }
        }
    }

    for r in &map.registers {
        if r.fields.is_empty() {
            continue;
        }
        v.push(String::new());
        v.push(format!("  -- {} fields.", r.name));
        for f in &r.fields {
            v.push(format!(
                "  subtype {p}_{}_{} is natural range {} downto {};",
                r.name,
                f.name,
                f.msb(),
                f.lsb()
            ));
            v.push(format!(
                "  constant {p}_{}_{}_shift : natural := {};",
                r.name,
                f.name,
                f.lsb()
            ));
            v.push(format!(
                "  constant {p}_{}_{}_width : natural := {};",
                r.name, f.name, f.width
            ));
            if let FieldKind::Enum(e) = &f.kind {
                for m in &e.members {
                    v.push(format!(
                        "  constant {p}_{}_{}_{} : unsigned({} downto 0) := {};",
                        r.name,
                        f.name,
                        m.name,
                        f.width - 1,
                        bin_literal(m.value, f.width)
                    ));
                }
            }
        }
    }

    for r in &map.registers {
        v.push(String::new());
        v.push(format!("  -- {} register.", r.name));
        v.push(format!("  type {p}_{}_t is record", r.name));
        if r.fields.is_empty() {
            // No declared fields: the whole word is data.
            v.push(format!("    value : std_logic_vector({} downto 0);", ww - 1));
        } else {
            for f in &r.fields {
                let comment = match &f.kind {
                    FieldKind::Fixed { fraction_bits, .. } => {
                        format!(" -- {fraction_bits} fraction bits")
                    }
                    _ => String::new(),
                };
                v.push(format!("    {} : {};{comment}", f.name, member_type(f)));
            }
        }
        v.push("  end record;".into());
        v.push(format!("  constant {p}_{}_init : {p}_{}_t := (", r.name, r.name));
        if r.fields.is_empty() {
            v.push("    value => (others => '0')".into());
        } else {
            for (i, f) in r.fields.iter().enumerate() {
                let sep = if i + 1 == r.fields.len() { "" } else { "," };
                v.push(format!("    {} => {}{sep}", f.name, member_default(f)));
            }
        }
        v.push("  );".into());
        v.push(format!(
            "  constant {p}_{}_default : std_logic_vector({} downto 0) := {};",
            r.name,
            ww - 1,
            bin_literal(r.default_word(), ww)
        ));
        if r.is_array() {
            v.push(format!(
                "  type {p}_{}_array_t is array (0 to {}) of {p}_{}_t;",
                r.name,
                r.count - 1,
                r.name
            ));
        }
        v.push(format!("  function to_slv(data : {p}_{}_t) return std_logic_vector;", r.name));
        v.push(format!(
            "  function to_{p}_{}_t(data : std_logic_vector) return {p}_{}_t;",
            r.name, r.name
        ));
    }

    if !map.constants.is_empty() {
        v.push(String::new());
        v.push("  -- Map constants.".into());
        for c in &map.constants {
            v.push(format!("  constant {p}_{} : {};", c.name, constant_decl(&c.value)));
        }
    }

    v.push(String::new());
    v.push("end package;".into());
    v.push(String::new());
    v.push(format!("package body {p}_regs_pkg is"));

    for r in &map.registers {
        v.push(String::new());
        v.push(format!("  function to_slv(data : {p}_{}_t) return std_logic_vector is", r.name));
        v.push(format!(
            "    variable result : std_logic_vector({} downto 0) := (others => '0');",
            ww - 1
        ));
        v.push("  begin".into());
        if r.fields.is_empty() {
            v.push("    result := data.value;".into());
        } else {
            for f in &r.fields {
                match &f.kind {
                    FieldKind::Bool => v.push(format!(
                        "    result({p}_{}_{}_shift) := data.{};",
                        r.name, f.name, f.name
                    )),
                    _ => v.push(format!(
                        "    result({p}_{}_{}) := std_logic_vector(data.{});",
                        r.name, f.name, f.name
                    )),
                }
            }
        }
        v.push("    return result;".into());
        v.push("  end function;".into());
        v.push(String::new());
        v.push(format!(
            "  function to_{p}_{}_t(data : std_logic_vector) return {p}_{}_t is",
            r.name, r.name
        ));
        v.push(format!("    variable result : {p}_{}_t := {p}_{}_init;", r.name, r.name));
        v.push("  begin".into());
        if r.fields.is_empty() {
            v.push("    result.value := data;".into());
        } else {
            for f in &r.fields {
                match &f.kind {
                    FieldKind::Bool => v.push(format!(
                        "    result.{} := data({p}_{}_{}_shift);",
                        f.name, r.name, f.name
                    )),
                    FieldKind::Signed | FieldKind::Fixed { signed: true, .. } => v.push(format!(
                        "    result.{} := signed(data({p}_{}_{}));",
                        f.name, r.name, f.name
                    )),
                    _ => v.push(format!(
                        "    result.{} := unsigned(data({p}_{}_{}));",
                        f.name, r.name, f.name
                    )),
                }
            }
        }
        v.push("    return result;".into());
        v.push("  end function;".into());
    }

    v.push(String::new());
    v.push("end package body;".into());

    Ok(v.join("\n") + "\n")
}

fn constant_decl(value: &ConstantValue) -> String {
    match value {
        ConstantValue::Integer(i) => format!("integer := {i}"),
        ConstantValue::Boolean(b) => format!("boolean := {b}"),
        ConstantValue::BitVector(bits) => format!(
            "std_logic_vector({} downto 0) := \"{bits}\"",
            bits.len().saturating_sub(1)
        ),
        ConstantValue::String(s) => format!("string := \"{}\"", s.replace('"', "\"\"")),
    }
}
