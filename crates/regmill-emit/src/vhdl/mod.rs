//! VHDL emission: the register package and the bus-interface wrapper.

pub mod pkg;
pub mod wrapper;

use regmill_core::{Field, FieldKind, RegisterMap};

use crate::error::{EmitError, Result};

/// Reserved words of VHDL-2008. A map name colliding with one would not
/// compile, so both HDL emitters refuse the whole artifact.
const RESERVED: &[&str] = &[
    "abs", "access", "after", "alias", "all", "and", "architecture", "array", "assert", "assume",
    "assume_guarantee", "attribute", "begin", "block", "body", "buffer", "bus", "case",
    "component", "configuration", "constant", "context", "cover", "default", "disconnect",
    "downto", "else", "elsif", "end", "entity", "exit", "fairness", "file", "for", "force",
    "function", "generate", "generic", "group", "guarded", "if", "impure", "in", "inertial",
    "inout", "is", "label", "library", "linkage", "literal", "loop", "map", "mod", "nand", "new",
    "next", "nor", "not", "null", "of", "on", "open", "or", "others", "out", "package",
    "parameter", "port", "postponed", "procedure", "process", "property", "protected", "pure",
    "range", "record", "register", "reject", "release", "rem", "report", "restrict",
    "restrict_guarantee", "return", "rol", "ror", "select", "sequence", "severity", "shared",
    "signal", "sla", "sll", "sra", "srl", "strong", "subtype", "then", "to", "transport", "type",
    "unaffected", "units", "until", "use", "variable", "vmode", "vprop", "vunit", "wait", "when",
    "while", "with", "xnor", "xor",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Refuse any model name that is a VHDL reserved word.
pub(crate) fn check_identifiers(map: &RegisterMap, target: &'static str) -> Result<()> {
    if is_reserved(&map.name) {
        return Err(reserved(target, "register map", &map.name));
    }
    for r in &map.registers {
        if is_reserved(&r.name) {
            return Err(reserved(target, "register", &r.name));
        }
        for f in &r.fields {
            if is_reserved(&f.name) {
                return Err(reserved(target, "field", &f.name));
            }
            if let FieldKind::Enum(e) = &f.kind {
                for m in &e.members {
                    if is_reserved(&m.name) {
                        return Err(reserved(target, "enumeration member", &m.name));
                    }
                }
            }
        }
    }
    for c in &map.constants {
        if is_reserved(&c.name) {
            return Err(reserved(target, "constant", &c.name));
        }
    }
    Ok(())
}

fn reserved(target: &'static str, what: &str, name: &str) -> EmitError {
    EmitError::Unsupported {
        target,
        message: format!("{what} name `{name}` is a VHDL reserved word"),
    }
}

/// Comment header at the top of every generated VHDL file. No timestamps;
/// the fingerprint alone ties the file to its model.
pub(crate) fn file_header(map: &RegisterMap) -> String {
    format!(
        "-- Generated by regmill {}. Do not edit.\n-- Register map: {}\n-- Model fingerprint: {}",
        env!("CARGO_PKG_VERSION"),
        map.name,
        map.fingerprint()
    )
}

/// Quoted bit-string literal of `width` digits, MSB first.
pub(crate) fn bin_literal(value: u64, width: u32) -> String {
    let mut s = String::with_capacity(width as usize + 2);
    s.push('"');
    for i in (0..width).rev() {
        s.push(if value >> i & 1 == 1 { '1' } else { '0' });
    }
    s.push('"');
    s
}

pub(crate) fn std_logic(bit: bool) -> &'static str {
    if bit {
        "'1'"
    } else {
        "'0'"
    }
}

/// The record member type for a field.
pub(crate) fn member_type(field: &Field) -> String {
    match &field.kind {
        FieldKind::Bool => "std_logic".to_string(),
        FieldKind::Signed | FieldKind::Fixed { signed: true, .. } => {
            format!("signed({} downto 0)", field.width - 1)
        }
        FieldKind::Unsigned | FieldKind::Enum(_) | FieldKind::Fixed { signed: false, .. } => {
            format!("unsigned({} downto 0)", field.width - 1)
        }
    }
}

/// The record member's default value literal.
pub(crate) fn member_default(field: &Field) -> String {
    match &field.kind {
        FieldKind::Bool => std_logic(field.default_bits() == 1).to_string(),
        _ => bin_literal(field.default_bits(), field.width),
    }
}
