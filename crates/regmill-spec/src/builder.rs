//! Semantic model construction from the raw document tree.
//!
//! The builder walks a parsed TOML table into a [`RegisterMap`]: it assigns
//! byte addresses, packs field bit ranges, resolves defaults, and rejects
//! declarations that cannot mean anything (`SpecError::Schema`, carrying
//! the declaration path). Unknown keys become warnings, never errors.
//! Cross-register invariants (address collisions, ordering) deliberately
//! survive construction so the validator can report all of them together.

use regmill_core::field::value_mask;
use regmill_core::{
    AccessMode, Constant, ConstantValue, EnumMember, Enumeration, Field, FieldDefault, FieldKind,
    Register, RegisterMap,
};
use toml::value::{Table, Value};

use crate::error::{Result, SpecError};

/// A non-fatal observation made while building the model.
#[derive(Debug, Clone)]
pub struct BuildWarning {
    /// The declaration the observation refers to.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

/// Build the semantic model from a parsed document.
///
/// `default_name` names the map when the document carries no `name` key;
/// callers pass the description file's stem.
pub fn build_map(default_name: &str, doc: &Table) -> Result<(RegisterMap, Vec<BuildWarning>)> {
    let mut warnings = Vec::new();
    let path = "register map";

    let name = match opt_str(doc, "name", path)? {
        Some(s) => {
            check_identifier(s, path)?;
            s.to_string()
        }
        None => {
            check_identifier(default_name, path)?;
            default_name.to_string()
        }
    };
    let description = opt_str(doc, "description", path)?.unwrap_or_default().to_string();

    let word_width = match opt_int(doc, "word-width", path)? {
        Some(w) if [8, 16, 32, 64].contains(&w) => w as u32,
        Some(w) => {
            return Err(schema(
                path,
                format!("word-width must be one of 8, 16, 32, 64, got {w}"),
            ))
        }
        None => 32,
    };
    let word_bytes = u64::from(word_width) / 8;

    let mut registers = Vec::new();
    let mut cursor = 0u64;
    if let Some(value) = doc.get("register") {
        for entry in as_table_array(value, "register", path)? {
            let register = build_register(entry, word_width, word_bytes, &mut cursor, &mut warnings)?;
            registers.push(register);
        }
    }

    let mut constants = Vec::new();
    if let Some(value) = doc.get("constant") {
        for entry in as_table_array(value, "constant", path)? {
            constants.push(build_constant(entry, &mut warnings)?);
        }
    }
    for i in 0..constants.len() {
        for j in (i + 1)..constants.len() {
            if constants[i].name == constants[j].name {
                return Err(schema(
                    path,
                    format!("duplicate constant name `{}`", constants[i].name),
                ));
            }
        }
    }

    warn_unknown(
        doc,
        &["name", "description", "word-width", "register", "constant"],
        path,
        &mut warnings,
    );

    Ok((
        RegisterMap {
            name,
            description,
            word_width,
            registers,
            constants,
        },
        warnings,
    ))
}

fn build_register(
    table: &Table,
    word_width: u32,
    word_bytes: u64,
    cursor: &mut u64,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Register> {
    let name = require_str(table, "name", "register")?;
    let path = format!("register `{name}`");
    check_identifier(name, &path)?;

    let mode = parse_mode(require_str(table, "mode", &path)?, &path)?;
    let description = opt_str(table, "description", &path)?.unwrap_or_default().to_string();

    let count = match opt_int(table, "count", &path)? {
        Some(c) if (1..=i64::from(u32::MAX)).contains(&c) => c as u32,
        Some(c) => return Err(schema(&path, format!("count must be at least 1, got {c}"))),
        None => 1,
    };

    let address = match opt_int(table, "address", &path)? {
        Some(a) if a < 0 => {
            return Err(schema(&path, format!("address must be non-negative, got {a}")))
        }
        Some(a) => {
            let a = a as u64;
            if a % word_bytes != 0 {
                return Err(schema(
                    &path,
                    format!("address {a:#x} is not aligned to the {word_bytes}-byte word size"),
                ));
            }
            a
        }
        None => *cursor,
    };
    *cursor = (*cursor).max(address + u64::from(count) * word_bytes);

    let mut fields = Vec::new();
    let mut next_offset = 0u32;
    if let Some(value) = table.get("field") {
        for entry in as_table_array(value, "field", &path)? {
            fields.push(build_field(entry, word_width, &path, &mut next_offset, warnings)?);
        }
    }
    for i in 0..fields.len() {
        for j in (i + 1)..fields.len() {
            if fields[i].name == fields[j].name {
                return Err(schema(
                    &path,
                    format!("duplicate field name `{}`", fields[i].name),
                ));
            }
        }
    }

    warn_unknown(
        table,
        &["name", "mode", "description", "count", "address", "field"],
        &path,
        warnings,
    );

    Ok(Register {
        name: name.to_string(),
        description,
        mode,
        address,
        count,
        fields,
    })
}

fn build_field(
    table: &Table,
    word_width: u32,
    register_path: &str,
    next_offset: &mut u32,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Field> {
    let name = require_str(table, "name", register_path)?;
    let path = format!("{register_path}, field `{name}`");
    check_identifier(name, &path)?;

    let width = match require_int(table, "width", &path)? {
        w if w >= 1 && w <= i64::from(word_width) => w as u32,
        w => {
            return Err(schema(
                &path,
                format!("width must be between 1 and {word_width}, got {w}"),
            ))
        }
    };

    // Omitted offsets pack after the previous field; the first starts at 0.
    let offset = match opt_int(table, "offset", &path)? {
        Some(o) if o >= 0 && o < i64::from(word_width) => o as u32,
        Some(o) => {
            return Err(schema(
                &path,
                format!("offset must be between 0 and {}, got {o}", word_width - 1),
            ))
        }
        None => *next_offset,
    };
    if offset + width > word_width {
        return Err(schema(
            &path,
            format!(
                "bits [{offset}, {}) do not fit in the {word_width}-bit register word",
                offset + width
            ),
        ));
    }
    *next_offset = offset + width;

    let kind = build_kind(table, width, &path)?;
    if !matches!(kind, FieldKind::Enum(_)) && table.contains_key("values") {
        return Err(schema(&path, "`values` is only meaningful for enum fields"));
    }
    if !matches!(kind, FieldKind::Fixed { .. }) {
        if table.contains_key("fraction-bits") {
            return Err(schema(&path, "`fraction-bits` is only meaningful for fixed fields"));
        }
        if table.contains_key("signed") {
            return Err(schema(&path, "`signed` is only meaningful for fixed fields"));
        }
    }

    let default = build_default(table.get("default"), &kind, width, &path)?;

    warn_unknown(
        table,
        &[
            "name",
            "description",
            "width",
            "offset",
            "type",
            "default",
            "values",
            "fraction-bits",
            "signed",
        ],
        &path,
        warnings,
    );

    Ok(Field {
        name: name.to_string(),
        description: opt_str(table, "description", &path)?.unwrap_or_default().to_string(),
        offset,
        width,
        kind,
        default,
    })
}

fn build_kind(table: &Table, width: u32, path: &str) -> Result<FieldKind> {
    let kind = match opt_str(table, "type", path)? {
        // Single-bit fields are flags unless the type says otherwise.
        None if width == 1 => FieldKind::Bool,
        None => FieldKind::Unsigned,
        Some("bool") => {
            if width != 1 {
                return Err(schema(path, format!("a bool field is one bit wide, got width {width}")));
            }
            FieldKind::Bool
        }
        Some("unsigned") => FieldKind::Unsigned,
        Some("signed") => FieldKind::Signed,
        Some("fixed") => {
            let fraction_bits = match opt_int(table, "fraction-bits", path)? {
                Some(n) if (0..=63).contains(&n) => n as u32,
                Some(n) => {
                    return Err(schema(
                        path,
                        format!("fraction-bits must be between 0 and 63, got {n}"),
                    ))
                }
                None => return Err(schema(path, "fixed fields require `fraction-bits`")),
            };
            let signed = opt_bool(table, "signed", path)?.unwrap_or(false);
            FieldKind::Fixed { signed, fraction_bits }
        }
        Some("enum") => FieldKind::Enum(build_enumeration(table.get("values"), width, path)?),
        Some(other) => {
            return Err(schema(
                path,
                format!("unknown field type `{other}` (expected unsigned, signed, fixed, enum, or bool)"),
            ))
        }
    };
    Ok(kind)
}

fn build_enumeration(values: Option<&Value>, width: u32, path: &str) -> Result<Enumeration> {
    let members = match values {
        // A plain list assigns dense values in declaration order.
        Some(Value::Array(items)) => {
            let mut members = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let member = item.as_str().ok_or_else(|| {
                    schema(path, "enumeration value lists hold member names (strings)")
                })?;
                check_identifier(member, path)?;
                members.push(EnumMember {
                    name: member.to_string(),
                    value: i as u64,
                });
            }
            members
        }
        // A table assigns explicit, possibly sparse values.
        Some(Value::Table(t)) => {
            let mut members = Vec::new();
            for (member, value) in t {
                check_identifier(member, path)?;
                let value = value.as_integer().filter(|v| *v >= 0).ok_or_else(|| {
                    schema(
                        path,
                        format!("enumeration member `{member}` needs a non-negative integer value"),
                    )
                })?;
                members.push(EnumMember {
                    name: member.clone(),
                    value: value as u64,
                });
            }
            members
        }
        Some(_) => {
            return Err(schema(
                path,
                "`values` must be a list of names or a table of name = value",
            ))
        }
        None => return Err(schema(path, "enum fields require `values`")),
    };
    if members.is_empty() {
        return Err(schema(path, "enumeration has no members"));
    }
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            if members[i].name == members[j].name {
                return Err(schema(
                    path,
                    format!("duplicate enumeration member `{}`", members[i].name),
                ));
            }
            if members[i].value == members[j].value {
                return Err(schema(
                    path,
                    format!(
                        "enumeration members `{}` and `{}` share value {}",
                        members[i].name, members[j].name, members[i].value
                    ),
                ));
            }
        }
    }
    if let Some(m) = members.iter().find(|m| m.value > value_mask(width)) {
        return Err(schema(
            path,
            format!("member `{}` value {} does not fit in {width} bits", m.name, m.value),
        ));
    }
    Ok(Enumeration { members })
}

fn build_default(
    value: Option<&Value>,
    kind: &FieldKind,
    width: u32,
    path: &str,
) -> Result<FieldDefault> {
    match kind {
        FieldKind::Bool => match value {
            None => Ok(FieldDefault::Bool(false)),
            Some(Value::Boolean(b)) => Ok(FieldDefault::Bool(*b)),
            Some(Value::Integer(i)) if *i == 0 || *i == 1 => Ok(FieldDefault::Bool(*i == 1)),
            Some(_) => Err(schema(path, "bool defaults are true/false or 0/1")),
        },
        FieldKind::Unsigned => match value {
            None => Ok(FieldDefault::Unsigned(0)),
            Some(Value::Integer(i)) if *i >= 0 && *i as u64 <= value_mask(width) => {
                Ok(FieldDefault::Unsigned(*i as u64))
            }
            Some(Value::Integer(i)) => Err(schema(
                path,
                format!("default {i} does not fit in {width} unsigned bits"),
            )),
            Some(_) => Err(schema(path, "unsigned defaults are integers")),
        },
        FieldKind::Signed => match value {
            None => Ok(FieldDefault::Signed(0)),
            Some(Value::Integer(i)) => {
                let (min, max) = signed_range(width);
                if *i < min || *i > max {
                    Err(schema(
                        path,
                        format!("default {i} does not fit in {width} signed bits ({min}..={max})"),
                    ))
                } else {
                    Ok(FieldDefault::Signed(*i))
                }
            }
            Some(_) => Err(schema(path, "signed defaults are integers")),
        },
        FieldKind::Fixed { signed, fraction_bits } => {
            let number = match value {
                None => return Ok(FieldDefault::Fixed(0.0)),
                Some(Value::Float(f)) => *f,
                Some(Value::Integer(i)) => *i as f64,
                Some(_) => return Err(schema(path, "fixed defaults are numbers")),
            };
            let scaled = (number * 2f64.powi(*fraction_bits as i32)).round();
            let fits = if *signed {
                let (min, max) = signed_range(width);
                scaled >= min as f64 && scaled <= max as f64
            } else {
                scaled >= 0.0 && scaled <= value_mask(width) as f64
            };
            if !fits {
                return Err(schema(
                    path,
                    format!("default {number} does not fit in {width} bits with {fraction_bits} fraction bits"),
                ));
            }
            Ok(FieldDefault::Fixed(number))
        }
        FieldKind::Enum(e) => match value {
            None => Ok(FieldDefault::Enum(e.members[0].name.clone())),
            Some(Value::String(member)) => {
                if e.member(member).is_none() {
                    Err(schema(
                        path,
                        format!("default `{member}` is not a declared enumeration member"),
                    ))
                } else {
                    Ok(FieldDefault::Enum(member.clone()))
                }
            }
            Some(_) => Err(schema(path, "enum defaults name a member")),
        },
    }
}

fn build_constant(table: &Table, warnings: &mut Vec<BuildWarning>) -> Result<Constant> {
    let name = require_str(table, "name", "constant")?;
    let path = format!("constant `{name}`");
    check_identifier(name, &path)?;
    let description = opt_str(table, "description", &path)?.unwrap_or_default().to_string();

    let value = match table.get("value") {
        Some(Value::Integer(i)) => ConstantValue::Integer(*i),
        Some(Value::Boolean(b)) => ConstantValue::Boolean(*b),
        Some(Value::String(s)) => parse_string_constant(s, &path)?,
        Some(_) => {
            return Err(schema(
                &path,
                "constant values are integers, booleans, or strings",
            ))
        }
        None => return Err(schema(&path, "missing required key `value`")),
    };

    warn_unknown(table, &["name", "description", "value"], &path, warnings);

    Ok(Constant {
        name: name.to_string(),
        description,
        value,
    })
}

/// Strings starting with `0b` are bit-vector literals; anything else is text.
fn parse_string_constant(s: &str, path: &str) -> Result<ConstantValue> {
    match s.strip_prefix("0b") {
        Some(bits) if !bits.is_empty() && bits.chars().all(|c| c == '0' || c == '1') => {
            Ok(ConstantValue::BitVector(bits.to_string()))
        }
        Some(_) => Err(schema(path, "bit-vector constants hold only 0/1 digits after 0b")),
        None => Ok(ConstantValue::String(s.to_string())),
    }
}

fn parse_mode(s: &str, path: &str) -> Result<AccessMode> {
    match s {
        "read-only" => Ok(AccessMode::ReadOnly),
        "write-only" => Ok(AccessMode::WriteOnly),
        "read-write" => Ok(AccessMode::ReadWrite),
        "write-pulse" => Ok(AccessMode::WritePulse),
        other => Err(schema(
            path,
            format!("unknown mode `{other}` (expected read-only, write-only, read-write, or write-pulse)"),
        )),
    }
}

fn check_identifier(name: &str, path: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some('a'..='z'))
        && chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'));
    if valid {
        Ok(())
    } else {
        Err(schema(
            path,
            format!("name `{name}` is not a lowercase identifier (letters, digits, `_`, starting with a letter)"),
        ))
    }
}

fn signed_range(width: u32) -> (i64, i64) {
    if width >= 64 {
        (i64::MIN, i64::MAX)
    } else {
        (-(1i64 << (width - 1)), (1i64 << (width - 1)) - 1)
    }
}

fn warn_unknown(table: &Table, allowed: &[&str], path: &str, warnings: &mut Vec<BuildWarning>) {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            warnings.push(BuildWarning {
                path: path.to_string(),
                message: format!("unknown key `{key}`"),
            });
        }
    }
}

fn as_table_array<'a>(value: &'a Value, key: &str, path: &str) -> Result<Vec<&'a Table>> {
    let items = value
        .as_array()
        .ok_or_else(|| schema(path, format!("expected an array of tables for `{key}`")))?;
    items
        .iter()
        .map(|item| {
            item.as_table()
                .ok_or_else(|| schema(path, format!("expected an array of tables for `{key}`")))
        })
        .collect()
}

fn opt_str<'a>(table: &'a Table, key: &str, path: &str) -> Result<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(schema(path, format!("expected a string for `{key}`"))),
    }
}

fn require_str<'a>(table: &'a Table, key: &str, path: &str) -> Result<&'a str> {
    opt_str(table, key, path)?.ok_or_else(|| schema(path, format!("missing required key `{key}`")))
}

fn opt_int(table: &Table, key: &str, path: &str) -> Result<Option<i64>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(i)) => Ok(Some(*i)),
        Some(_) => Err(schema(path, format!("expected an integer for `{key}`"))),
    }
}

fn require_int(table: &Table, key: &str, path: &str) -> Result<i64> {
    opt_int(table, key, path)?.ok_or_else(|| schema(path, format!("missing required key `{key}`")))
}

fn opt_bool(table: &Table, key: &str, path: &str) -> Result<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(_) => Err(schema(path, format!("expected a boolean for `{key}`"))),
    }
}

fn schema(path: &str, message: impl Into<String>) -> SpecError {
    SpecError::Schema {
        path: path.to_string(),
        message: message.into(),
    }
}
