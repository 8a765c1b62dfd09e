//! Cross-cutting invariant checks over a register map.

use regmill_core::field::value_mask;
use regmill_core::{ConstantValue, FieldDefault, FieldKind, RegisterMap};

/// A structural rule violated by a register map.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{location}: {message}")]
pub struct Violation {
    /// The model element the violation refers to.
    pub location: String,
    /// Human-readable description.
    pub message: String,
}

/// Check every structural invariant of a register map.
///
/// Returns `Ok(())` if the map is sound, or `Err(violations)` with every
/// problem found. Emitters rely on all of these holding; the generation
/// pipeline refuses to run while any violation remains.
pub fn validate(map: &RegisterMap) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    let word_bytes = map.word_bytes().max(1);

    // 1. Word width is a supported bus width.
    if ![8, 16, 32, 64].contains(&map.word_width) {
        violations.push(Violation {
            location: format!("register map `{}`", map.name),
            message: format!("word width {} is not one of 8, 16, 32, 64", map.word_width),
        });
    }

    // 2. Register names are unique.
    for i in 0..map.registers.len() {
        for j in (i + 1)..map.registers.len() {
            if map.registers[i].name == map.registers[j].name {
                violations.push(Violation {
                    location: format!("register `{}`", map.registers[i].name),
                    message: "declared more than once".into(),
                });
            }
        }
    }

    // 3. Element ranges are aligned, populated, and do not overlap.
    for r in &map.registers {
        if r.address % word_bytes != 0 {
            violations.push(Violation {
                location: format!("register `{}`", r.name),
                message: format!(
                    "address {:#x} is not aligned to the {word_bytes}-byte word size",
                    r.address
                ),
            });
        }
        if r.count == 0 {
            violations.push(Violation {
                location: format!("register `{}`", r.name),
                message: "has zero elements".into(),
            });
        }
    }
    for i in 0..map.registers.len() {
        for j in (i + 1)..map.registers.len() {
            let a = &map.registers[i];
            let b = &map.registers[j];
            let a_end = a.end_address(word_bytes);
            let b_end = b.end_address(word_bytes);
            if a.address == b.address {
                violations.push(Violation {
                    location: format!("registers `{}` and `{}`", a.name, b.name),
                    message: format!("both placed at address {:#x}", a.address),
                });
            } else if a.address < b_end && b.address < a_end {
                violations.push(Violation {
                    location: format!("registers `{}` and `{}`", a.name, b.name),
                    message: format!(
                        "address ranges {:#x}..{:#x} and {:#x}..{:#x} overlap",
                        a.address, a_end, b.address, b_end
                    ),
                });
            }
        }
    }

    // 4. Addresses do not decrease in declaration order.
    for pair in map.registers.windows(2) {
        if pair[1].address < pair[0].address {
            violations.push(Violation {
                location: format!("register `{}`", pair[1].name),
                message: format!(
                    "address {:#x} is below preceding register `{}` at {:#x}",
                    pair[1].address, pair[0].name, pair[0].address
                ),
            });
        }
    }

    // 5. Fields fit the word and occupy disjoint bit ranges.
    for r in &map.registers {
        for f in &r.fields {
            if f.width == 0 {
                violations.push(Violation {
                    location: format!("register `{}`, field `{}`", r.name, f.name),
                    message: "has zero width".into(),
                });
            } else if f.end() > map.word_width {
                violations.push(Violation {
                    location: format!("register `{}`, field `{}`", r.name, f.name),
                    message: format!(
                        "bits [{}, {}) do not fit in the {}-bit register word",
                        f.offset,
                        f.end(),
                        map.word_width
                    ),
                });
            }
        }
        for i in 0..r.fields.len() {
            for j in (i + 1)..r.fields.len() {
                let a = &r.fields[i];
                let b = &r.fields[j];
                if a.name == b.name {
                    violations.push(Violation {
                        location: format!("register `{}`, field `{}`", r.name, a.name),
                        message: "declared more than once".into(),
                    });
                }
                if a.width > 0 && b.width > 0 && a.offset < b.end() && b.offset < a.end() {
                    violations.push(Violation {
                        location: format!("register `{}`", r.name),
                        message: format!(
                            "fields `{}` (bits {}..{}) and `{}` (bits {}..{}) overlap",
                            a.name,
                            a.offset,
                            a.end(),
                            b.name,
                            b.offset,
                            b.end()
                        ),
                    });
                }
            }
        }
    }

    // 6. Field kinds and defaults agree.
    for r in &map.registers {
        for f in &r.fields {
            let location = format!("register `{}`, field `{}`", r.name, f.name);
            if matches!(f.kind, FieldKind::Bool) && f.width != 1 {
                violations.push(Violation {
                    location: location.clone(),
                    message: format!("a bool field is one bit wide, got width {}", f.width),
                });
            }
            if let FieldKind::Enum(e) = &f.kind {
                if e.members.is_empty() {
                    violations.push(Violation {
                        location: location.clone(),
                        message: "enumeration has no members".into(),
                    });
                }
                for i in 0..e.members.len() {
                    for j in (i + 1)..e.members.len() {
                        if e.members[i].name == e.members[j].name {
                            violations.push(Violation {
                                location: location.clone(),
                                message: format!(
                                    "duplicate enumeration member `{}`",
                                    e.members[i].name
                                ),
                            });
                        }
                        if e.members[i].value == e.members[j].value {
                            violations.push(Violation {
                                location: location.clone(),
                                message: format!(
                                    "enumeration members `{}` and `{}` share value {}",
                                    e.members[i].name, e.members[j].name, e.members[i].value
                                ),
                            });
                        }
                    }
                }
                if let Some(m) = e.members.iter().find(|m| m.value > value_mask(f.width)) {
                    violations.push(Violation {
                        location: location.clone(),
                        message: format!(
                            "member `{}` value {} does not fit in {} bits",
                            m.name, m.value, f.width
                        ),
                    });
                }
            }
            check_default(f, &location, &mut violations);
        }
    }

    // 7. Constants are uniquely named and do not shadow registers.
    for i in 0..map.constants.len() {
        for j in (i + 1)..map.constants.len() {
            if map.constants[i].name == map.constants[j].name {
                violations.push(Violation {
                    location: format!("constant `{}`", map.constants[i].name),
                    message: "declared more than once".into(),
                });
            }
        }
    }
    for c in &map.constants {
        if map.registers.iter().any(|r| r.name == c.name) {
            violations.push(Violation {
                location: format!("constant `{}`", c.name),
                message: format!("collides with register `{}`", c.name),
            });
        }
        if let ConstantValue::BitVector(bits) = &c.value {
            if bits.is_empty() || !bits.chars().all(|ch| ch == '0' || ch == '1') {
                violations.push(Violation {
                    location: format!("constant `{}`", c.name),
                    message: format!("bit vector `{bits}` holds characters other than 0/1"),
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_default(f: &regmill_core::Field, location: &str, violations: &mut Vec<Violation>) {
    match (&f.kind, &f.default) {
        (FieldKind::Unsigned, FieldDefault::Unsigned(v)) => {
            if *v > value_mask(f.width) {
                violations.push(Violation {
                    location: location.to_string(),
                    message: format!("default {v} does not fit in {} unsigned bits", f.width),
                });
            }
        }
        (FieldKind::Signed, FieldDefault::Signed(v)) => {
            let (min, max) = signed_range(f.width);
            if *v < min || *v > max {
                violations.push(Violation {
                    location: location.to_string(),
                    message: format!(
                        "default {v} does not fit in {} signed bits ({min}..={max})",
                        f.width
                    ),
                });
            }
        }
        (FieldKind::Fixed { signed, fraction_bits }, FieldDefault::Fixed(v)) => {
            let scaled = (v * 2f64.powi(*fraction_bits as i32)).round();
            let fits = if *signed {
                let (min, max) = signed_range(f.width);
                scaled >= min as f64 && scaled <= max as f64
            } else {
                scaled >= 0.0 && scaled <= value_mask(f.width) as f64
            };
            if !fits {
                violations.push(Violation {
                    location: location.to_string(),
                    message: format!(
                        "default {v} does not fit in {} bits with {fraction_bits} fraction bits",
                        f.width
                    ),
                });
            }
        }
        (FieldKind::Enum(e), FieldDefault::Enum(member)) => {
            if e.member(member).is_none() {
                violations.push(Violation {
                    location: location.to_string(),
                    message: format!("default `{member}` is not a declared enumeration member"),
                });
            }
        }
        (FieldKind::Bool, FieldDefault::Bool(_)) => {}
        _ => violations.push(Violation {
            location: location.to_string(),
            message: "default value kind does not match the field type".into(),
        }),
    }
}

fn signed_range(width: u32) -> (i64, i64) {
    if width >= 64 {
        (i64::MIN, i64::MAX)
    } else {
        (-(1i64 << (width - 1)), (1i64 << (width - 1)) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmill_core::{
        AccessMode, Constant, EnumMember, Enumeration, Field, Register,
    };

    fn field(name: &str, offset: u32, width: u32) -> Field {
        Field {
            name: name.into(),
            description: String::new(),
            offset,
            width,
            kind: if width == 1 {
                FieldKind::Bool
            } else {
                FieldKind::Unsigned
            },
            default: if width == 1 {
                FieldDefault::Bool(false)
            } else {
                FieldDefault::Unsigned(0)
            },
        }
    }

    fn register(name: &str, address: u64, fields: Vec<Field>) -> Register {
        Register {
            name: name.into(),
            description: String::new(),
            mode: AccessMode::ReadWrite,
            address,
            count: 1,
            fields,
        }
    }

    fn map(registers: Vec<Register>) -> RegisterMap {
        RegisterMap {
            name: "dut".into(),
            description: String::new(),
            word_width: 32,
            registers,
            constants: Vec::new(),
        }
    }

    #[test]
    fn sound_map_passes() {
        let m = map(vec![
            register("status", 0, vec![field("ready", 0, 1), field("code", 1, 3)]),
            register("control", 4, vec![field("go", 0, 1)]),
        ]);
        assert!(validate(&m).is_ok());
    }

    #[test]
    fn shared_address_names_both_registers() {
        let m = map(vec![
            register("a", 0, Vec::new()),
            register("b", 0, Vec::new()),
        ]);
        let violations = validate(&m).unwrap_err();
        assert!(violations.iter().any(|v| {
            v.location.contains("`a`") && v.location.contains("`b`") && v.message.contains("0x0")
        }));
    }

    #[test]
    fn array_overlap_is_reported() {
        let mut head = register("samples", 0, Vec::new());
        head.count = 4; // occupies 0x0..0x10
        let m = map(vec![head, register("tail", 8, Vec::new())]);
        let violations = validate(&m).unwrap_err();
        assert!(violations.iter().any(|v| v.message.contains("overlap")));
    }

    #[test]
    fn decreasing_addresses_are_reported() {
        let m = map(vec![
            register("late", 0x20, Vec::new()),
            register("early", 0, Vec::new()),
        ]);
        let violations = validate(&m).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.location == "register `early`" && v.message.contains("below")));
    }

    #[test]
    fn duplicate_register_names_are_reported() {
        let m = map(vec![
            register("twin", 0, Vec::new()),
            register("twin", 4, Vec::new()),
        ]);
        let violations = validate(&m).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.message.contains("more than once")));
    }

    #[test]
    fn overlapping_fields_are_reported() {
        let m = map(vec![register(
            "ctrl",
            0,
            vec![field("low", 0, 4), field("mid", 2, 4)],
        )]);
        let violations = validate(&m).unwrap_err();
        assert!(violations.iter().any(|v| {
            v.message.contains("`low`") && v.message.contains("`mid`") && v.message.contains("overlap")
        }));
    }

    #[test]
    fn field_outside_word_is_reported() {
        let mut m = map(vec![register("ctrl", 0, vec![field("wide", 30, 4)])]);
        m.word_width = 32;
        let violations = validate(&m).unwrap_err();
        assert!(violations.iter().any(|v| v.message.contains("[30, 34)")));
    }

    #[test]
    fn enum_duplicate_values_are_reported() {
        let e = Enumeration {
            members: vec![
                EnumMember { name: "a".into(), value: 1 },
                EnumMember { name: "b".into(), value: 1 },
            ],
        };
        let f = Field {
            name: "sel".into(),
            description: String::new(),
            offset: 0,
            width: 2,
            kind: FieldKind::Enum(e),
            default: FieldDefault::Enum("a".into()),
        };
        let m = map(vec![register("ctrl", 0, vec![f])]);
        let violations = validate(&m).unwrap_err();
        assert!(violations.iter().any(|v| v.message.contains("share value 1")));
    }

    #[test]
    fn undeclared_enum_default_is_reported() {
        let e = Enumeration {
            members: vec![EnumMember { name: "a".into(), value: 0 }],
        };
        let f = Field {
            name: "sel".into(),
            description: String::new(),
            offset: 0,
            width: 1,
            kind: FieldKind::Enum(e),
            default: FieldDefault::Enum("ghost".into()),
        };
        let m = map(vec![register("ctrl", 0, vec![f])]);
        let violations = validate(&m).unwrap_err();
        assert!(violations.iter().any(|v| v.message.contains("ghost")));
    }

    #[test]
    fn constant_colliding_with_register_is_reported() {
        let mut m = map(vec![register("status", 0, Vec::new())]);
        m.constants.push(Constant {
            name: "status".into(),
            description: String::new(),
            value: ConstantValue::Integer(1),
        });
        let violations = validate(&m).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.message.contains("collides with register")));
    }

    #[test]
    fn all_violations_are_collected() {
        // Shared address and an oversized field in the same map.
        let m = map(vec![
            register("a", 0, vec![field("wide", 30, 4)]),
            register("b", 0, Vec::new()),
        ]);
        let violations = validate(&m).unwrap_err();
        assert!(violations.len() >= 2);
    }

    #[test]
    fn mismatched_default_kind_is_reported() {
        let f = Field {
            name: "gain".into(),
            description: String::new(),
            offset: 0,
            width: 4,
            kind: FieldKind::Unsigned,
            default: FieldDefault::Bool(true),
        };
        let m = map(vec![register("ctrl", 0, vec![f])]);
        let violations = validate(&m).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.message.contains("does not match")));
    }

    /// Small deterministic generator for the structural property below.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }
    }

    fn random_spec(rng: &mut Lcg) -> String {
        let modes = ["read-only", "write-only", "read-write", "write-pulse"];
        let mut s = String::from("name = \"fuzz\"\n");
        for i in 0..1 + rng.below(6) {
            s.push_str(&format!(
                "\n[[register]]\nname = \"reg{i}\"\nmode = \"{}\"\n",
                modes[rng.below(4) as usize]
            ));
            if rng.below(4) == 0 {
                s.push_str(&format!("count = {}\n", 1 + rng.below(5)));
            }
            let mut used = 0;
            for j in 0..rng.below(4) {
                let remaining = 32 - used;
                if remaining == 0 {
                    break;
                }
                let width = 1 + rng.below(u64::from(remaining).min(12));
                s.push_str(&format!(
                    "\n[[register.field]]\nname = \"f{j}\"\nwidth = {width}\n"
                ));
                used += width as u32;
            }
        }
        s
    }

    #[test]
    fn every_buildable_map_validates() {
        // Sequential addressing and in-order field packing can never
        // produce overlaps, so whatever the builder accepts must pass.
        for seed in 0..64 {
            let mut rng = Lcg(seed * 2654435761 + 1);
            let text = random_spec(&mut rng);
            let (map, warnings) = regmill_spec::load_str("fuzz", &text).unwrap();
            assert!(warnings.is_empty(), "seed {seed}: {warnings:?}");
            if let Err(violations) = validate(&map) {
                panic!("seed {seed}: {violations:?}\n{text}");
            }
        }
    }
}
