//! Bit fields: named, typed, contiguous bit ranges within a register word.

use std::fmt;

use serde::Serialize;

/// How the bits of a field are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldKind {
    /// Plain unsigned integer.
    Unsigned,
    /// Two's-complement signed integer.
    Signed,
    /// Fixed-point number with `fraction_bits` bits right of the binary point.
    Fixed { signed: bool, fraction_bits: u32 },
    /// One of a closed set of named values.
    Enum(Enumeration),
    /// Single-bit flag.
    Bool,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Unsigned => write!(f, "unsigned"),
            FieldKind::Signed => write!(f, "signed"),
            FieldKind::Fixed {
                signed: true,
                fraction_bits,
            } => write!(f, "signed fixed-point ({fraction_bits} fraction bits)"),
            FieldKind::Fixed {
                signed: false,
                fraction_bits,
            } => write!(f, "unsigned fixed-point ({fraction_bits} fraction bits)"),
            FieldKind::Enum(_) => write!(f, "enumeration"),
            FieldKind::Bool => write!(f, "bit"),
        }
    }
}

/// A closed, ordered set of named values for an enumerated field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enumeration {
    pub members: Vec<EnumMember>,
}

impl Enumeration {
    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// The largest declared member value, or 0 for an empty enumeration.
    pub fn max_value(&self) -> u64 {
        self.members.iter().map(|m| m.value).max().unwrap_or(0)
    }
}

/// One named value of an enumeration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: u64,
}

/// A field default value, in the field's own interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldDefault {
    Unsigned(u64),
    Signed(i64),
    Fixed(f64),
    /// Name of an enumeration member.
    Enum(String),
    Bool(bool),
}

impl fmt::Display for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Unsigned(v) => write!(f, "{v}"),
            FieldDefault::Signed(v) => write!(f, "{v}"),
            FieldDefault::Fixed(v) => write!(f, "{v}"),
            FieldDefault::Enum(name) => write!(f, "{name}"),
            FieldDefault::Bool(b) => write!(f, "{}", u64::from(*b)),
        }
    }
}

/// A named, contiguous bit range within a register word.
///
/// `offset` is the index of the least significant bit; the field occupies
/// bits `[offset, offset + width)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub description: String,
    pub offset: u32,
    pub width: u32,
    pub kind: FieldKind,
    pub default: FieldDefault,
}

impl Field {
    /// Index of the least significant bit.
    pub fn lsb(&self) -> u32 {
        self.offset
    }

    /// Index of the most significant bit.
    pub fn msb(&self) -> u32 {
        self.offset + self.width - 1
    }

    /// One past the most significant bit.
    pub fn end(&self) -> u32 {
        self.offset + self.width
    }

    /// The field's bit mask in register-word position.
    pub fn mask(&self) -> u64 {
        value_mask(self.width) << self.offset
    }

    /// The default value encoded into the field's bit pattern, unshifted.
    ///
    /// Signed and fixed-point values are two's-complement truncated to the
    /// field width; enumeration defaults resolve to the member value.
    pub fn default_bits(&self) -> u64 {
        let mask = value_mask(self.width);
        match (&self.kind, &self.default) {
            (_, FieldDefault::Unsigned(v)) => v & mask,
            (_, FieldDefault::Signed(v)) => (*v as u64) & mask,
            (FieldKind::Fixed { fraction_bits, .. }, FieldDefault::Fixed(v)) => {
                let scaled = (v * 2f64.powi(*fraction_bits as i32)).round() as i64;
                (scaled as u64) & mask
            }
            (_, FieldDefault::Fixed(v)) => (v.round() as i64 as u64) & mask,
            (FieldKind::Enum(e), FieldDefault::Enum(name)) => {
                e.member(name).map(|m| m.value).unwrap_or(0) & mask
            }
            (_, FieldDefault::Enum(_)) => 0,
            (_, FieldDefault::Bool(b)) => u64::from(*b),
        }
    }
}

/// Mask of `width` low bits.
pub fn value_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(offset: u32, width: u32, kind: FieldKind, default: FieldDefault) -> Field {
        Field {
            name: "f".into(),
            description: String::new(),
            offset,
            width,
            kind,
            default,
        }
    }

    #[test]
    fn bit_range_endpoints() {
        let f = field(4, 3, FieldKind::Unsigned, FieldDefault::Unsigned(0));
        assert_eq!(f.lsb(), 4);
        assert_eq!(f.msb(), 6);
        assert_eq!(f.end(), 7);
        assert_eq!(f.mask(), 0b111_0000);
    }

    #[test]
    fn full_word_mask() {
        let f = field(0, 64, FieldKind::Unsigned, FieldDefault::Unsigned(0));
        assert_eq!(f.mask(), u64::MAX);
    }

    #[test]
    fn signed_default_truncates_to_width() {
        let f = field(0, 4, FieldKind::Signed, FieldDefault::Signed(-1));
        assert_eq!(f.default_bits(), 0b1111);
        let f = field(0, 4, FieldKind::Signed, FieldDefault::Signed(-8));
        assert_eq!(f.default_bits(), 0b1000);
    }

    #[test]
    fn fixed_default_scales_and_rounds() {
        let kind = FieldKind::Fixed {
            signed: false,
            fraction_bits: 4,
        };
        let f = field(0, 8, kind.clone(), FieldDefault::Fixed(1.5));
        assert_eq!(f.default_bits(), 24); // 1.5 * 16
        let f = field(0, 8, kind, FieldDefault::Fixed(0.26));
        assert_eq!(f.default_bits(), 4); // rounds to 4/16
    }

    #[test]
    fn signed_fixed_default_is_twos_complement() {
        let kind = FieldKind::Fixed {
            signed: true,
            fraction_bits: 2,
        };
        let f = field(0, 6, kind, FieldDefault::Fixed(-1.25));
        // -1.25 * 4 = -5 -> 0b111011 in 6 bits
        assert_eq!(f.default_bits(), 0b11_1011);
    }

    #[test]
    fn enum_default_resolves_member_value() {
        let e = Enumeration {
            members: vec![
                EnumMember {
                    name: "idle".into(),
                    value: 0,
                },
                EnumMember {
                    name: "busy".into(),
                    value: 3,
                },
            ],
        };
        let f = field(2, 2, FieldKind::Enum(e), FieldDefault::Enum("busy".into()));
        assert_eq!(f.default_bits(), 3);
    }

    #[test]
    fn enumeration_lookup() {
        let e = Enumeration {
            members: vec![EnumMember {
                name: "on".into(),
                value: 1,
            }],
        };
        assert_eq!(e.member("on").map(|m| m.value), Some(1));
        assert!(e.member("off").is_none());
        assert_eq!(e.max_value(), 1);
    }
}
