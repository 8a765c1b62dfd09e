//! Free constants emitted alongside registers.

use std::fmt;

use serde::Serialize;

/// A named constant sharing the register map's symbol namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    pub description: String,
    pub value: ConstantValue,
}

/// The value of a [`Constant`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConstantValue {
    Integer(i64),
    Boolean(bool),
    /// A literal bit pattern, most significant bit first, digits 0/1 only.
    BitVector(String),
    String(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Integer(v) => write!(f, "{v}"),
            ConstantValue::Boolean(v) => write!(f, "{v}"),
            ConstantValue::BitVector(bits) => write!(f, "0b{bits}"),
            ConstantValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_display() {
        assert_eq!(ConstantValue::Integer(-3).to_string(), "-3");
        assert_eq!(ConstantValue::Boolean(true).to_string(), "true");
        assert_eq!(ConstantValue::BitVector("1010".into()).to_string(), "0b1010");
        assert_eq!(ConstantValue::String("axi".into()).to_string(), "\"axi\"");
    }
}
