//! Register maps: ordered registers with derived address geometry.

use std::fmt;

use serde::Serialize;

use crate::constant::Constant;
use crate::field::Field;
use crate::hash;

/// How the bus may access a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    /// Hardware drives the value; the bus only reads it.
    ReadOnly,
    /// The bus writes; hardware consumes; not readable back.
    WriteOnly,
    /// The bus writes and reads back the stored value.
    ReadWrite,
    /// A bus write takes effect for exactly one clock cycle, then the
    /// register returns to its default value.
    WritePulse,
}

impl AccessMode {
    /// Whether a bus read returns this register's value.
    pub fn bus_readable(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    /// Whether a bus write reaches this register.
    pub fn bus_writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessMode::ReadOnly => "read-only",
            AccessMode::WriteOnly => "write-only",
            AccessMode::ReadWrite => "read-write",
            AccessMode::WritePulse => "write-pulse",
        };
        write!(f, "{s}")
    }
}

/// One addressable register, or an array of identical registers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Register {
    pub name: String,
    pub description: String,
    pub mode: AccessMode,
    /// Byte address of the first element.
    pub address: u64,
    /// Number of identical elements; 1 for a scalar register.
    pub count: u32,
    /// Fields in declaration order, ascending bit offset not required.
    pub fields: Vec<Field>,
}

impl Register {
    pub fn is_array(&self) -> bool {
        self.count > 1
    }

    /// One past the byte address of the last element.
    pub fn end_address(&self, word_bytes: u64) -> u64 {
        self.address + u64::from(self.count) * word_bytes
    }

    /// The register's reset value: every field default packed into place.
    pub fn default_word(&self) -> u64 {
        self.fields
            .iter()
            .fold(0, |acc, f| acc | (f.default_bits() << f.offset))
    }
}

/// A complete register map: the unit every artifact is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterMap {
    pub name: String,
    pub description: String,
    /// Bits per register word: 8, 16, 32, or 64.
    pub word_width: u32,
    pub registers: Vec<Register>,
    pub constants: Vec<Constant>,
}

impl RegisterMap {
    /// Bytes per register word.
    pub fn word_bytes(&self) -> u64 {
        u64::from(self.word_width) / 8
    }

    /// One past the highest occupied byte address.
    pub fn address_span(&self) -> u64 {
        let word_bytes = self.word_bytes();
        self.registers
            .iter()
            .map(|r| r.end_address(word_bytes))
            .max()
            .unwrap_or(0)
    }

    /// Number of address lines on the generated bus: the smallest `n` with
    /// `2^n >= address_span`, but always enough to address two words.
    pub fn address_bits(&self) -> u32 {
        let floor = self.word_bytes().trailing_zeros() + 1;
        ceil_log2(self.address_span()).max(floor)
    }

    /// Total addressable words, arrays expanded.
    pub fn element_count(&self) -> u64 {
        self.registers.iter().map(|r| u64::from(r.count)).sum()
    }

    /// Look up a register by name.
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// SHA-256 fingerprint of the whole model, as lowercase hex.
    pub fn fingerprint(&self) -> String {
        hash::fingerprint(self)
    }
}

/// Smallest `n` such that `2^n >= value`.
fn ceil_log2(value: u64) -> u32 {
    match value {
        0 | 1 => 0,
        v => 64 - (v - 1).leading_zeros(),
    }
}
