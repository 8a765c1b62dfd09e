//! Canonical register-map model for regmill.
//!
//! A [`RegisterMap`] is the single source of truth every emitter renders
//! from: an ordered list of registers with typed bit fields, plus free
//! constants sharing the same symbol namespace. The model is built once
//! per invocation and is immutable afterwards; all derived quantities
//! (byte addresses, address bus width, packed defaults) are computed from
//! the declared content so that independently generated artifacts cannot
//! drift apart.

pub mod constant;
pub mod field;
pub mod hash;
pub mod map;

pub use constant::{Constant, ConstantValue};
pub use field::{EnumMember, Enumeration, Field, FieldDefault, FieldKind};
pub use hash::fingerprint;
pub use map::{AccessMode, Register, RegisterMap};
