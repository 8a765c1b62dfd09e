//! Structural validation of register maps.
//!
//! Validation runs over the built model rather than the source text, so a
//! map constructed directly in Rust gets the same guarantees as one loaded
//! from a description file. [`validate`] collects every violation instead
//! of stopping at the first; emission must not start while any remain.

pub mod structural;

pub use structural::{validate, Violation};
