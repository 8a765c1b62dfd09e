//! Model fingerprinting.
//!
//! Generated artifacts embed a fingerprint of the model they were rendered
//! from, so a checked-in file can be traced to its source without relying
//! on timestamps. The fingerprint is content-derived; identical models
//! always produce byte-identical artifacts.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the JSON serialization of a value, as lowercase hex.
pub fn fingerprint<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_vec(value).expect("serialization should not fail");
    let digest = Sha256::digest(&json);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
