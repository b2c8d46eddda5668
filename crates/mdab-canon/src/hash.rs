//! Prefixed SHA-256 content hashing over the canonical form.

use sha2::{Digest, Sha256};

use crate::canonical::canonical_bytes;
use crate::numeric::NumericError;
use crate::value::Value;

/// Prefix carried by every stored hash in the protocol.
pub const HASH_PREFIX: &str = "sha256:";

/// `sha256:` + lowercase hex of SHA-256 over raw bytes.
pub fn sha256_prefixed_bytes(data: &[u8]) -> String {
    format!("{HASH_PREFIX}{}", hex::encode(Sha256::digest(data)))
}

/// `sha256:` + lowercase hex of SHA-256 over the canonical form of `value`.
pub fn sha256_prefixed(value: &Value) -> Result<String, NumericError> {
    Ok(sha256_prefixed_bytes(&canonical_bytes(value)?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
