//! Detached signature verification against a resolved key record.
//!
//! The caller has already looked the key up in the store; everything else —
//! algorithm tag, key status, validity window, revocation, digest recovery,
//! and the Ed25519 check itself — happens here, in that order. Structural
//! problems with the event hash surface before any cryptography runs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use ed25519_dalek::Signature;
use thiserror::Error;
use tracing::debug;

use mdab_contracts::{ErrorCode, EventSignature};

use crate::bundle::{KeyRecord, STATUS_ACTIVE};

const DIGEST_PREFIX: &str = "sha256:";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("unsupported signature algorithm '{0}'")]
    UnsupportedAlg(String),

    #[error("key '{0}' is not active")]
    InactiveKey(String),

    #[error("event timestamp is outside the key validity window")]
    OutsideValidityWindow,

    #[error("key '{0}' was revoked at or before this event")]
    Revoked(String),

    #[error("event_hash is not a sha256-prefixed digest")]
    MalformedEventHash,

    #[error("signature verification failed")]
    Invalid,
}

impl SignatureError {
    /// The stream-level error code each failure surfaces as.
    pub fn code(&self) -> ErrorCode {
        match self {
            SignatureError::UnsupportedAlg(_) | SignatureError::Invalid => ErrorCode::SigInvalid,
            SignatureError::InactiveKey(_) | SignatureError::Revoked(_) => ErrorCode::KeyRevoked,
            SignatureError::OutsideValidityWindow => ErrorCode::KeyExpired,
            SignatureError::MalformedEventHash => ErrorCode::HashMismatch,
        }
    }
}

/// Verify a detached Ed25519 signature over the digest bytes of `event_hash`.
///
/// `ts` is the event's own timestamp; validity-window boundaries pass
/// inclusively on both ends, while a revocation instant is itself already
/// revoked (`ts >= revoked_at` fails).
pub fn verify_event_signature(
    sig: &EventSignature,
    key: &KeyRecord,
    ts: DateTime<Utc>,
    event_hash: &str,
) -> Result<(), SignatureError> {
    if sig.alg != "ed25519" {
        return Err(SignatureError::UnsupportedAlg(sig.alg.clone()));
    }
    if key.status != STATUS_ACTIVE {
        return Err(SignatureError::InactiveKey(key.key_id.clone()));
    }
    if ts < key.not_before || ts > key.not_after {
        return Err(SignatureError::OutsideValidityWindow);
    }
    if let Some(revoked_at) = key.revoked_at {
        if ts >= revoked_at {
            return Err(SignatureError::Revoked(key.key_id.clone()));
        }
    }

    let digest = decode_digest(event_hash)?;
    let sig_bytes = BASE64
        .decode(&sig.sig_b64)
        .map_err(|_| SignatureError::Invalid)?;
    let signature = Signature::from_slice(&sig_bytes).map_err(|_| SignatureError::Invalid)?;

    key.public_key
        .verify_strict(&digest, &signature)
        .map_err(|_| {
            debug!(key_id = %key.key_id, "ed25519 verification failed");
            SignatureError::Invalid
        })
}

/// Recover the raw 32 digest bytes from a `sha256:`-prefixed hash string.
fn decode_digest(event_hash: &str) -> Result<[u8; 32], SignatureError> {
    let hex_part = event_hash
        .strip_prefix(DIGEST_PREFIX)
        .ok_or(SignatureError::MalformedEventHash)?;
    let decoded = hex::decode(hex_part).map_err(|_| SignatureError::MalformedEventHash)?;
    decoded
        .as_slice()
        .try_into()
        .map_err(|_| SignatureError::MalformedEventHash)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
