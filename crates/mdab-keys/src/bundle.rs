//! Key bundle loading and the in-memory key store.
//!
//! The bundle is loaded once and never mutated. Revocations are folded into
//! their key records at load time, so the signature path never consults a
//! second table. Every malformed field is a fatal load error: a verifier
//! running with a partially-understood bundle would accept streams it should
//! not.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use mdab_contracts::parse_ts_utc;

/// The only bundle format this verifier understands.
pub const KEY_BUNDLE_VERSION: &str = "MDAB-KEYS-0.1";

/// The status a key must carry to sign anything.
pub const STATUS_ACTIVE: &str = "ACTIVE";

#[derive(Debug, Error)]
pub enum KeyBundleError {
    #[error("cannot read key bundle {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("key bundle is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported key bundle version '{0}'")]
    Version(String),

    #[error("key '{key_id}': {reason}")]
    Key { key_id: String, reason: String },
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawBundle {
    version: String,
    #[serde(default)]
    keys: Vec<RawKey>,
    #[serde(default)]
    revocations: Vec<RawRevocation>,
}

#[derive(Debug, Deserialize)]
struct RawKey {
    key_id: String,
    alg: String,
    public_key_b64: String,
    not_before_utc: String,
    not_after_utc: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawRevocation {
    key_id: String,
    revoked_at_utc: String,
}

// ── Loaded records ────────────────────────────────────────────────────────────

/// One signing key with its validity window and (possibly) a revocation
/// instant folded in from the bundle's revocation list.
#[derive(Debug, Clone)]
pub struct KeyRecord {
    pub key_id: String,
    pub public_key: VerifyingKey,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub status: String,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// All keys of one bundle, keyed by `key_id`.
#[derive(Debug, Clone)]
pub struct KeyStore {
    keys: HashMap<String, KeyRecord>,
}

impl KeyStore {
    /// Read and parse a bundle file.
    pub fn load(path: &Path) -> Result<Self, KeyBundleError> {
        let text = fs::read_to_string(path).map_err(|source| KeyBundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&text)?;
        debug!(path = %path.display(), key_count = store.len(), "key bundle loaded");
        Ok(store)
    }

    /// Parse a bundle from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, KeyBundleError> {
        let raw: RawBundle = serde_json::from_str(text)?;
        if raw.version != KEY_BUNDLE_VERSION {
            return Err(KeyBundleError::Version(raw.version));
        }

        let mut revoked_at: HashMap<String, DateTime<Utc>> = HashMap::new();
        for revocation in raw.revocations {
            let ts = parse_ts_utc(&revocation.revoked_at_utc).map_err(|e| {
                KeyBundleError::Key {
                    key_id: revocation.key_id.clone(),
                    reason: format!("bad revocation timestamp: {e}"),
                }
            })?;
            revoked_at.insert(revocation.key_id, ts);
        }

        let mut keys = HashMap::new();
        for key in raw.keys {
            let record = build_record(&key, revoked_at.get(&key.key_id).copied())?;
            keys.insert(key.key_id, record);
        }
        Ok(Self { keys })
    }

    pub fn get(&self, key_id: &str) -> Option<&KeyRecord> {
        self.keys.get(key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn build_record(
    key: &RawKey,
    revoked_at: Option<DateTime<Utc>>,
) -> Result<KeyRecord, KeyBundleError> {
    let fail = |reason: String| KeyBundleError::Key {
        key_id: key.key_id.clone(),
        reason,
    };

    if key.alg != "ed25519" {
        return Err(fail(format!("unsupported algorithm '{}'", key.alg)));
    }

    let decoded = BASE64
        .decode(&key.public_key_b64)
        .map_err(|e| fail(format!("public key is not valid base64: {e}")))?;
    let bytes: [u8; 32] = decoded
        .as_slice()
        .try_into()
        .map_err(|_| fail(format!("public key is {} bytes, expected 32", decoded.len())))?;
    let public_key = VerifyingKey::from_bytes(&bytes)
        .map_err(|e| fail(format!("public key is not a valid Ed25519 point: {e}")))?;

    let not_before = parse_ts_utc(&key.not_before_utc)
        .map_err(|e| fail(format!("bad not_before_utc: {e}")))?;
    let not_after = parse_ts_utc(&key.not_after_utc)
        .map_err(|e| fail(format!("bad not_after_utc: {e}")))?;

    Ok(KeyRecord {
        key_id: key.key_id.clone(),
        public_key,
        not_before,
        not_after,
        status: key.status.clone(),
        revoked_at,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use chrono::{TimeZone, Utc};
    use ed25519_dalek::SigningKey;

    use super::{KeyBundleError, KeyStore};

    fn test_public_key_b64(seed: u8) -> String {
        let signing = SigningKey::from_bytes(&[seed; 32]);
        BASE64.encode(signing.verifying_key().to_bytes())
    }

    fn bundle_json(version: &str) -> String {
        format!(
            r#"{{
              "version": "{version}",
              "keys": [
                {{
                  "key_id": "svc-2026",
                  "alg": "ed25519",
                  "public_key_b64": "{pk}",
                  "not_before_utc": "2026-01-01T00:00:00Z",
                  "not_after_utc": "2027-01-01T00:00:00Z",
                  "status": "ACTIVE"
                }}
              ],
              "revocations": [
                {{ "key_id": "svc-2026", "revoked_at_utc": "2026-06-01T00:00:00Z" }}
              ]
            }}"#,
            pk = test_public_key_b64(7),
        )
    }

    #[test]
    fn loads_keys_and_folds_in_revocations() {
        let store = KeyStore::from_json(&bundle_json("MDAB-KEYS-0.1")).unwrap();
        assert_eq!(store.len(), 1);

        let record = store.get("svc-2026").unwrap();
        assert_eq!(record.status, "ACTIVE");
        assert_eq!(
            record.not_before,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            record.revoked_at,
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap())
        );
        assert!(store.get("other-key").is_none());
    }

    #[test]
    fn rejects_unknown_bundle_versions() {
        let err = KeyStore::from_json(&bundle_json("MDAB-KEYS-9.9")).unwrap_err();
        assert!(matches!(err, KeyBundleError::Version(v) if v == "MDAB-KEYS-9.9"));
    }

    #[test]
    fn rejects_non_ed25519_keys() {
        let text = bundle_json("MDAB-KEYS-0.1").replace("ed25519", "secp256k1");
        assert!(matches!(
            KeyStore::from_json(&text).unwrap_err(),
            KeyBundleError::Key { .. }
        ));
    }

    #[test]
    fn rejects_truncated_public_keys() {
        let text = bundle_json("MDAB-KEYS-0.1").replace(&test_public_key_b64(7), "AAAA");
        assert!(matches!(
            KeyStore::from_json(&text).unwrap_err(),
            KeyBundleError::Key { .. }
        ));
    }

    #[test]
    fn rejects_offset_timestamps_in_windows() {
        let text =
            bundle_json("MDAB-KEYS-0.1").replace("2027-01-01T00:00:00Z", "2027-01-01T00:00:00+00:00");
        assert!(matches!(
            KeyStore::from_json(&text).unwrap_err(),
            KeyBundleError::Key { .. }
        ));
    }

    #[test]
    fn empty_bundle_sections_default_cleanly() {
        let store = KeyStore::from_json(r#"{"version":"MDAB-KEYS-0.1"}"#).unwrap();
        assert!(store.is_empty());
    }
}
