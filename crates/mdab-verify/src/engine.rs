//! The fail-fast stream verification engine.
//!
//! `StreamVerifier` drives every layer over a stream, one line at a time:
//!
//! 1. **Structural** — strict parse, then the numeric policy gate.
//! 2. **Schema** — `event_type` dispatch and JSON-Schema conformance.
//! 3. **Content** — decision-hash and event-hash recomputation.
//! 4. **Chain** — per-emitter seq/prev-hash transitions.
//! 5. **Checkpoint** — block hashes over accepted DECISION ranges.
//! 6. **Cryptographic** — detached Ed25519 signatures under `ha`, or
//!    whenever an event volunteers one.
//!
//! The ordering is a protocol contract: a malformed event never reaches
//! signature verification, and every failure maps to exactly one code on the
//! first offending line.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use mdab_canon::{numeric, parse_line, sha256_prefixed, NumericError, ParseError, Value};
use mdab_contracts::{
    parse_ts_utc, DecisionBody, ErrorCode, Event, EventType, Profile, Verdict, Violation,
};
use mdab_keys::{verify_event_signature, KeyBundleError, KeyStore, SignatureError};
use mdab_schema::{SchemaBuildError, SchemaRegistry};

use crate::chain::{ChainError, ChainSet};
use crate::checkpoint::{verify_checkpoint, CheckpointError};

/// Fatal setup failures, distinct from per-line verdicts: the caller maps
/// these to its usage/I-O exit path.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Keys(#[from] KeyBundleError),

    #[error("schema registry failed to build: {0}")]
    Schemas(#[from] SchemaBuildError),
}

/// A failure local to one line; the driver attaches the line number.
struct LineFault {
    code: ErrorCode,
    detail: Option<String>,
}

impl LineFault {
    fn code(code: ErrorCode) -> Self {
        Self { code, detail: None }
    }

    fn detailed(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }
}

impl From<ParseError> for LineFault {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::DuplicateKey { .. } => LineFault::code(ErrorCode::DuplicateKey),
            ParseError::Syntax { .. } => LineFault::code(ErrorCode::ParseError),
        }
    }
}

impl From<NumericError> for LineFault {
    fn from(e: NumericError) -> Self {
        match e {
            NumericError::FloatForbidden => LineFault::code(ErrorCode::FloatForbidden),
            NumericError::IntOutOfRange => LineFault::code(ErrorCode::IntRange),
        }
    }
}

impl From<ChainError> for LineFault {
    fn from(e: ChainError) -> Self {
        LineFault::code(e.code())
    }
}

impl From<CheckpointError> for LineFault {
    fn from(e: CheckpointError) -> Self {
        // The variant distinction is diagnostic only; the stream-level code
        // is always the same.
        debug!(reason = %e, "checkpoint verification failed");
        LineFault::code(ErrorCode::BlockhashMismatch)
    }
}

impl From<SignatureError> for LineFault {
    fn from(e: SignatureError) -> Self {
        LineFault::code(e.code())
    }
}

/// The stream verifier. One instance verifies one stream: chain state
/// accumulates per emitter for the lifetime of the run and is never
/// persisted.
pub struct StreamVerifier {
    profile: Profile,
    schemas: SchemaRegistry,
    keys_path: Option<PathBuf>,
    keys: Option<KeyStore>,
    chains: ChainSet,
}

impl StreamVerifier {
    /// Build a verifier that reads its key bundle from `keys_path`.
    ///
    /// Under `ha` the bundle is loaded eagerly — a verifier that cannot check
    /// signatures must not start. Under `core`/`audit` it is loaded lazily on
    /// the first signature-bearing event; a load failure there surfaces as
    /// `E_KEY_UNKNOWN` on that line.
    pub fn new(profile: Profile, keys_path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let keys_path = keys_path.into();
        let keys = if profile.requires_signatures() {
            Some(KeyStore::load(&keys_path)?)
        } else {
            None
        };
        Ok(Self {
            profile,
            schemas: SchemaRegistry::new()?,
            keys_path: Some(keys_path),
            keys,
            chains: ChainSet::default(),
        })
    }

    /// Build a verifier around an already-loaded key store.
    pub fn with_key_store(profile: Profile, keys: KeyStore) -> Result<Self, EngineError> {
        Ok(Self {
            profile,
            schemas: SchemaRegistry::new()?,
            keys_path: None,
            keys: Some(keys),
            chains: ChainSet::default(),
        })
    }

    /// Verify a whole stream, fail-fast.
    ///
    /// Lines are the non-blank lines of `stream`, numbered from 1; the first
    /// failure halts verification.
    pub fn verify(&mut self, stream: &str) -> Verdict {
        let mut line_no = 0usize;
        for line in stream.lines() {
            if line.trim().is_empty() {
                continue;
            }
            line_no += 1;
            if let Err(fault) = self.verify_line(line) {
                warn!(line = line_no, code = %fault.code, "stream verification failed");
                return Verdict::Fail(Violation {
                    line: line_no,
                    code: fault.code,
                    detail: fault.detail,
                });
            }
        }
        debug!(profile = %self.profile, lines = line_no, "stream verified");
        Verdict::Pass
    }

    fn verify_line(&mut self, line: &str) -> Result<(), LineFault> {
        // Structural: strict parse, then the numeric policy gate.
        let tree = parse_line(line)?;
        numeric::check(&tree)?;

        // Schema: an unknown event_type never reaches a validator.
        let event_type = match tree.get("event_type").and_then(Value::as_str) {
            Some("DECISION") => EventType::Decision,
            Some("CHECKPOINT") => EventType::Checkpoint,
            _ => return Err(LineFault::code(ErrorCode::SchemaInvalid)),
        };

        let json = tree.to_json()?;
        if let Some(detail) = self.schemas.first_violation(event_type, self.profile, &json) {
            return Err(LineFault::detailed(ErrorCode::SchemaInvalid, detail));
        }

        // The schema has pinned shape and types, so this cannot fail for a
        // conforming event.
        let event: Event = serde_json::from_value(json)
            .map_err(|e| LineFault::detailed(ErrorCode::SchemaInvalid, e.to_string()))?;

        // Content: the decision hash is checked under every profile.
        if event.event_type == EventType::Decision {
            self.check_decision_hash(&tree, &event)?;
        }

        if self.profile.requires_chain() {
            self.check_event_hash(&tree, &event)?;

            let chain = self.chains.chain_mut(&event.emitter);
            chain.accept(event.seq, event.prev_event_hash.as_deref(), &event.event_hash)?;
            match event.event_type {
                EventType::Decision => chain.record_decision(event.seq, &event.event_hash),
                EventType::Checkpoint => {
                    let body = event
                        .checkpoint
                        .as_ref()
                        .ok_or_else(|| LineFault::code(ErrorCode::SchemaInvalid))?;
                    verify_checkpoint(chain, body)?;
                }
            }
        }

        if self.profile.requires_signatures() || event.signature.is_some() {
            self.check_signature(&event)?;
        }
        Ok(())
    }

    /// Recompute the canonical hash of `decision_core` and compare against
    /// the declared `decision_hash` (or its `decision_digest` alias).
    fn check_decision_hash(&self, tree: &Value, event: &Event) -> Result<(), LineFault> {
        let core = tree
            .get("decision")
            .and_then(|d| d.get("decision_core"))
            .ok_or_else(|| LineFault::code(ErrorCode::SchemaInvalid))?;
        let computed = sha256_prefixed(core)?;
        let declared = event
            .decision
            .as_ref()
            .and_then(DecisionBody::declared_hash);
        if declared != Some(computed.as_str()) {
            return Err(LineFault::code(ErrorCode::DecisionHashMismatch));
        }
        Ok(())
    }

    /// Recompute the event's own hash over its canonical form with
    /// `event_hash` and `signature` removed.
    fn check_event_hash(&self, tree: &Value, event: &Event) -> Result<(), LineFault> {
        let stripped = tree.without_members(&["event_hash", "signature"]);
        let computed = sha256_prefixed(&stripped)?;
        if computed != event.event_hash {
            return Err(LineFault::code(ErrorCode::HashMismatch));
        }
        Ok(())
    }

    fn check_signature(&mut self, event: &Event) -> Result<(), LineFault> {
        let sig = event
            .signature
            .as_ref()
            .ok_or_else(|| LineFault::code(ErrorCode::SchemaInvalid))?;

        let keys = self.keys()?;
        let key = keys
            .get(&sig.key_id)
            .ok_or_else(|| LineFault::code(ErrorCode::KeyUnknown))?;

        // The schema pins ts_utc to an RFC 3339 Z-suffixed pattern, so only
        // calendar-invalid values can still fail here.
        let ts = parse_ts_utc(&event.ts_utc)
            .map_err(|e| LineFault::detailed(ErrorCode::SchemaInvalid, format!("ts_utc: {e}")))?;

        verify_event_signature(sig, key, ts, &event.event_hash)?;
        Ok(())
    }

    /// The key store, loaded from `keys_path` on first need.
    fn keys(&mut self) -> Result<&KeyStore, LineFault> {
        if self.keys.is_none() {
            let path = self
                .keys_path
                .as_ref()
                .ok_or_else(|| LineFault::code(ErrorCode::KeyUnknown))?;
            match KeyStore::load(path) {
                Ok(store) => self.keys = Some(store),
                Err(e) => {
                    warn!(error = %e, "lazy key bundle load failed");
                    return Err(LineFault::code(ErrorCode::KeyUnknown));
                }
            }
        }
        self.keys
            .as_ref()
            .ok_or_else(|| LineFault::code(ErrorCode::KeyUnknown))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
