//! The stable error-code taxonomy and the verifier's verdict types.
//!
//! Every verification failure maps to exactly one `ErrorCode`, surfaced on
//! the first offending line. The codes are a protocol contract: conformance
//! fixtures match on the literal `E_*` identifiers, so they must never be
//! renamed.

use std::fmt;

/// Stable identifier for a verification failure, ordered by the pipeline
/// phase that surfaces it: structural, schema, content, chain, checkpoint,
/// cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The line is not a single well-formed JSON object under strict rules.
    ParseError,
    /// An object somewhere in the event repeats a key.
    DuplicateKey,
    /// A fractional or exponent-bearing numeric literal appeared.
    FloatForbidden,
    /// An integer literal falls outside signed 64-bit range.
    IntRange,
    /// The event does not conform to its selected schema, or its
    /// `event_type` is unknown.
    SchemaInvalid,
    /// `decision_hash` does not match the canonical hash of `decision_core`.
    DecisionHashMismatch,
    /// `event_hash` does not match the event's recomputed canonical hash.
    HashMismatch,
    /// `seq` replays an already-accepted position in the emitter chain.
    SeqNonMonotonic,
    /// `seq` skips ahead of the next expected position.
    SeqGap,
    /// `prev_event_hash` does not link to the previous accepted event.
    ChainBreak,
    /// The checkpoint range, block hash, or last-event hash is wrong.
    BlockhashMismatch,
    /// The signing key is not present in the key bundle.
    KeyUnknown,
    /// The event timestamp is outside the signing key's validity window.
    KeyExpired,
    /// The signing key is revoked or not active.
    KeyRevoked,
    /// The signature itself (or its algorithm tag) fails verification.
    SigInvalid,
}

impl ErrorCode {
    /// The wire-format identifier printed in FAIL lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "E_PARSE_ERROR",
            ErrorCode::DuplicateKey => "E_DUPLICATE_KEY",
            ErrorCode::FloatForbidden => "E_FLOAT_FORBIDDEN",
            ErrorCode::IntRange => "E_INT_RANGE",
            ErrorCode::SchemaInvalid => "E_SCHEMA_INVALID",
            ErrorCode::DecisionHashMismatch => "E_DECISION_HASH_MISMATCH",
            ErrorCode::HashMismatch => "E_HASH_MISMATCH",
            ErrorCode::SeqNonMonotonic => "E_SEQ_NON_MONOTONIC",
            ErrorCode::SeqGap => "E_SEQ_GAP",
            ErrorCode::ChainBreak => "E_CHAIN_BREAK",
            ErrorCode::BlockhashMismatch => "E_BLOCKHASH_MISMATCH",
            ErrorCode::KeyUnknown => "E_KEY_UNKNOWN",
            ErrorCode::KeyExpired => "E_KEY_EXPIRED",
            ErrorCode::KeyRevoked => "E_KEY_REVOKED",
            ErrorCode::SigInvalid => "E_SIG_INVALID",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verification failure pinned to a stream line.
///
/// `line` counts the non-blank lines of the stream, starting at 1. `detail`
/// is present only for codes that carry one (currently schema violations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub line: usize,
    pub code: ErrorCode,
    pub detail: Option<String>,
}

impl Violation {
    pub fn new(line: usize, code: ErrorCode) -> Self {
        Self {
            line,
            code,
            detail: None,
        }
    }

    pub fn with_detail(line: usize, code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            line,
            code,
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for Violation {
    /// Renders the body of a FAIL line: `line=<n> <CODE>` plus the
    /// parenthesized detail when one exists.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "line={} {} ({})", self.line, self.code, detail),
            None => write!(f, "line={} {}", self.line, self.code),
        }
    }
}

/// The single binary outcome of verifying one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Violation),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
