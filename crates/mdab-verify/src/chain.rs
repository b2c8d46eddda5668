//! Per-emitter chain state machines.
//!
//! Every emitter quadruple owns one independent chain. A chain accepts
//! events whose `seq` values run 0, 1, 2, … with each event's
//! `prev_event_hash` equal to the previous event's `event_hash` (null at
//! seq 0). Accepted DECISION hashes are retained by seq for checkpoint
//! verification — later checkpoints may reach back to any earlier range.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use mdab_contracts::{Emitter, ErrorCode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("seq {seq} replays an already-accepted position (expected {expected})")]
    NonMonotonic { seq: i64, expected: i64 },

    #[error("seq {seq} skips ahead of the expected position {expected}")]
    Gap { seq: i64, expected: i64 },

    #[error("prev_event_hash does not link to the previous accepted event")]
    Break,
}

impl ChainError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ChainError::NonMonotonic { .. } => ErrorCode::SeqNonMonotonic,
            ChainError::Gap { .. } => ErrorCode::SeqGap,
            ChainError::Break => ErrorCode::ChainBreak,
        }
    }
}

/// The verifier-local state of one emitter chain.
#[derive(Debug, Default)]
pub struct ChainState {
    /// The next sequence number this chain will accept.
    expected_seq: i64,

    /// The `event_hash` of the last accepted event; absent before the first.
    prev_hash: Option<String>,

    /// `seq → event_hash` for every accepted DECISION, kept for the whole
    /// run so checkpoints can reference arbitrary earlier ranges.
    decision_hashes: BTreeMap<i64, String>,
}

impl ChainState {
    /// Apply one event's chain fields. On success the chain advances:
    /// `expected_seq` increments and `prev_hash` becomes this event's hash.
    pub fn accept(
        &mut self,
        seq: i64,
        prev_event_hash: Option<&str>,
        event_hash: &str,
    ) -> Result<(), ChainError> {
        if seq < self.expected_seq {
            return Err(ChainError::NonMonotonic {
                seq,
                expected: self.expected_seq,
            });
        }
        if seq > self.expected_seq {
            return Err(ChainError::Gap {
                seq,
                expected: self.expected_seq,
            });
        }

        let linked = if self.expected_seq == 0 {
            prev_event_hash.is_none()
        } else {
            prev_event_hash == self.prev_hash.as_deref()
        };
        if !linked {
            return Err(ChainError::Break);
        }

        self.expected_seq += 1;
        self.prev_hash = Some(event_hash.to_string());
        Ok(())
    }

    /// Record an accepted DECISION's hash for later checkpoint ranges.
    pub fn record_decision(&mut self, seq: i64, event_hash: &str) {
        self.decision_hashes.insert(seq, event_hash.to_string());
    }

    /// The hash of the accepted DECISION at `seq`, if one exists.
    pub fn decision_hash(&self, seq: i64) -> Option<&str> {
        self.decision_hashes.get(&seq).map(String::as_str)
    }
}

/// All chains observed during one run, keyed by emitter identity.
#[derive(Debug, Default)]
pub struct ChainSet {
    chains: HashMap<Emitter, ChainState>,
}

impl ChainSet {
    /// The chain for `emitter`, created empty on first sight.
    pub fn chain_mut(&mut self, emitter: &Emitter) -> &mut ChainState {
        self.chains.entry(emitter.clone()).or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
