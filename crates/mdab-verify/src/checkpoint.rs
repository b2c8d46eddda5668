//! Checkpoint verification: block hashes over contiguous DECISION ranges.
//!
//! Block material layout (UTF-8 bytes, in order):
//!
//!   1. the literal header line `MDAB-BLOCK-0.1`
//!   2. each DECISION `event_hash` in ascending seq
//!
//! every line — the last hash included — terminated by a single `\n`.

use thiserror::Error;

use mdab_canon::sha256_prefixed_bytes;
use mdab_contracts::CheckpointBody;

use crate::chain::ChainState;

/// First line of every block's hash material.
pub const BLOCK_HEADER: &str = "MDAB-BLOCK-0.1";

/// Every variant surfaces as `E_BLOCKHASH_MISMATCH`; the distinction exists
/// for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("checkpoint range [{start}, {end}] is inverted")]
    InvertedRange { start: i64, end: i64 },

    #[error("no accepted DECISION at seq {0} in this chain")]
    MissingDecision(i64),

    #[error("block_hash does not match the recomputed block digest")]
    BlockHashMismatch,

    #[error("last_event_hash does not match the final hash in the range")]
    LastHashMismatch,
}

/// Verify one CHECKPOINT body against its emitter's chain state.
pub fn verify_checkpoint(
    chain: &ChainState,
    checkpoint: &CheckpointBody,
) -> Result<(), CheckpointError> {
    let (start, end) = (checkpoint.range_start_seq, checkpoint.range_end_seq);
    if start > end {
        return Err(CheckpointError::InvertedRange { start, end });
    }

    // No preallocation from the declared width: a hostile range is rejected
    // at its first seq with no accepted DECISION.
    let mut hashes = Vec::new();
    for seq in start..=end {
        let hash = chain
            .decision_hash(seq)
            .ok_or(CheckpointError::MissingDecision(seq))?;
        hashes.push(hash);
    }

    let mut material = String::from(BLOCK_HEADER);
    material.push('\n');
    for hash in &hashes {
        material.push_str(hash);
        material.push('\n');
    }

    if sha256_prefixed_bytes(material.as_bytes()) != checkpoint.block_hash {
        return Err(CheckpointError::BlockHashMismatch);
    }

    // start <= end guarantees at least one entry.
    if hashes.last().copied() != Some(checkpoint.last_event_hash.as_str()) {
        return Err(CheckpointError::LastHashMismatch);
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
