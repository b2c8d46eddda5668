//! # mdab-verify
//!
//! The verification core of the MDAB telemetry audit stream: per-emitter
//! hash-chain state machines, checkpoint (block hash) verification, and the
//! fail-fast engine that drives every layer over a stream line by line.
//!
//! ## Overview
//!
//! Each line flows strictly left to right through the layers: strict parse,
//! numeric policy, schema, decision hash, event hash, chain transition,
//! checkpoint, signature. The first failure halts the run and names the
//! offending line with one of the stable `E_*` codes. Which layers run is
//! selected by the [`Profile`](mdab_contracts::Profile).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mdab_contracts::{Profile, Verdict};
//! use mdab_verify::StreamVerifier;
//!
//! let mut verifier = StreamVerifier::new(Profile::Audit, "keys/verifier_keys.json")?;
//! match verifier.verify(&stream_text) {
//!     Verdict::Pass => println!("ok"),
//!     Verdict::Fail(violation) => eprintln!("{violation}"),
//! }
//! ```

pub mod chain;
pub mod checkpoint;
pub mod engine;

pub use chain::{ChainError, ChainSet, ChainState};
pub use checkpoint::{verify_checkpoint, CheckpointError, BLOCK_HEADER};
pub use engine::{EngineError, StreamVerifier};
