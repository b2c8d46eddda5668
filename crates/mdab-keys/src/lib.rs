//! # mdab-keys
//!
//! The time-scoped key bundle (`MDAB-KEYS-0.1`) and detached Ed25519
//! signature verification.
//!
//! A bundle binds key ids to 32-byte public keys with validity windows,
//! statuses, and revocation instants. Signatures cover the raw digest bytes
//! of an event's own `event_hash` — not the event text — so a signature stays
//! checkable from the hash alone.

pub mod bundle;
pub mod signature;

pub use bundle::{KeyBundleError, KeyRecord, KeyStore, KEY_BUNDLE_VERSION, STATUS_ACTIVE};
pub use signature::{verify_event_signature, SignatureError};
