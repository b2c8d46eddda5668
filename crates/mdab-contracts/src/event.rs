//! Typed views over stream events.
//!
//! These structs are deserialized from an event only after schema validation
//! has passed, so every required field is present with its declared type.
//! The `decision_core` subobject is deliberately absent here: it is opaque to
//! the verifier and is hashed from the parsed tree, never from this view.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two event variants an audit stream may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "DECISION")]
    Decision,
    #[serde(rename = "CHECKPOINT")]
    Checkpoint,
}

/// The identity quadruple owning one independent chain.
///
/// Value equality over all four fields is the chain key; the verifier never
/// interprets the individual components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emitter {
    pub service: String,
    pub instance_id: String,
    pub env: String,
    pub region: String,
}

impl fmt::Display for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}/{})",
            self.service, self.instance_id, self.env, self.region
        )
    }
}

/// The `decision` body of a DECISION event, minus the opaque `decision_core`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionBody {
    pub decision_hash: Option<String>,
    /// Accepted alias for `decision_hash`, consulted only when the primary
    /// field is absent.
    pub decision_digest: Option<String>,
}

impl DecisionBody {
    /// The hash the emitter declared for `decision_core`.
    pub fn declared_hash(&self) -> Option<&str> {
        self.decision_hash
            .as_deref()
            .or(self.decision_digest.as_deref())
    }
}

/// The `checkpoint` body of a CHECKPOINT event. The sequence range is
/// inclusive and refers to DECISION events in the same emitter chain.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointBody {
    pub range_start_seq: i64,
    pub range_end_seq: i64,
    pub block_hash: String,
    pub last_event_hash: String,
}

/// A detached signature over the raw digest bytes of the event's own
/// `event_hash`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSignature {
    pub alg: String,
    pub key_id: String,
    pub sig_b64: String,
}

/// One stream event, as seen after schema validation.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    /// RFC 3339 UTC timestamp with a mandatory `Z` suffix. Kept as text and
    /// parsed only on the signature path.
    pub ts_utc: String,
    pub seq: i64,
    /// Absent (null) exactly when `seq` is 0.
    pub prev_event_hash: Option<String>,
    /// `sha256:`-prefixed canonical hash of this event with `event_hash` and
    /// `signature` removed.
    pub event_hash: String,
    pub emitter: Emitter,
    #[serde(default)]
    pub decision: Option<DecisionBody>,
    #[serde(default)]
    pub checkpoint: Option<CheckpointBody>,
    #[serde(default)]
    pub signature: Option<EventSignature>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DecisionBody, Event, EventType};

    /// A full DECISION event deserializes with every field populated.
    #[test]
    fn decision_event_deserializes() {
        let event: Event = serde_json::from_value(json!({
            "event_type": "DECISION",
            "ts_utc": "2026-03-01T12:00:00Z",
            "seq": 0,
            "prev_event_hash": null,
            "event_hash": format!("sha256:{}", "a".repeat(64)),
            "emitter": {
                "service": "risk-engine",
                "instance_id": "i-0001",
                "env": "prod",
                "region": "eu-west-1"
            },
            "decision": {
                "decision_core": { "outcome": "allow" },
                "decision_hash": format!("sha256:{}", "b".repeat(64))
            }
        }))
        .unwrap();

        assert_eq!(event.event_type, EventType::Decision);
        assert_eq!(event.seq, 0);
        assert!(event.prev_event_hash.is_none());
        assert!(event.signature.is_none());
        assert_eq!(event.emitter.service, "risk-engine");
    }

    /// `declared_hash` prefers `decision_hash` and falls back to the alias.
    #[test]
    fn declared_hash_prefers_primary_field() {
        let both = DecisionBody {
            decision_hash: Some("sha256:primary".into()),
            decision_digest: Some("sha256:alias".into()),
        };
        assert_eq!(both.declared_hash(), Some("sha256:primary"));

        let alias_only = DecisionBody {
            decision_hash: None,
            decision_digest: Some("sha256:alias".into()),
        };
        assert_eq!(alias_only.declared_hash(), Some("sha256:alias"));

        let neither = DecisionBody {
            decision_hash: None,
            decision_digest: None,
        };
        assert_eq!(neither.declared_hash(), None);
    }

    /// Emitters compare by the full quadruple — one differing component is a
    /// different chain.
    #[test]
    fn emitter_identity_is_the_full_quadruple() {
        let base = super::Emitter {
            service: "svc".into(),
            instance_id: "i-1".into(),
            env: "prod".into(),
            region: "us-east-1".into(),
        };
        let mut other = base.clone();
        assert_eq!(base, other);

        other.region = "us-west-2".into();
        assert_ne!(base, other);
    }
}
