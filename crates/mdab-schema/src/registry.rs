//! Schema compilation and profile-aware validator selection.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri, Validator};
use thiserror::Error;
use tracing::debug;

use mdab_contracts::{EventType, Profile};

const COMMON: &str = include_str!("../schemas/common.schema.json");
const DECISION: &str = include_str!("../schemas/decision_event.schema.json");
const CHECKPOINT: &str = include_str!("../schemas/checkpoint_event.schema.json");
const DECISION_HA: &str = include_str!("../schemas/decision_event.ha.schema.json");
const CHECKPOINT_HA: &str = include_str!("../schemas/checkpoint_event.ha.schema.json");

#[derive(Debug, Error)]
pub enum SchemaBuildError {
    #[error("embedded schema '{name}' is not valid JSON: {source}")]
    Parse {
        name: &'static str,
        source: serde_json::Error,
    },

    #[error("embedded schema '{name}' has no $id")]
    MissingId { name: &'static str },

    #[error("schema '{name}' failed to compile: {reason}")]
    Compile { name: &'static str, reason: String },
}

/// Resolves `$ref` targets against the embedded documents, keyed by `$id`.
#[derive(Clone)]
struct EmbeddedRetriever {
    documents: Arc<HashMap<String, serde_json::Value>>,
}

impl Retrieve for EmbeddedRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        self.documents
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| format!("unresolved schema reference: {uri}").into())
    }
}

/// The compiled validators for every event variant × profile combination.
pub struct SchemaRegistry {
    decision: Validator,
    checkpoint: Validator,
    decision_ha: Validator,
    checkpoint_ha: Validator,
}

impl SchemaRegistry {
    /// Parse and compile all embedded schemas.
    pub fn new() -> Result<Self, SchemaBuildError> {
        let sources = [
            ("common.schema.json", COMMON),
            ("decision_event.schema.json", DECISION),
            ("checkpoint_event.schema.json", CHECKPOINT),
            ("decision_event.ha.schema.json", DECISION_HA),
            ("checkpoint_event.ha.schema.json", CHECKPOINT_HA),
        ];

        let mut by_id = HashMap::new();
        let mut by_name: HashMap<&'static str, serde_json::Value> = HashMap::new();
        for (name, text) in sources {
            let doc: serde_json::Value = serde_json::from_str(text)
                .map_err(|source| SchemaBuildError::Parse { name, source })?;
            let id = doc
                .get("$id")
                .and_then(serde_json::Value::as_str)
                .ok_or(SchemaBuildError::MissingId { name })?
                .to_string();
            by_id.insert(id, doc.clone());
            by_name.insert(name, doc);
        }

        let retriever = EmbeddedRetriever {
            documents: Arc::new(by_id),
        };

        let registry = SchemaRegistry {
            decision: compile("decision_event.schema.json", &by_name, &retriever)?,
            checkpoint: compile("checkpoint_event.schema.json", &by_name, &retriever)?,
            decision_ha: compile("decision_event.ha.schema.json", &by_name, &retriever)?,
            checkpoint_ha: compile("checkpoint_event.ha.schema.json", &by_name, &retriever)?,
        };
        debug!("schema registry compiled");
        Ok(registry)
    }

    /// The validator for `event_type` under `profile`. The `core` and
    /// `audit` profiles share the base schemas; `ha` selects the variants
    /// that additionally require a signature.
    pub fn validator(&self, event_type: EventType, profile: Profile) -> &Validator {
        match (event_type, profile.requires_signatures()) {
            (EventType::Decision, false) => &self.decision,
            (EventType::Checkpoint, false) => &self.checkpoint,
            (EventType::Decision, true) => &self.decision_ha,
            (EventType::Checkpoint, true) => &self.checkpoint_ha,
        }
    }

    /// The first schema violation for `instance`, ordered by instance path.
    ///
    /// Rendered as `"<dot.path>: <message>"`, or the bare message when the
    /// violation is at the document root. `None` means the instance conforms.
    pub fn first_violation(
        &self,
        event_type: EventType,
        profile: Profile,
        instance: &serde_json::Value,
    ) -> Option<String> {
        let validator = self.validator(event_type, profile);
        let mut errors: Vec<(String, String)> = validator
            .iter_errors(instance)
            .map(|e| (e.instance_path.to_string(), e.to_string()))
            .collect();
        errors.sort();
        errors.into_iter().next().map(|(pointer, message)| {
            let path = pointer.trim_start_matches('/').replace('/', ".");
            if path.is_empty() {
                message
            } else {
                format!("{path}: {message}")
            }
        })
    }
}

fn compile(
    name: &'static str,
    by_name: &HashMap<&'static str, serde_json::Value>,
    retriever: &EmbeddedRetriever,
) -> Result<Validator, SchemaBuildError> {
    let doc = by_name.get(name).ok_or(SchemaBuildError::MissingId { name })?;
    jsonschema::options()
        .with_retriever(retriever.clone())
        .build(doc)
        .map_err(|e| SchemaBuildError::Compile {
            name,
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use mdab_contracts::{EventType, Profile};

    use super::SchemaRegistry;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new().expect("embedded schemas must compile")
    }

    fn hash(fill: char) -> String {
        format!("sha256:{}", fill.to_string().repeat(64))
    }

    fn decision_event() -> serde_json::Value {
        json!({
            "event_type": "DECISION",
            "ts_utc": "2026-03-01T12:00:00Z",
            "seq": 0,
            "prev_event_hash": null,
            "event_hash": hash('a'),
            "emitter": {
                "service": "risk-engine",
                "instance_id": "i-0001",
                "env": "prod",
                "region": "eu-west-1"
            },
            "decision": {
                "decision_core": { "outcome": "allow" },
                "decision_hash": hash('b')
            }
        })
    }

    fn checkpoint_event() -> serde_json::Value {
        json!({
            "event_type": "CHECKPOINT",
            "ts_utc": "2026-03-01T12:05:00Z",
            "seq": 3,
            "prev_event_hash": hash('c'),
            "event_hash": hash('d'),
            "emitter": {
                "service": "risk-engine",
                "instance_id": "i-0001",
                "env": "prod",
                "region": "eu-west-1"
            },
            "checkpoint": {
                "range_start_seq": 0,
                "range_end_seq": 2,
                "block_hash": hash('e'),
                "last_event_hash": hash('f')
            }
        })
    }

    #[test]
    fn valid_events_conform_to_their_base_schemas() {
        let registry = registry();
        assert_eq!(
            registry.first_violation(EventType::Decision, Profile::Audit, &decision_event()),
            None
        );
        assert_eq!(
            registry.first_violation(EventType::Checkpoint, Profile::Audit, &checkpoint_event()),
            None
        );
    }

    /// The cross-schema `$ref` into the shared definitions resolves: a
    /// malformed emitter is caught by the common document.
    #[test]
    fn emitter_shape_is_enforced_through_the_shared_ref() {
        let registry = registry();
        let mut event = decision_event();
        event["emitter"].as_object_mut().unwrap().remove("region");
        let detail = registry
            .first_violation(EventType::Decision, Profile::Core, &event)
            .expect("missing emitter.region must be a violation");
        assert!(detail.contains("region"), "detail: {detail}");
    }

    #[test]
    fn detail_carries_the_instance_path() {
        let registry = registry();
        let mut event = decision_event();
        event["seq"] = json!(-1);
        let detail = registry
            .first_violation(EventType::Decision, Profile::Audit, &event)
            .expect("negative seq must be a violation");
        assert!(detail.starts_with("seq:"), "detail: {detail}");
    }

    #[test]
    fn unknown_top_level_members_are_rejected() {
        let registry = registry();
        let mut event = decision_event();
        event["debug_note"] = json!("added by a misbehaving emitter");
        assert!(registry
            .first_violation(EventType::Decision, Profile::Audit, &event)
            .is_some());
    }

    #[test]
    fn malformed_hash_strings_are_rejected() {
        let registry = registry();
        let mut event = decision_event();
        event["event_hash"] = json!("sha256:notahash");
        assert!(registry
            .first_violation(EventType::Decision, Profile::Audit, &event)
            .is_some());
    }

    /// The `decision_digest` alias satisfies the hash requirement on its own.
    #[test]
    fn decision_digest_alias_is_accepted() {
        let registry = registry();
        let mut event = decision_event();
        let decision = event["decision"].as_object_mut().unwrap();
        let h = decision.remove("decision_hash").unwrap();
        decision.insert("decision_digest".into(), h);
        assert_eq!(
            registry.first_violation(EventType::Decision, Profile::Audit, &event),
            None
        );
    }

    #[test]
    fn decision_without_any_hash_field_is_rejected() {
        let registry = registry();
        let mut event = decision_event();
        event["decision"].as_object_mut().unwrap().remove("decision_hash");
        assert!(registry
            .first_violation(EventType::Decision, Profile::Audit, &event)
            .is_some());
    }

    /// Base schemas tolerate an absent signature; the high-assurance
    /// variants require one.
    #[test]
    fn ha_profile_requires_a_signature() {
        let registry = registry();
        let unsigned = decision_event();
        assert_eq!(
            registry.first_violation(EventType::Decision, Profile::Audit, &unsigned),
            None
        );
        assert!(registry
            .first_violation(EventType::Decision, Profile::Ha, &unsigned)
            .is_some());

        let mut signed = decision_event();
        signed["signature"] = json!({
            "alg": "ed25519",
            "key_id": "svc-2026",
            "sig_b64": "AAAA"
        });
        assert_eq!(
            registry.first_violation(EventType::Decision, Profile::Ha, &signed),
            None
        );
    }

    #[test]
    fn non_ed25519_signature_alg_fails_the_schema() {
        let registry = registry();
        let mut event = decision_event();
        event["signature"] = json!({
            "alg": "rsa-pss",
            "key_id": "svc-2026",
            "sig_b64": "AAAA"
        });
        assert!(registry
            .first_violation(EventType::Decision, Profile::Audit, &event)
            .is_some());
    }

    #[test]
    fn timestamps_must_carry_the_zulu_suffix() {
        let registry = registry();
        let mut event = decision_event();
        event["ts_utc"] = json!("2026-03-01T12:00:00+00:00");
        assert!(registry
            .first_violation(EventType::Decision, Profile::Audit, &event)
            .is_some());
    }
}
