//! Verification depth profiles.

use std::fmt;
use std::str::FromStr;

/// Selects how deep the per-line pipeline runs.
///
/// `core` stops after the decision-hash check; `audit` adds event hashing,
/// chain, and checkpoint verification; `ha` additionally requires a valid
/// signature on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Core,
    Audit,
    Ha,
}

impl Profile {
    /// Whether event-hash, chain, and checkpoint verification run.
    pub fn requires_chain(&self) -> bool {
        matches!(self, Profile::Audit | Profile::Ha)
    }

    /// Whether every event must carry a verifiable signature. Events that
    /// volunteer a signature are verified under every profile regardless.
    pub fn requires_signatures(&self) -> bool {
        matches!(self, Profile::Ha)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Core => "core",
            Profile::Audit => "audit",
            Profile::Ha => "ha",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Profile::Core),
            "audit" => Ok(Profile::Audit),
            "ha" => Ok(Profile::Ha),
            other => Err(format!(
                "unknown profile '{other}' (expected core, audit, or ha)"
            )),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
