//! MDAB — Telemetry Chain Verifier CLI
//!
//! Verifies an append-only telemetry audit stream and renders a single
//! PASS/FAIL verdict.
//!
//! Profiles:
//!   core   : schema + decision_hash checks
//!   audit  : core + event_hash + chain + checkpoint verification
//!   ha     : audit + ed25519 signature + key validity (signature required)
//!
//! Exit codes:
//!   0 PASS
//!   1 FAIL (verification error)
//!   2 FAIL (usage / IO)
//!
//! Usage:
//!   mdab-verify stream.jsonl
//!   mdab-verify --profile ha --keys keys/verifier_keys.json stream.jsonl

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mdab_contracts::{Profile, Verdict};
use mdab_verify::{EngineError, StreamVerifier};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Verify the integrity, authenticity, and well-formedness of an MDAB
/// telemetry audit stream.
#[derive(Parser)]
#[command(
    name = "mdab-verify",
    about = "MDAB telemetry audit stream verifier",
    long_about = "Verifies an append-only telemetry audit stream: strict parsing,\n\
                  numeric policy, schema conformance, content hashes, per-emitter\n\
                  hash chains, checkpoint block hashes, and Ed25519 signatures.\n\
                  Halts on the first offending line with a stable E_* error code."
)]
struct Cli {
    /// Path to the stream file (one JSON event per line).
    stream: PathBuf,

    /// Verification depth.
    #[arg(long, value_enum, default_value = "audit")]
    profile: ProfileArg,

    /// Key bundle used for signature verification.
    #[arg(long, default_value = "keys/verifier_keys.json")]
    keys: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    Core,
    Audit,
    Ha,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Core => Profile::Core,
            ProfileArg::Audit => Profile::Audit,
            ProfileArg::Ha => Profile::Ha,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Structured logging to stderr; RUST_LOG=debug for verbose output. The
    // verdict lines on stdout stay machine-parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let stream = match fs::read_to_string(&cli.stream) {
        Ok(text) => text,
        Err(e) => {
            println!("[FAIL] IO_ERROR: {e}");
            return ExitCode::from(2);
        }
    };

    let mut verifier = match StreamVerifier::new(cli.profile.into(), cli.keys) {
        Ok(verifier) => verifier,
        Err(EngineError::Keys(e)) => {
            println!("[FAIL] key bundle load error: {e}");
            return ExitCode::from(2);
        }
        Err(e) => {
            println!("[FAIL] {e}");
            return ExitCode::from(2);
        }
    };

    match verifier.verify(&stream) {
        Verdict::Pass => {
            println!("=== RESULT: PASS ===");
            ExitCode::SUCCESS
        }
        Verdict::Fail(violation) => {
            println!("=== RESULT: FAIL ===");
            println!("[FAIL] {violation}");
            ExitCode::from(1)
        }
    }
}
