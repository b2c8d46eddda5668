//! # mdab-schema
//!
//! The four event schemas of the MDAB stream format (DECISION/CHECKPOINT ×
//! base/high-assurance) and the registry that compiles them.
//!
//! The documents are JSON-Schema Draft 2020-12, each with a stable `$id`
//! under `https://mdab.dev/schemas/`, and they reference each other through
//! a shared definitions document. All five are compiled into the binary via
//! `include_str!`; cross-schema `$ref` resolution never leaves memory.

pub mod registry;

pub use registry::{SchemaBuildError, SchemaRegistry};
