#![deny(missing_docs)]

//! # Contract Core
//!
//! Core library of the contract compiler: Contract IR, validation, type
//! mapping, model/DTO emission and the consolidated schema manifest.

/// Shared error types.
pub mod error;

/// Compiler configuration.
pub mod config;

/// Optional module presence flags.
pub mod capabilities;

/// Contract IR, builders and loading.
pub mod contract;

/// Structural contract checks.
pub mod validation;

/// Type mapping logic (protocol tags -> target, JSON Schema and doc types).
pub mod type_mapping;

/// Model, field and DTO emission.
pub mod emitter;

/// Consolidated schema manifest.
pub mod manifest;

/// Import path resolution between artifacts.
pub mod resolver;

/// Artifact writes.
pub mod writer;

/// Two-pass compilation orchestrator.
pub mod compiler;

pub use capabilities::{CapabilitySet, ModuleProbe};
pub use compiler::{CompileFailure, CompileReport, Compiler};
pub use config::{CompilerConfig, EmissionPolicy, StorageBackend};
pub use contract::{
    load_contract_value, parse_contracts, Contract, ContractBuilder, ContractLink, Field,
    FieldBuilder, Message, MessageBuilder, MessageProperty, ProtoType,
};
pub use emitter::{emit_model, resolve_links, EmitContext, ModelEmitter};
pub use error::{AppError, AppResult};
pub use manifest::{Manifest, ManifestModules};
pub use resolver::{ArtifactKind, ImportResolver, LayoutResolver, OutputLayout};
pub use type_mapping::{to_doc_type, to_json_schema_type, to_json_type, to_target_type, JsonType};
pub use validation::{validate_contract, validate_raw_contract};
pub use writer::{write_artifact, WriteOutcome};
