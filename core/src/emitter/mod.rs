#![deny(missing_docs)]

//! # Emitters
//!
//! Turn Contract IR into TypeScript model modules.
//!
//! - **field**: Annotations and declaration of one model property.
//! - **message**: Shape interface and conversion class of one DTO.
//! - **schema**: The fast JSON schema structure of a model.
//! - **model**: Orchestrates the above into one module per contract.
//! - **imports**: Import block composition.

pub mod field;
pub mod imports;
pub mod message;
pub mod model;
pub mod schema;

pub use field::{emit_field, LinkTarget};
pub use imports::ImportSet;
pub use message::emit_message;
pub use model::{emit_model, resolve_links, ModelEmitter};
pub use schema::{build_schema_structure, SchemaNode};

use crate::capabilities::CapabilitySet;
use crate::config::{CompilerConfig, EmissionPolicy, StorageBackend};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Indentation unit of emitted code.
pub const INDENT: &str = "    ";

/// Models that never carry an identity property.
pub const RESERVED_MODELS: [&str; 2] = ["Migrations", "Sessions"];

/// Everything emission decisions depend on besides the contract itself.
#[derive(Debug, Clone)]
pub struct EmitContext {
    /// Present optional modules.
    pub capabilities: CapabilitySet,
    /// Identity flavour.
    pub backend: StorageBackend,
    /// Import source of the core runtime.
    pub core_import: String,
    /// Per-field failure policy.
    pub policy: EmissionPolicy,
}

impl EmitContext {
    /// Context derived from configuration and capabilities.
    pub fn new(config: &CompilerConfig, capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            backend: config.storage_backend(),
            core_import: config.app.core_import.clone(),
            policy: config.app.emission_policy,
        }
    }

    /// True when document identities apply to this model.
    pub fn uses_document_identity(&self, model_name: &str) -> bool {
        self.backend == StorageBackend::Document && !is_reserved_model(model_name)
    }
}

/// True for the infrastructure models without identity.
pub fn is_reserved_model(model_name: &str) -> bool {
    RESERVED_MODELS.contains(&model_name)
}

/// True when `name` can be used verbatim as an identifier in emitted code.
pub fn is_identifier(name: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    let re = IDENT_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Invalid regex"));
    re.is_match(name)
}

/// Renders a JSON value as an expression literal.
pub fn literal(value: &Value) -> String {
    // Serializing a `Value` cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Renders a default value: strings are quoted unless `raw` is set.
pub fn default_literal(value: &Value, raw: bool) -> String {
    match value {
        Value::String(s) if raw => s.clone(),
        other => literal(other),
    }
}

/// Collapses runs of blank lines into a single blank line and trims the ends.
pub fn normalize_whitespace(code: &str) -> String {
    static BLANK_RE: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RE.get_or_init(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+\n").expect("Invalid regex"));
    let collapsed = re.replace_all(code, "\n\n");
    format!("{}\n", collapsed.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier() {
        assert!(is_identifier("email"));
        assert!(is_identifier("_id"));
        assert!(is_identifier("$meta"));
        assert!(!is_identifier("first-name"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_default_literal() {
        assert_eq!(default_literal(&json!("abc"), false), "\"abc\"");
        assert_eq!(default_literal(&json!("Status.Active"), true), "Status.Active");
        assert_eq!(default_literal(&json!(3), false), "3");
        assert_eq!(default_literal(&json!(true), true), "true");
        assert_eq!(default_literal(&json!([1, 2]), false), "[1,2]");
    }

    #[test]
    fn test_normalize_whitespace() {
        let code = "a\n\n\n\nb\n  \n\t\nc\n\n";
        assert_eq!(normalize_whitespace(code), "a\n\nb\n\nc\n");
    }

    #[test]
    fn test_reserved_models() {
        assert!(is_reserved_model("Migrations"));
        assert!(!is_reserved_model("User"));
    }
}
