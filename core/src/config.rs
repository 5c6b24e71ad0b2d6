#![deny(missing_docs)]

//! # Configuration
//!
//! Compiler settings read from a YAML or JSON file. Every key is optional.
//!
//! ```yaml
//! app:
//!   generateSchema: true
//!   generatedDir: .generated
//!   sourceDir: src
//! repository:
//!   type: mongodb
//! ```

use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory for generated artifacts.
pub const DEFAULT_GENERATED_DIR: &str = ".generated";

/// Default core import source.
pub const DEFAULT_CORE_IMPORT: &str = "@contractc/core";

/// What to do when a single field fails to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionPolicy {
    /// Fail the whole model.
    #[default]
    Strict,
    /// Emit a marker comment in place of the field and continue.
    Placeholder,
}

/// Storage identity flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Document store: `_id` identities of type `ObjectId`.
    Document,
    /// Anything else: generic `id`.
    Generic,
}

/// The `app` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSection {
    /// Emit `schema.json` / `schema.yml`.
    pub generate_schema: bool,
    /// Generated artifacts directory, relative to the project root.
    pub generated_dir: String,
    /// Source directory used by module contracts, relative to the project root.
    pub source_dir: String,
    /// Import source of the core runtime.
    pub core_import: String,
    /// Optional path alias used for cross-directory model imports.
    pub import_alias: Option<String>,
    /// Per-field failure policy.
    pub emission_policy: EmissionPolicy,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            generate_schema: true,
            generated_dir: DEFAULT_GENERATED_DIR.into(),
            source_dir: "src".into(),
            core_import: DEFAULT_CORE_IMPORT.into(),
            import_alias: None,
            emission_policy: EmissionPolicy::Strict,
        }
    }
}

/// The `repository` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySection {
    /// Backend identifier, e.g. `mongodb` or `postgres`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Full compiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// `app.*` keys.
    pub app: AppSection,
    /// `repository.*` keys.
    pub repository: RepositorySection,
}

impl CompilerConfig {
    /// Parses a YAML or JSON document.
    pub fn parse(source: &str) -> AppResult<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Reads a config file, or returns defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(p) => Self::parse(&fs::read_to_string(p)?),
            None => Ok(Self::default()),
        }
    }

    /// Storage identity derived from `repository.type`.
    pub fn storage_backend(&self) -> StorageBackend {
        if self.repository.kind.eq_ignore_ascii_case("mongodb") {
            StorageBackend::Document
        } else {
            StorageBackend::Generic
        }
    }

    /// Absolute generated directory for the given project root.
    pub fn generated_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.app.generated_dir)
    }
}
