#![deny(missing_docs)]

//! # Schema Manifest
//!
//! One consolidated document describing every compiled contract and the
//! optional modules present at build time. Written as `schema.json` and
//! `schema.yml` under the generated directory.

use crate::capabilities::CapabilitySet;
use crate::config::CompilerConfig;
use crate::contract::Contract;
use crate::error::AppResult;
use crate::writer::{write_artifact, WriteOutcome};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the JSON manifest.
pub const MANIFEST_JSON: &str = "schema.json";
/// File name of the YAML manifest.
pub const MANIFEST_YAML: &str = "schema.yml";

/// Module presence flags recorded in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModules {
    /// Authentication module.
    pub auth: bool,
    /// Relationship graph module.
    pub graphql: bool,
    /// Messaging transport together with the binary protocol.
    pub rpc: bool,
    /// API documentation module.
    pub openapi: bool,
    /// Caching module.
    pub cache: bool,
    /// Storage repository module.
    pub repository: bool,
    /// Secret vault module.
    pub vault: bool,
}

impl From<CapabilitySet> for ManifestModules {
    fn from(caps: CapabilitySet) -> Self {
        Self {
            auth: caps.auth,
            graphql: caps.graphql,
            rpc: caps.rpc(),
            openapi: caps.openapi,
            cache: caps.cache,
            repository: caps.repository,
            vault: caps.vault,
        }
    }
}

/// The consolidated manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Full IR keyed by `contractName`, in registration order.
    pub contracts: IndexMap<String, Contract>,
    /// Present optional modules.
    pub modules: ManifestModules,
}

impl Manifest {
    /// Builds the manifest of a contract set.
    pub fn build(contracts: &[Contract], capabilities: CapabilitySet) -> Self {
        let mut map = IndexMap::new();
        for contract in contracts {
            if map
                .insert(contract.contract_name.clone(), contract.clone())
                .is_some()
            {
                warn!(contract = %contract.contract_name, "duplicate contract name, keeping the last one");
            }
        }
        Self {
            contracts: map,
            modules: capabilities.into(),
        }
    }

    /// Indented JSON rendering.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// YAML rendering.
    ///
    /// Mappings nest by two spaces. Sequence items sit at the column of
    /// their parent key (`fields:\n- propertyKey: ...`), which is the block
    /// style of the YAML emitter and parses back to the same manifest.
    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes both renderings under the configured generated directory.
    ///
    /// Returns nothing, and touches nothing, when schema generation is off.
    pub fn write(&self, config: &CompilerConfig, root: &Path) -> AppResult<Vec<(PathBuf, WriteOutcome)>> {
        if !config.app.generate_schema {
            info!("schema generation disabled, skipping manifest");
            return Ok(Vec::new());
        }

        let dir = config.generated_dir(root);
        let json_path = dir.join(MANIFEST_JSON);
        let yaml_path = dir.join(MANIFEST_YAML);

        // Render both before touching the disk.
        let json = self.to_json()?;
        let yaml = self.to_yaml()?;

        let json_outcome = write_artifact(&json_path, &json)?;
        let yaml_outcome = write_artifact(&yaml_path, &yaml)?;
        Ok(vec![(json_path, json_outcome), (yaml_path, yaml_outcome)])
    }
}
