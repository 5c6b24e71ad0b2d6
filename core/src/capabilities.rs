#![deny(missing_docs)]

//! # Capabilities
//!
//! Presence flags of the optional collaborating modules. Emission reads them
//! from an explicit `CapabilitySet` value; nothing is queried ambiently.

use serde::Serialize;

/// Answers whether an optional module is installed.
pub trait ModuleProbe {
    /// True when the named module is present.
    fn has_module(&self, name: &str) -> bool;
}

impl<F: Fn(&str) -> bool> ModuleProbe for F {
    fn has_module(&self, name: &str) -> bool {
        self(name)
    }
}

/// Which optional modules are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    /// Authentication module.
    pub auth: bool,
    /// API documentation module.
    pub openapi: bool,
    /// Relationship graph module.
    pub graphql: bool,
    /// Messaging transport module.
    pub transport: bool,
    /// Binary protocol module.
    pub protobuf: bool,
    /// Caching module.
    pub cache: bool,
    /// Storage repository module.
    pub repository: bool,
    /// Secret vault module.
    pub vault: bool,
}

impl CapabilitySet {
    /// No optional modules.
    pub fn none() -> Self {
        Self::default()
    }

    /// Queries every known module through `probe`.
    pub fn probe(probe: &dyn ModuleProbe) -> Self {
        Self {
            auth: probe.has_module("auth"),
            openapi: probe.has_module("openapi"),
            graphql: probe.has_module("graphql"),
            transport: probe.has_module("ws"),
            protobuf: probe.has_module("protobuf"),
            cache: probe.has_module("cache"),
            repository: probe.has_module("repository"),
            vault: probe.has_module("vault"),
        }
    }

    /// Builds the set from module names; unknown names are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .collect();
        Self::probe(&|name: &str| names.iter().any(|n| n == name))
    }

    /// RPC needs both the transport and the binary protocol.
    pub fn rpc(&self) -> bool {
        self.transport && self.protobuf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_requires_both() {
        let only_ws = CapabilitySet::from_names(["ws"]);
        assert!(!only_ws.rpc());
        let only_proto = CapabilitySet::from_names(["protobuf"]);
        assert!(!only_proto.rpc());
        let both = CapabilitySet::from_names(["ws", "protobuf"]);
        assert!(both.rpc());
    }

    #[test]
    fn test_probe_closure() {
        let caps = CapabilitySet::probe(&|name: &str| name == "openapi" || name == "vault");
        assert!(caps.openapi);
        assert!(caps.vault);
        assert!(!caps.graphql);
    }

    #[test]
    fn test_from_names_ignores_unknown_and_case() {
        let caps = CapabilitySet::from_names(["OpenAPI", "nope"]);
        assert_eq!(
            caps,
            CapabilitySet {
                openapi: true,
                ..CapabilitySet::none()
            }
        );
    }
}
