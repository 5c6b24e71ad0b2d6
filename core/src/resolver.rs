#![deny(missing_docs)]

//! # Import Resolution
//!
//! Computes the import specifier one emitted module uses to reach another
//! artifact. Output locations depend on the contract: module contracts live
//! under the project source tree, everything else under the generated dir.

use crate::config::CompilerConfig;
use crate::contract::Contract;
use std::path::{Component, Path, PathBuf};

/// The kind of artifact being imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A generated model module.
    Model,
}

/// Resolves import specifiers between artifacts.
pub trait ImportResolver {
    /// Specifier used inside `from`'s model module to import `kind` of `to`.
    ///
    /// `alias` requests the configured path alias instead of a relative path.
    fn resolve(&self, from: &Contract, to: &Contract, kind: ArtifactKind, alias: bool) -> String;
}

/// Relative directories (from the project root) of every output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Generated artifacts directory.
    pub generated_dir: PathBuf,
    /// Project source directory.
    pub source_dir: PathBuf,
}

impl OutputLayout {
    /// Layout described by the configuration.
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            generated_dir: PathBuf::from(&config.app.generated_dir),
            source_dir: PathBuf::from(&config.app.source_dir),
        }
    }

    /// Directory holding the contract's model module.
    pub fn model_dir(&self, contract: &Contract) -> PathBuf {
        if contract.is_module_contract() {
            self.source_dir.join("models")
        } else {
            self.generated_dir.join("models")
        }
    }

    /// Model module path, relative to the project root.
    pub fn model_path(&self, contract: &Contract) -> PathBuf {
        self.model_dir(contract)
            .join(format!("{}.ts", contract.file_stem()))
    }
}

/// Default resolver: relative specifiers derived from an [`OutputLayout`].
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    layout: OutputLayout,
    alias: Option<String>,
}

impl LayoutResolver {
    /// Resolver for the configured layout and alias.
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            layout: OutputLayout::from_config(config),
            alias: config.app.import_alias.clone(),
        }
    }
}

impl ImportResolver for LayoutResolver {
    fn resolve(&self, from: &Contract, to: &Contract, kind: ArtifactKind, alias: bool) -> String {
        let from_dir = self.layout.model_dir(from);
        let (to_dir, file) = match kind {
            ArtifactKind::Model => (self.layout.model_dir(to), to.file_stem()),
        };

        if alias {
            if let Some(prefix) = &self.alias {
                let rel = to_dir
                    .strip_prefix(&self.layout.generated_dir)
                    .or_else(|_| to_dir.strip_prefix(&self.layout.source_dir))
                    .unwrap_or(to_dir.as_path());
                return join_specifier(prefix, rel, &file);
            }
        }

        let rel = relative_dir(&from_dir, &to_dir);
        if rel.is_empty() {
            format!("./{}", file)
        } else {
            format!("{}/{}", rel, file)
        }
    }
}

/// `..`-style path from `from` to `to`, both relative to the same root.
fn relative_dir(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().filter(is_named).collect();
    let to: Vec<Component> = to.components().filter(is_named).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat("..".to_string()).take(from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

fn is_named(c: &Component) -> bool {
    !matches!(c, Component::CurDir)
}

fn join_specifier(prefix: &str, rel: &Path, file: &str) -> String {
    let mut spec = prefix.trim_end_matches('/').to_string();
    for c in rel.components().filter(is_named) {
        spec.push('/');
        spec.push_str(&c.as_os_str().to_string_lossy());
    }
    spec.push('/');
    spec.push_str(file);
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractBuilder;

    fn contract(name: &str, module: bool) -> Contract {
        let b = ContractBuilder::new(name, name);
        let b = if module { b.module_contract() } else { b };
        b.build().unwrap()
    }

    #[test]
    fn test_same_directory() {
        let resolver = LayoutResolver::from_config(&CompilerConfig::default());
        let spec = resolver.resolve(
            &contract("User", false),
            &contract("Group", false),
            ArtifactKind::Model,
            false,
        );
        assert_eq!(spec, "./group.model");
    }

    #[test]
    fn test_cross_directory() {
        let resolver = LayoutResolver::from_config(&CompilerConfig::default());
        let spec = resolver.resolve(
            &contract("User", true),
            &contract("Group", false),
            ArtifactKind::Model,
            false,
        );
        assert_eq!(spec, "../../.generated/models/group.model");
    }

    #[test]
    fn test_alias() {
        let mut config = CompilerConfig::default();
        config.app.import_alias = Some("@models".into());
        let resolver = LayoutResolver::from_config(&config);
        let spec = resolver.resolve(
            &contract("User", true),
            &contract("Group", false),
            ArtifactKind::Model,
            true,
        );
        assert_eq!(spec, "@models/models/group.model");
    }

    #[test]
    fn test_alias_requested_without_prefix_falls_back() {
        let resolver = LayoutResolver::from_config(&CompilerConfig::default());
        let spec = resolver.resolve(
            &contract("User", false),
            &contract("Group", false),
            ArtifactKind::Model,
            true,
        );
        assert_eq!(spec, "./group.model");
    }

    #[test]
    fn test_model_path() {
        let layout = OutputLayout::from_config(&CompilerConfig::default());
        assert_eq!(
            layout.model_path(&contract("User", false)),
            PathBuf::from(".generated/models/user.model.ts")
        );
        assert_eq!(
            layout.model_path(&contract("User", true)),
            PathBuf::from("src/models/user.model.ts")
        );
    }
}
