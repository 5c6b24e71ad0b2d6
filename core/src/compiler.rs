#![deny(missing_docs)]

//! # Compiler
//!
//! Runs the two independent passes over a registered contract list:
//!
//! 1. **Manifest**: one `schema.json` / `schema.yml` pair for the whole set.
//! 2. **Models**: one model module per contract.
//!
//! Every failure is confined to its own artifact. A contract that fails
//! validation or emission is reported and skipped, the remaining contracts
//! still compile, and a failed manifest does not stop the model pass.

use crate::capabilities::CapabilitySet;
use crate::config::CompilerConfig;
use crate::contract::Contract;
use crate::emitter::{EmitContext, ModelEmitter};
use crate::error::{AppError, AppResult};
use crate::manifest::Manifest;
use crate::resolver::{ImportResolver, LayoutResolver, OutputLayout};
use crate::validation::validate_contract;
use crate::writer::{write_artifact, WriteOutcome};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Name recorded for manifest-level failures.
pub const MANIFEST_ARTIFACT: &str = "<manifest>";

/// A contract (or the manifest) that could not be produced.
#[derive(Debug)]
pub struct CompileFailure {
    /// `contractName` of the failed contract, or [`MANIFEST_ARTIFACT`].
    pub contract: String,
    /// Why it failed.
    pub error: AppError,
}

/// Outcome of a compilation run.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Artifacts created or replaced.
    pub written: Vec<PathBuf>,
    /// Artifacts whose content was already current.
    pub unchanged: Vec<PathBuf>,
    /// Artifacts that failed.
    pub failures: Vec<CompileFailure>,
}

impl CompileReport {
    /// True when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written.push(path),
            WriteOutcome::Unchanged => self.unchanged.push(path),
        }
    }

    fn fail(&mut self, contract: impl Into<String>, error: AppError) {
        self.failures.push(CompileFailure {
            contract: contract.into(),
            error,
        });
    }

    /// Appends another report.
    pub fn merge(&mut self, other: CompileReport) {
        self.written.extend(other.written);
        self.unchanged.extend(other.unchanged);
        self.failures.extend(other.failures);
    }
}

/// Compiles contract sets with one configuration and capability set.
pub struct Compiler {
    config: CompilerConfig,
    ctx: EmitContext,
    layout: OutputLayout,
    resolver: Box<dyn ImportResolver>,
}

impl Compiler {
    /// Compiler using the default layout-based import resolver.
    pub fn new(config: CompilerConfig, capabilities: CapabilitySet) -> Self {
        let ctx = EmitContext::new(&config, capabilities);
        let layout = OutputLayout::from_config(&config);
        let resolver = Box::new(LayoutResolver::from_config(&config));
        Self {
            config,
            ctx,
            layout,
            resolver,
        }
    }

    /// Replaces the import resolver.
    pub fn with_resolver(mut self, resolver: Box<dyn ImportResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Emits the model module of `contract` without writing it.
    pub fn emit_model(&self, contract: &Contract, contracts: &[Contract]) -> AppResult<String> {
        ModelEmitter::new(contracts, &self.ctx, self.resolver.as_ref()).emit(contract)
    }

    /// Path of the model module of `contract` under `root`.
    pub fn model_path(&self, root: &Path, contract: &Contract) -> PathBuf {
        root.join(self.layout.model_path(contract))
    }

    /// Runs the manifest pass and then the model pass.
    pub fn compile(&self, root: &Path, contracts: &[Contract]) -> CompileReport {
        let mut report = self.compile_manifest(root, contracts);
        report.merge(self.compile_models(root, contracts));
        info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            failed = report.failures.len(),
            "compilation finished"
        );
        report
    }

    /// Writes the manifest of the whole set.
    ///
    /// Any invalid contract abandons the manifest.
    pub fn compile_manifest(&self, root: &Path, contracts: &[Contract]) -> CompileReport {
        let mut report = CompileReport::default();
        for contract in contracts {
            if let Err(err) = validate_contract(contract) {
                log_failure(contract, &err);
                report.fail(MANIFEST_ARTIFACT, err);
                return report;
            }
        }

        let manifest = Manifest::build(contracts, self.ctx.capabilities);
        match manifest.write(&self.config, root) {
            Ok(outcomes) => {
                for (path, outcome) in outcomes {
                    report.record(path, outcome);
                }
            }
            Err(err) => {
                error!(error = %err, "manifest generation failed");
                report.fail(MANIFEST_ARTIFACT, err);
            }
        }
        report
    }

    /// Writes one model module per contract.
    pub fn compile_models(&self, root: &Path, contracts: &[Contract]) -> CompileReport {
        let mut report = CompileReport::default();
        for contract in contracts {
            let path = self.model_path(root, contract);
            let result = self
                .emit_model(contract, contracts)
                .and_then(|code| write_artifact(&path, &code));
            match result {
                Ok(outcome) => report.record(path, outcome),
                Err(err) => {
                    log_failure(contract, &err);
                    report.fail(contract.contract_name.clone(), err);
                }
            }
        }
        report
    }
}

fn log_failure(contract: &Contract, err: &AppError) {
    error!(
        contract = %contract.contract_name,
        controller = %contract.controller_name,
        "{}",
        err
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractBuilder, ContractLink, FieldBuilder};
    use crate::resolver::ArtifactKind;
    use std::fs;
    use tempfile::tempdir;

    fn user() -> Contract {
        ContractBuilder::new("User", "User")
            .field(FieldBuilder::new("email", "string").nullable(false).unique())
            .build()
            .unwrap()
    }

    fn broken() -> Contract {
        let mut c = user();
        c.contract_name = "Broken".into();
        c.controller_name = String::new();
        c
    }

    #[test]
    fn test_compile_writes_all_artifacts() {
        let dir = tempdir().unwrap();
        let compiler = Compiler::new(CompilerConfig::default(), CapabilitySet::none());
        let report = compiler.compile(dir.path(), &[user()]);

        assert!(report.is_success());
        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join(".generated/models/user.model.ts").exists());
        assert!(dir.path().join(".generated/schema.json").exists());

        let again = compiler.compile(dir.path(), &[user()]);
        assert!(again.written.is_empty());
        assert_eq!(again.unchanged.len(), 3);
    }

    #[test]
    fn test_failed_contract_is_isolated() {
        let dir = tempdir().unwrap();
        let compiler = Compiler::new(CompilerConfig::default(), CapabilitySet::none());
        let report = compiler.compile(dir.path(), &[broken(), user()]);

        // manifest abandoned, User still emitted, Broken reported
        assert!(!dir.path().join(".generated/schema.json").exists());
        assert!(dir.path().join(".generated/models/user.model.ts").exists());
        let failed: Vec<&str> = report.failures.iter().map(|f| f.contract.as_str()).collect();
        assert_eq!(failed, vec![MANIFEST_ARTIFACT, "Broken"]);
        assert!(report.failures.iter().all(|f| f.error.is_schema()));
    }

    #[test]
    fn test_module_contract_lands_in_source_dir() {
        let dir = tempdir().unwrap();
        let group = ContractBuilder::new("Group", "Group")
            .field(FieldBuilder::new("name", "string"))
            .module_contract()
            .build()
            .unwrap();
        let member = ContractBuilder::new("Member", "Member")
            .field(
                FieldBuilder::new("group", "string")
                    .nullable(true)
                    .link(ContractLink::new("Group")),
            )
            .build()
            .unwrap();
        let compiler = Compiler::new(CompilerConfig::default(), CapabilitySet::none());
        let report = compiler.compile(dir.path(), &[group, member]);
        assert!(report.is_success());
        assert!(dir.path().join("src/models/group.model.ts").exists());

        let code = fs::read_to_string(dir.path().join(".generated/models/member.model.ts")).unwrap();
        assert!(code.contains("from \"../../src/models/group.model\";"));
    }

    struct FixedResolver;

    impl ImportResolver for FixedResolver {
        fn resolve(&self, _: &Contract, to: &Contract, _: ArtifactKind, _: bool) -> String {
            format!("@app/{}", to.file_stem())
        }
    }

    #[test]
    fn test_custom_resolver() {
        let group = ContractBuilder::new("Group", "Group")
            .field(FieldBuilder::new("name", "string"))
            .build()
            .unwrap();
        let member = ContractBuilder::new("Member", "Member")
            .field(FieldBuilder::new("group", "string").link(ContractLink::new("Group")))
            .build()
            .unwrap();
        let compiler = Compiler::new(CompilerConfig::default(), CapabilitySet::none())
            .with_resolver(Box::new(FixedResolver));
        let all = vec![group, member];
        let code = compiler.emit_model(&all[1], &all).unwrap();
        assert!(code.contains("import { Group, GroupFastSchemaStructure } from \"@app/group.model\";"));
    }
}
