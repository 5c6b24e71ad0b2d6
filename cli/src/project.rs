#![deny(missing_docs)]

//! # Project Loading
//!
//! Shared arguments of every command, plus discovery and parsing of contract
//! files. Files are visited in path order so registration order is stable.

use contract_core::{parse_contracts, AppError, AppResult, CapabilitySet, CompilerConfig, Contract};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as contract documents.
pub const CONTRACT_EXTENSIONS: [&str; 3] = ["json", "yml", "yaml"];

/// Arguments describing the project being compiled.
#[derive(clap::Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Directory holding contract documents (.json, .yml, .yaml).
    #[clap(long)]
    pub contracts: PathBuf,

    /// Project root; output directories are relative to it.
    #[clap(long, env = "CONTRACTC_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Compiler configuration file (YAML or JSON).
    #[clap(long, env = "CONTRACTC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Optional module present at runtime, e.g. `openapi` or `graphql`.
    #[clap(long = "module", value_name = "NAME")]
    pub modules: Vec<String>,
}

impl ProjectArgs {
    /// Loads the configuration, defaulting when no file was given.
    pub fn compiler_config(&self) -> AppResult<CompilerConfig> {
        CompilerConfig::load(self.config.as_deref())
    }

    /// Capabilities named on the command line.
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_names(&self.modules)
    }
}

/// Contracts found in a directory, with the files that failed to load.
#[derive(Debug, Default)]
pub struct LoadedContracts {
    /// Valid contracts, in registration order.
    pub contracts: Vec<Contract>,
    /// Documents or entries that could not be loaded, by file.
    pub failures: Vec<(PathBuf, AppError)>,
}

/// Lists contract documents under `dir`, sorted by path.
pub fn contract_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| AppError::General(e.to_string()))?;
        let path = entry.path();
        let is_contract = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| CONTRACT_EXTENSIONS.contains(&e));
        if entry.file_type().is_file() && is_contract {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Loads every contract under `dir`; a bad file never stops the others.
pub fn load_contracts(dir: &Path) -> AppResult<LoadedContracts> {
    let mut loaded = LoadedContracts::default();
    for path in contract_files(dir)? {
        let entries = match fs::read_to_string(&path)
            .map_err(AppError::from)
            .and_then(|source| parse_contracts(&source))
        {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(path = %path.display(), "{}", err);
                loaded.failures.push((path, err));
                continue;
            }
        };
        tracing::debug!(path = %path.display(), count = entries.len(), "contracts loaded");
        for entry in entries {
            match entry {
                Ok(contract) => loaded.contracts.push(contract),
                Err(err) => {
                    tracing::error!(path = %path.display(), "{}", err);
                    loaded.failures.push((path.clone(), err));
                }
            }
        }
    }
    Ok(loaded)
}
