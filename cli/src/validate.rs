#![deny(missing_docs)]

//! # Validate Command
//!
//! Loads and validates every contract document without emitting anything.

use crate::project::load_contracts;
use contract_core::{resolve_links, AppError, AppResult};
use std::path::PathBuf;

/// Arguments for the validate command.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Directory holding contract documents.
    #[clap(long)]
    pub contracts: PathBuf,
}

/// Reports every invalid document, failing when there is at least one.
pub fn execute(args: &ValidateArgs) -> AppResult<usize> {
    let loaded = load_contracts(&args.contracts)?;
    let mut failed = 0;

    for (path, err) in &loaded.failures {
        eprintln!("invalid  {}: {}", path.display(), err);
        failed += 1;
    }
    // structural checks ran while loading
    for contract in &loaded.contracts {
        if let Err(err) = resolve_links(contract, &loaded.contracts) {
            eprintln!("invalid  {}: {}", contract.contract_name, err);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(AppError::General(format!("{} contract(s) invalid", failed)));
    }
    println!("{} contract(s) valid", loaded.contracts.len());
    Ok(loaded.contracts.len())
}
