#![deny(missing_docs)]

//! # Compile Command
//!
//! Loads every contract, then runs the manifest and model passes.

use crate::project::{load_contracts, ProjectArgs};
use contract_core::{AppError, AppResult, CompileReport, Compiler};

/// Arguments for the compile command.
#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// Project to compile.
    #[clap(flatten)]
    pub project: ProjectArgs,
}

/// Which passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passes {
    /// Manifest and models.
    All,
    /// Manifest only.
    ManifestOnly,
}

/// Executes the compile pipeline.
///
/// Fails after all artifacts were attempted when any file or contract failed.
pub fn execute(args: &ProjectArgs, passes: Passes) -> AppResult<CompileReport> {
    let config = args.compiler_config()?;
    let loaded = load_contracts(&args.contracts)?;
    let compiler = Compiler::new(config, args.capabilities());

    let report = match passes {
        Passes::All => compiler.compile(&args.root, &loaded.contracts),
        Passes::ManifestOnly => compiler.compile_manifest(&args.root, &loaded.contracts),
    };

    for path in &report.written {
        println!("written    {}", path.display());
    }
    for path in &report.unchanged {
        println!("unchanged  {}", path.display());
    }
    for failure in &report.failures {
        eprintln!("failed     {}: {}", failure.contract, failure.error);
    }

    let failed = report.failures.len() + loaded.failures.len();
    if failed > 0 {
        return Err(AppError::General(format!("{} artifact(s) failed", failed)));
    }
    Ok(report)
}
