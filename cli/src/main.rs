#![deny(missing_docs)]

//! # Contract Compiler CLI
//!
//! Command Line Interface for the contract compiler.
//!
//! Supported Commands:
//! - `compile`: Contracts -> schema manifest + one model module per contract.
//! - `manifest`: Contracts -> `schema.json` / `schema.yml` only.
//! - `validate`: Structural checks and link targets, no output.

use clap::{Parser, Subcommand};
use contract_core::AppResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod compile;
mod project;
mod validate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Contract compiler CLI")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Emit the schema manifest and every model module.
    Compile(compile::CompileArgs),
    /// Emit only the schema manifest.
    Manifest(compile::CompileArgs),
    /// Validate contract documents without emitting anything.
    Validate(validate::ValidateArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "contractc=debug,contract_core=debug"
    } else {
        "contractc=info,contract_core=info"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Compile(args) => {
            compile::execute(&args.project, compile::Passes::All)?;
        }
        Commands::Manifest(args) => {
            compile::execute(&args.project, compile::Passes::ManifestOnly)?;
        }
        Commands::Validate(args) => {
            validate::execute(args)?;
        }
    }

    Ok(())
}
