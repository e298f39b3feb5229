#![deny(missing_docs)]

//! # Typegraph CLI
//!
//! Command Line Interface for the type graph normalizer.
//!
//! Supported Commands:
//! - `inspect`: Emits the annotated type graph as JSON or YAML.
//! - `check`: Prints diagnostics; fails in strict mode on error diagnostics.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliResult;

mod check;
mod error;
mod input;
mod inspect;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI type graph normalizer")]
struct Cli {
    /// Generator config file (YAML or JSON).
    #[clap(long, global = true, env = "TYPEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Emit the annotated type graph.
    Inspect(inspect::InspectArgs),
    /// Report diagnostics for a document.
    Check(check::CheckArgs),
}

fn main() -> CliResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Inspect(args) => inspect::execute(args, config)?,
        Commands::Check(args) => check::execute(args, config)?,
    }

    Ok(())
}
