#![deny(missing_docs)]

//! # Input Handling
//!
//! Arguments shared by every command: the document to load and the
//! configuration overrides applied on top of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use typegraph_core::{GeneratorConfig, PreparedSession, Session};

use crate::error::{CliError, CliResult};

/// The document and config overrides.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// OpenAPI 3.x or Swagger 2.0 document (YAML or JSON).
    pub input: PathBuf,

    /// Package name; overrides `packageName` from the config file.
    #[clap(long)]
    pub package_name: Option<String>,

    /// Treat error diagnostics as failure; overrides `strict` from the config file.
    #[clap(long)]
    pub strict: bool,
}

/// Reads the config file (if any) and applies the command line overrides.
pub fn load_config(config_path: Option<&Path>, args: &InputArgs) -> CliResult<GeneratorConfig> {
    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            GeneratorConfig::from_path(path)?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(name) = &args.package_name {
        config.package_name = Some(name.clone());
    }
    if args.strict {
        config.strict = true;
    }
    Ok(config)
}

/// Loads the document and runs the whole-table passes.
pub fn prepare(config_path: Option<&Path>, args: &InputArgs) -> CliResult<PreparedSession> {
    if !args.input.exists() {
        return Err(CliError::General(format!(
            "Document not found: {:?}",
            args.input
        )));
    }
    let config = load_config(config_path, args)?;
    let content = fs::read_to_string(&args.input)?;
    let session = Session::load(&content, config)?;
    Ok(session.prepare())
}
