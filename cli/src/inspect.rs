#![deny(missing_docs)]

//! # Inspect Command
//!
//! Emits the annotated type graph (or a single model) as JSON or YAML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CliError, CliResult};
use crate::input::{prepare, InputArgs};

/// Output encoding.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Document and overrides.
    #[clap(flatten)]
    pub input: InputArgs,

    /// Output encoding.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Emit only this model (by schema name).
    #[clap(long)]
    pub model: Option<String>,

    /// Write to this file instead of stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

/// Executes the inspect command.
pub fn execute(args: &InspectArgs, config_path: Option<&Path>) -> CliResult<()> {
    let mut session = prepare(config_path, &args.input)?;

    let rendered = match &args.model {
        Some(name) => {
            let model = session
                .model(name)
                .ok_or_else(|| CliError::General(format!("No schema named '{}'", name)))?;
            render(&model, args.format)?
        }
        None => render(&session.graph(), args.format)?,
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), "type graph written");
        }
        None => println!("{}", rendered),
    }

    session.ensure_clean()?;
    Ok(())
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::Render(e.to_string()))
        }
    }
}
