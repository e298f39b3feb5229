#![deny(missing_docs)]

//! # Check Command
//!
//! Runs the whole pipeline and prints every diagnostic. Fails in strict mode
//! when an error diagnostic was recorded.

use std::path::Path;

use typegraph_core::{Diagnostics, Severity};

use crate::error::CliResult;
use crate::input::{prepare, InputArgs};

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Document and overrides.
    #[clap(flatten)]
    pub input: InputArgs,
}

/// Executes the check command.
pub fn execute(args: &CheckArgs, config_path: Option<&Path>) -> CliResult<()> {
    let mut session = prepare(config_path, &args.input)?;
    // Finalizing surfaces the diagnostics that only appear per model or operation.
    session.models();
    session.operations();

    print!("{}", report(session.diagnostics()));
    session.ensure_clean()?;
    Ok(())
}

/// One line per diagnostic, then a summary line.
pub fn report(diagnostics: &Diagnostics) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics.iter() {
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    out.push_str(&format!(
        "{} error(s), {} warning(s)\n",
        errors,
        diagnostics.len() - errors
    ));
    out
}
