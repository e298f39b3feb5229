#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use typegraph_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Loading, configuration or strict-mode failure from the core library.
    #[display("{}", _0)]
    Core(AppError),

    /// The type graph could not be rendered in the requested format.
    #[from(ignore)]
    #[display("Render failed: {}", _0)]
    Render(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `Render` and `General` carry plain strings, which have no `source()`.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
