//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only failures that stop a whole generation session live here. Anything that
//! can degrade locally (dangling refs, conflicting `allOf` members, dropped
//! alternatives) is reported as a [`Diagnostic`](crate::diagnostics::Diagnostic)
//! instead.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The input document could not be parsed or is not a supported OpenAPI version.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The generator configuration is invalid.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
