#![deny(missing_docs)]

//! # Model & Operation Metadata
//!
//! - **models**: the typed records consumed by the template stage.
//! - **builder**: per-model and per-operation finalization.

pub mod builder;
pub mod models;

pub use builder::MetadataBuilder;
pub use models::{
    EnumVariable, ModelMetadata, OperationMetadata, ParameterMetadata, PropertyMetadata,
    RequestBodyMetadata,
};
