#![deny(missing_docs)]

//! # OpenAPI Loading Module
//!
//! - **document**: entry point, text to [`ParsedDocument`].
//! - **normalization**: raw JSON rewrites applied before typed reads.
//! - **shims**: deserialization layer for the document structure.
//! - **convert**: `utoipa` schemas to the schema table.
//! - **operations**: per-operation parameter and request body descriptors.

pub mod convert;
pub mod document;
pub(crate) mod normalization;
pub mod operations;
pub(crate) mod ref_utils;
pub mod shims;

pub use document::{parse_document, ParsedDocument};
pub use operations::{
    BodyFormat, OperationDescriptor, ParamLocation, ParameterDescriptor, RequestBodyDescriptor,
};
