#![deny(missing_docs)]

//! # Typegraph Core
//!
//! Normalizes the component schemas of an OpenAPI document into an annotated
//! type graph for code generators: `allOf` flattening, reference cycle
//! marking, sealed `oneOf` / `anyOf` hierarchies, and payload-sensitive type
//! resolution.

/// Shared error types.
pub mod error;

/// Recoverable problems found while building the graph.
pub mod diagnostics;

/// Generator configuration.
pub mod config;

/// Identifier sanitizing and collision resolution.
pub mod naming;

/// The schema table and its node types.
pub mod schema;

/// Whole-table passes over the schema graph.
pub mod graph;

/// Payload-sensitive type resolution.
pub mod type_mapping;

/// Typed per-model and per-operation records.
pub mod metadata;

/// Session driver.
pub mod session;

/// OpenAPI (OAS) loading.
pub mod oas;

pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{AppError, AppResult};
pub use graph::{
    CompositionAlternative, CompositionMetadata, CycleReport, Discovery, SealedRegistry,
    UNKNOWN_SCHEMA,
};
pub use metadata::{
    EnumVariable, ModelMetadata, OperationMetadata, ParameterMetadata, PropertyMetadata,
    RequestBodyMetadata,
};
pub use naming::{enum_identifier, resolve_collisions, sanitize_package_name, ModelNamer};
pub use oas::{parse_document, ParsedDocument};
pub use schema::{SchemaNode, SchemaRef, SchemaTable};
pub use session::{PreparedSession, Session, TypeGraph};
pub use type_mapping::{ImportHint, PayloadContext, SchemaTypeMapper, TypeMapper, TypeRef};
