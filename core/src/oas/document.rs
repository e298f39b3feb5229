#![deny(missing_docs)]

//! # Document Loading
//!
//! Parses an OpenAPI 3.x or Swagger 2.0 document (YAML or JSON) into the
//! schema table and operation descriptors the type graph is built from.
//!
//! Text that cannot be parsed, or a document without a supported version, is
//! the only fatal error. Everything else degrades into diagnostics.

use crate::diagnostics::Diagnostics;
use crate::error::{AppError, AppResult};
use crate::oas::convert::SchemaConverter;
use crate::oas::normalization::normalize_document;
use crate::oas::operations::{collect_operations, OperationDescriptor};
use crate::oas::shims::ShimDocument;
use crate::schema::SchemaTable;

/// A loaded document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Named schemas, in document order.
    pub table: SchemaTable,
    /// Operations, in document order.
    pub operations: Vec<OperationDescriptor>,
    /// The document's `$self`, if declared.
    pub self_uri: Option<String>,
    /// `info.title`, if present.
    pub title: Option<String>,
    /// Problems found while loading.
    pub diagnostics: Diagnostics,
}

/// Parses document text.
///
/// # Errors
///
/// Returns [`AppError::Parse`] when the text is not YAML/JSON, is not a
/// mapping, or declares neither `openapi: 3.x` nor `swagger: 2.0`.
pub fn parse_document(content: &str) -> AppResult<ParsedDocument> {
    let mut value: serde_json::Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::Parse(format!("Failed to parse document: {}", e)))?;
    if !value.is_object() {
        return Err(AppError::Parse("Document root must be a mapping".into()));
    }

    normalize_document(&mut value);

    let shim: ShimDocument = serde_json::from_value(value)
        .map_err(|e| AppError::Parse(format!("Failed to read document structure: {}", e)))?;
    check_version(&shim)?;

    let mut diagnostics = Diagnostics::new();
    let converter = SchemaConverter::new(shim.self_uri.as_deref());

    let schemas = match &shim.components {
        Some(components) if !components.schemas.is_empty() => &components.schemas,
        _ => &shim.definitions,
    };
    let table = converter.table(schemas, &mut diagnostics);
    let operations = collect_operations(&shim, &converter, &mut diagnostics);

    tracing::info!(
        schemas = table.len(),
        operations = operations.len(),
        diagnostics = diagnostics.len(),
        "document loaded"
    );

    Ok(ParsedDocument {
        table,
        operations,
        self_uri: shim.self_uri.clone(),
        title: shim.info.as_ref().map(|i| i.title.clone()).filter(|t| !t.is_empty()),
        diagnostics,
    })
}

fn check_version(shim: &ShimDocument) -> AppResult<()> {
    match (shim.openapi.as_deref(), shim.swagger.as_deref()) {
        (Some(v), _) if v.starts_with("3.") => Ok(()),
        (None, Some(v)) if v == "2.0" || v.starts_with("2.0.") => Ok(()),
        (Some(v), _) => Err(AppError::Parse(format!("Unsupported OpenAPI version '{}'", v))),
        (None, Some(v)) => Err(AppError::Parse(format!("Unsupported Swagger version '{}'", v))),
        (None, None) => Err(AppError::Parse(
            "Document declares neither 'openapi' nor 'swagger'".into(),
        )),
    }
}
