#![deny(missing_docs)]

//! # Metadata Records
//!
//! Typed records handed to the template stage, one per model, property,
//! operation and parameter. They serialize with camelCase keys.

use crate::graph::sealed::CompositionMetadata;
use crate::oas::operations::{BodyFormat, ParamLocation};
use crate::type_mapping::{ImportHint, TypeRef};
use serde::Serialize;

/// One literal of an enum model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumVariable {
    /// Generated identifier, unique within the enum.
    pub identifier: String,
    /// Textual form of the literal (`"active"`, `"42"`, `"true"`).
    pub literal_value: String,
    /// True when the enum is string-kinded.
    pub is_string_kind: bool,
}

/// One property of an object model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    /// Wire name.
    pub name: String,
    /// Generated identifier, unique within the model.
    pub identifier: String,
    /// Resolved type.
    pub type_ref: TypeRef,
    /// Listed in `required`.
    pub required: bool,
    /// Declared nullable, or marked by cycle detection.
    pub nullable: bool,
    /// Description of an inline property schema.
    pub description: Option<String>,
    /// Imports needed by `type_ref`.
    pub imports: Vec<ImportHint>,
}

/// Everything the template stage needs for one named schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    /// Name in the schema table.
    pub schema_name: String,
    /// Generated class name.
    pub class_name: String,
    /// Generated file name (without extension).
    pub file_name: String,
    /// `title`.
    pub title: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// Carries enum literals and no properties.
    pub is_enum: bool,
    /// Enum literals, in declaration order.
    pub enum_variables: Vec<EnumVariable>,
    /// A `oneOf` / `anyOf` sum type.
    pub is_composition: bool,
    /// Alternatives and discriminator of a sum type.
    pub composition: Option<CompositionMetadata>,
    /// Class name of the sum type this model is an alternative of.
    pub parent_type_name: Option<String>,
    /// Object properties, in declaration order.
    pub properties: Vec<PropertyMetadata>,
    /// Aliased type of a named array, map, scalar or alias schema.
    pub value_type: Option<TypeRef>,
    /// Other models and special types this model refers to.
    pub imports: Vec<ImportHint>,
}

/// A parameter, or one field of a form / multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    /// Wire name.
    pub name: String,
    /// Generated identifier, unique within the operation or body.
    pub identifier: String,
    /// Where the parameter is carried; `None` for body fields.
    pub location: Option<ParamLocation>,
    /// Resolved type, including the multipart override for body fields.
    pub type_ref: TypeRef,
    /// Mandatory.
    pub required: bool,
    /// Admits `null`.
    pub nullable: bool,
    /// Description.
    pub description: Option<String>,
    /// Imports needed by `type_ref`.
    pub imports: Vec<ImportHint>,
}

/// The request body of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyMetadata {
    /// Selected media type.
    pub content_type: String,
    /// Encoding family.
    pub format: BodyFormat,
    /// Type of the whole payload.
    pub type_ref: TypeRef,
    /// Mandatory.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Top-level properties of a form or multipart body.
    pub fields: Vec<ParameterMetadata>,
}

/// One HTTP operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    /// `operationId`.
    pub operation_id: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Parameters.
    pub parameters: Vec<ParameterMetadata>,
    /// Request body.
    pub body: Option<RequestBodyMetadata>,
    /// Union of parameter and body imports.
    pub imports: Vec<ImportHint>,
}
