#![deny(missing_docs)]

//! # Document Shims
//!
//! Deserialization layer mapping the parts of an OpenAPI / Swagger document
//! that the type graph needs.
//!
//! Schema positions are kept as raw JSON and converted one schema at a time
//! (see [`crate::oas::convert`]), so a single malformed schema cannot fail the
//! whole document.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use utoipa::openapi::RefOr;

/// The document root.
#[derive(Deserialize, Debug, Default)]
pub struct ShimDocument {
    /// OpenAPI version (e.g. "3.1.0").
    pub openapi: Option<String>,
    /// Swagger version ("2.0").
    pub swagger: Option<String>,
    /// The `$self` keyword (OAS 3.2+).
    #[serde(rename = "$self")]
    pub self_uri: Option<String>,
    /// Info object; only the title is kept.
    pub info: Option<ShimInfo>,
    /// OAS 3.x components.
    #[serde(default)]
    pub components: Option<ShimComponents>,
    /// Swagger 2.0 schema definitions.
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
    /// Swagger 2.0 reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, ShimParameter>,
    /// Swagger 2.0 global `consumes`.
    #[serde(default)]
    pub consumes: Vec<String>,
    /// Path items in document order. `x-` keys are skipped when walking.
    #[serde(default)]
    pub paths: IndexMap<String, Value>,
}

/// Info object.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ShimInfo {
    /// API title.
    #[serde(default)]
    pub title: String,
    /// API version.
    #[serde(default)]
    pub version: String,
}

/// Components object (OAS 3.x).
#[derive(Deserialize, Debug, Default)]
pub struct ShimComponents {
    /// Named schemas in document order.
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<ShimParameter>>,
    /// Reusable request bodies.
    #[serde(rename = "requestBodies", default)]
    pub request_bodies: IndexMap<String, RefOr<ShimRequestBody>>,
}

/// A Path Item.
#[derive(Deserialize, Debug, Default)]
pub struct ShimPathItem {
    /// Parameters shared by every operation on the path.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// GET.
    pub get: Option<ShimOperation>,
    /// PUT.
    pub put: Option<ShimOperation>,
    /// POST.
    pub post: Option<ShimOperation>,
    /// DELETE.
    pub delete: Option<ShimOperation>,
    /// OPTIONS.
    pub options: Option<ShimOperation>,
    /// HEAD.
    pub head: Option<ShimOperation>,
    /// PATCH.
    pub patch: Option<ShimOperation>,
    /// TRACE.
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// `(method, operation)` pairs in canonical method order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &ShimOperation)> {
        [
            ("GET", &self.get),
            ("PUT", &self.put),
            ("POST", &self.post),
            ("DELETE", &self.delete),
            ("OPTIONS", &self.options),
            ("HEAD", &self.head),
            ("PATCH", &self.patch),
            ("TRACE", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

/// A single HTTP operation.
#[derive(Deserialize, Debug, Default)]
pub struct ShimOperation {
    /// Unique identifier for the operation.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body (OAS 3.x).
    #[serde(rename = "requestBody")]
    pub request_body: Option<RefOr<ShimRequestBody>>,
    /// Swagger 2.0 `consumes`.
    #[serde(default)]
    pub consumes: Vec<String>,
}

/// A Parameter object (OAS 3.x, with the Swagger 2.0 inline-type fields).
#[derive(Deserialize, Debug, Clone)]
pub struct ShimParameter {
    /// Parameter name.
    pub name: String,
    /// Location (`path`, `query`, `header`, `cookie`, or 2.0's `body` / `formData`).
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Parameter description.
    pub description: Option<String>,
    /// OAS 3.x schema (or 2.0 body schema).
    pub schema: Option<Value>,
    /// Swagger 2.0 inline type.
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    /// Swagger 2.0 inline format.
    pub format: Option<String>,
    /// Swagger 2.0 inline item schema for arrays.
    pub items: Option<Value>,
}

/// A Request Body object.
#[derive(Deserialize, Debug, Default)]
pub struct ShimRequestBody {
    /// Body description.
    pub description: Option<String>,
    /// Media types in document order.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Whether the body is mandatory.
    #[serde(default)]
    pub required: bool,
}

/// A Media Type object.
#[derive(Deserialize, Debug, Default)]
pub struct ShimMediaType {
    /// Payload schema.
    pub schema: Option<Value>,
}
