#![deny(missing_docs)]

//! # Operation Descriptors
//!
//! Extracts per-operation request descriptors from `paths`: parameters
//! (path-item level merged with operation level) and the request body.
//!
//! Request bodies pick one media type by priority: JSON, then
//! `application/x-www-form-urlencoded`, then any `multipart/*`, then the first
//! declared. Swagger 2.0 `in: body` and `in: formData` parameters are folded
//! into a request body the same way.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::naming::derive_operation_id;
use crate::oas::convert::SchemaConverter;
use crate::oas::ref_utils::{component_name, normalize_ref};
use crate::oas::shims::{ShimDocument, ShimOperation, ShimParameter, ShimPathItem, ShimRequestBody};
use crate::schema::{ObjectSchema, SchemaNode, SchemaRef};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use utoipa::openapi::RefOr;

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    /// Path template segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }
}

/// Encoding family of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyFormat {
    /// `application/json` and `+json` types.
    Json,
    /// `application/x-www-form-urlencoded`.
    Form,
    /// Any `multipart/*`.
    Multipart,
    /// Anything else (`application/octet-stream`, `text/plain`, ...).
    Other,
}

impl BodyFormat {
    /// Classifies a media type.
    pub fn from_content_type(content_type: &str) -> Self {
        let media = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        if media == "application/json" || media.ends_with("+json") {
            BodyFormat::Json
        } else if media == "application/x-www-form-urlencoded" {
            BodyFormat::Form
        } else if media.starts_with("multipart/") {
            BodyFormat::Multipart
        } else {
            BodyFormat::Other
        }
    }

    fn priority(self) -> usize {
        match self {
            BodyFormat::Json => 0,
            BodyFormat::Form => 1,
            BodyFormat::Multipart => 2,
            BodyFormat::Other => 3,
        }
    }
}

/// One resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Wire name.
    pub name: String,
    /// Location.
    pub location: ParamLocation,
    /// Whether it is mandatory.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Value schema.
    pub schema: SchemaRef,
    /// True when the schema admits `null`.
    pub nullable: bool,
}

/// The selected request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyDescriptor {
    /// Selected media type.
    pub content_type: String,
    /// Encoding family of `content_type`.
    pub format: BodyFormat,
    /// Payload schema.
    pub schema: SchemaRef,
    /// Whether the body is mandatory.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
}

/// One HTTP operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// `operationId`, or one derived from method and path.
    pub operation_id: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Parameters; operation-level entries override path-level ones.
    pub parameters: Vec<ParameterDescriptor>,
    /// Request body, if any.
    pub body: Option<RequestBodyDescriptor>,
}

/// Walks `paths` and builds one descriptor per operation, in document order.
pub(crate) fn collect_operations(
    doc: &ShimDocument,
    converter: &SchemaConverter<'_>,
    diags: &mut Diagnostics,
) -> Vec<OperationDescriptor> {
    let ctx = Context {
        doc,
        converter,
        self_uri: doc.self_uri.as_deref(),
    };
    let mut operations = Vec::new();

    for (path, raw) in &doc.paths {
        if path.starts_with("x-") {
            continue;
        }
        let item: ShimPathItem = match serde_json::from_value(raw.clone()) {
            Ok(item) => item,
            Err(e) => {
                diags.warn(
                    DiagnosticKind::Unsupported,
                    Some(path),
                    format!("path item could not be read ({}); skipped", e),
                );
                continue;
            }
        };
        for (method, op) in item.operations() {
            operations.push(ctx.operation(path, method, &item, op, diags));
        }
    }
    tracing::debug!(operations = operations.len(), "collected operations");
    operations
}

struct Context<'a> {
    doc: &'a ShimDocument,
    converter: &'a SchemaConverter<'a>,
    self_uri: Option<&'a str>,
}

impl Context<'_> {
    fn operation(
        &self,
        path: &str,
        method: &str,
        item: &ShimPathItem,
        op: &ShimOperation,
        diags: &mut Diagnostics,
    ) -> OperationDescriptor {
        let operation_id = op
            .operation_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| derive_operation_id(method, path));
        let subject = operation_id.as_str();

        // Operation-level parameters win on (name, in).
        let mut raw_params: Vec<ShimParameter> = Vec::new();
        let mut seen = HashSet::new();
        let op_params = self.resolve_parameters(&op.parameters, subject, diags);
        let item_params = self.resolve_parameters(&item.parameters, subject, diags);
        for param in op_params.into_iter().chain(item_params) {
            if seen.insert((param.name.clone(), param.location.clone())) {
                raw_params.push(param);
            }
        }

        let mut parameters = Vec::new();
        let mut body_param = None;
        let mut form_params = Vec::new();
        for param in raw_params {
            match param.location.as_str() {
                "body" => body_param = Some(param),
                "formData" => form_params.push(param),
                other => match ParamLocation::parse(other) {
                    Some(location) => {
                        let (schema, nullable) = self.parameter_schema(&param, subject, diags);
                        parameters.push(ParameterDescriptor {
                            name: param.name,
                            location,
                            required: param.required || location == ParamLocation::Path,
                            description: param.description,
                            schema,
                            nullable,
                        });
                    }
                    None => diags.warn(
                        DiagnosticKind::Unsupported,
                        Some(subject),
                        format!("parameter '{}' has unknown location '{}'", param.name, other),
                    ),
                },
            }
        }

        let body = match &op.request_body {
            Some(body) => self.request_body(body, subject, diags),
            None if body_param.is_some() || !form_params.is_empty() => {
                self.legacy_body(op, body_param, &form_params, subject, diags)
            }
            None => None,
        };

        OperationDescriptor {
            operation_id,
            method: method.to_string(),
            path: path.to_string(),
            parameters,
            body,
        }
    }

    fn resolve_parameters(
        &self,
        params: &[RefOr<ShimParameter>],
        subject: &str,
        diags: &mut Diagnostics,
    ) -> Vec<ShimParameter> {
        params
            .iter()
            .filter_map(|p| self.resolve_parameter(p, subject, diags))
            .collect()
    }

    fn resolve_parameter(
        &self,
        param: &RefOr<ShimParameter>,
        subject: &str,
        diags: &mut Diagnostics,
    ) -> Option<ShimParameter> {
        let mut current = param;
        let mut visited = HashSet::new();
        loop {
            let r = match current {
                RefOr::T(p) => return Some(p.clone()),
                RefOr::Ref(r) => normalize_ref(&r.ref_location, self.self_uri),
            };
            if !visited.insert(r.clone()) {
                diags.error(
                    DiagnosticKind::ReferenceLoop,
                    Some(subject),
                    format!("parameter reference '{}' loops", r),
                );
                return None;
            }
            // Swagger 2.0 keeps reusable parameters at the root.
            if let Some(name) = r.strip_prefix("#/parameters/") {
                if let Some(p) = self.doc.parameters.get(name) {
                    return Some(p.clone());
                }
            }
            let found = component_name(&r, "parameters").and_then(|name| {
                self.doc
                    .components
                    .as_ref()
                    .and_then(|c| c.parameters.get(&name))
            });
            match found {
                Some(next) => current = next,
                None => {
                    diags.warn(
                        DiagnosticKind::DanglingReference,
                        Some(subject),
                        format!("parameter reference '{}' does not resolve; dropped", r),
                    );
                    return None;
                }
            }
        }
    }

    fn parameter_schema(
        &self,
        param: &ShimParameter,
        subject: &str,
        diags: &mut Diagnostics,
    ) -> (SchemaRef, bool) {
        match &param.schema {
            Some(schema) => self.converter.value(schema, Some(subject), diags),
            None => self
                .converter
                .value(&legacy_schema(param), Some(subject), diags),
        }
    }

    fn request_body(
        &self,
        body: &RefOr<ShimRequestBody>,
        subject: &str,
        diags: &mut Diagnostics,
    ) -> Option<RequestBodyDescriptor> {
        let body = match body {
            RefOr::T(b) => b,
            RefOr::Ref(r) => {
                let target = normalize_ref(&r.ref_location, self.self_uri);
                let found = component_name(&target, "requestBodies").and_then(|name| {
                    self.doc
                        .components
                        .as_ref()
                        .and_then(|c| c.request_bodies.get(&name))
                });
                match found {
                    Some(RefOr::T(b)) => b,
                    _ => {
                        diags.warn(
                            DiagnosticKind::DanglingReference,
                            Some(subject),
                            format!(
                                "request body reference '{}' does not resolve; dropped",
                                target
                            ),
                        );
                        return None;
                    }
                }
            }
        };

        let (content_type, media) = body
            .content
            .iter()
            .enumerate()
            .min_by_key(|(index, (ct, _))| (BodyFormat::from_content_type(ct).priority(), *index))
            .map(|(_, entry)| entry)?;

        let schema = match &media.schema {
            Some(raw) => self.converter.value(raw, Some(subject), diags).0,
            None => SchemaRef::inline(SchemaNode::Any),
        };

        Some(RequestBodyDescriptor {
            content_type: content_type.clone(),
            format: BodyFormat::from_content_type(content_type),
            schema,
            required: body.required,
            description: body.description.clone(),
        })
    }

    /// Swagger 2.0: a `body` parameter, or `formData` parameters as one object.
    fn legacy_body(
        &self,
        op: &ShimOperation,
        body_param: Option<ShimParameter>,
        form_params: &[ShimParameter],
        subject: &str,
        diags: &mut Diagnostics,
    ) -> Option<RequestBodyDescriptor> {
        let consumes = if op.consumes.is_empty() {
            &self.doc.consumes
        } else {
            &op.consumes
        };

        if let Some(param) = body_param {
            let content_type = consumes
                .iter()
                .min_by_key(|ct| BodyFormat::from_content_type(ct).priority())
                .cloned()
                .unwrap_or_else(|| "application/json".to_string());
            let (schema, _) = self.parameter_schema(&param, subject, diags);
            return Some(RequestBodyDescriptor {
                format: BodyFormat::from_content_type(&content_type),
                content_type,
                schema,
                required: param.required,
                description: param.description,
            });
        }

        let has_file = form_params
            .iter()
            .any(|p| p.param_type.as_deref() == Some("file"));
        let content_type = consumes
            .iter()
            .find(|ct| {
                let format = BodyFormat::from_content_type(ct);
                format == BodyFormat::Multipart || (!has_file && format == BodyFormat::Form)
            })
            .cloned()
            .unwrap_or_else(|| {
                if has_file {
                    "multipart/form-data".to_string()
                } else {
                    "application/x-www-form-urlencoded".to_string()
                }
            });

        let mut object = ObjectSchema::default();
        for param in form_params {
            let (schema, nullable) = self.parameter_schema(param, subject, diags);
            object.properties.insert(param.name.clone(), schema);
            if param.required {
                object.required.insert(param.name.clone());
            }
            if nullable {
                object.nullable.insert(param.name.clone());
            }
        }
        Some(RequestBodyDescriptor {
            format: BodyFormat::from_content_type(&content_type),
            content_type,
            required: !object.required.is_empty(),
            schema: SchemaRef::inline(SchemaNode::Object(object)),
            description: None,
        })
    }
}

/// Builds a schema from Swagger 2.0 inline `type` / `format` / `items`.
fn legacy_schema(param: &ShimParameter) -> Value {
    let mut schema = Map::new();
    match param.param_type.as_deref() {
        Some("file") => {
            return json!({ "type": "string", "format": "binary" });
        }
        Some(ty) => {
            schema.insert("type".into(), Value::String(ty.to_string()));
        }
        None => {}
    }
    if let Some(format) = &param.format {
        schema.insert("format".into(), Value::String(format.clone()));
    }
    if let Some(items) = &param.items {
        schema.insert("items".into(), items.clone());
    }
    Value::Object(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveKind;

    fn collect(yaml: &str) -> (Vec<OperationDescriptor>, Diagnostics) {
        let doc: ShimDocument = serde_yaml::from_str(yaml).unwrap();
        let mut diags = Diagnostics::new();
        let converter = SchemaConverter::new(doc.self_uri.as_deref());
        let ops = collect_operations(&doc, &converter, &mut diags);
        (ops, diags)
    }

    #[test]
    fn test_body_content_type_priority() {
        assert_eq!(
            BodyFormat::from_content_type("application/json; charset=utf-8"),
            BodyFormat::Json
        );
        assert_eq!(BodyFormat::from_content_type("application/problem+json"), BodyFormat::Json);
        assert_eq!(BodyFormat::from_content_type("multipart/mixed"), BodyFormat::Multipart);

        let (ops, _) = collect(
            r#"
openapi: 3.1.0
paths:
  /upload:
    post:
      requestBody:
        required: true
        content:
          text/plain: { schema: { type: string } }
          multipart/form-data:
            schema:
              type: object
              properties:
                file: { type: string, format: binary }
          application/x-www-form-urlencoded:
            schema: { type: object, properties: { note: { type: string } } }
"#,
        );
        let body = ops[0].body.as_ref().unwrap();
        assert_eq!(body.format, BodyFormat::Form);
        assert!(body.required);
        assert_eq!(ops[0].operation_id, "post_upload");
    }

    #[test]
    fn test_parameter_override_and_refs() {
        let (ops, diags) = collect(
            r#"
openapi: 3.0.3
components:
  parameters:
    Limit: { name: limit, in: query, schema: { type: integer } }
paths:
  /items/{id}:
    parameters:
      - { name: id, in: path, schema: { type: string } }
      - { name: limit, in: query, description: shared, schema: { type: string } }
    get:
      operationId: listItems
      parameters:
        - $ref: '#/components/parameters/Limit'
        - $ref: '#/components/parameters/Missing'
"#,
        );

        let op = &ops[0];
        assert_eq!(op.operation_id, "listItems");
        assert_eq!(op.parameters.len(), 2);
        let limit = op.parameters.iter().find(|p| p.name == "limit").unwrap();
        assert_eq!(limit.schema, SchemaRef::primitive(PrimitiveKind::Integer));
        let id = op.parameters.iter().find(|p| p.name == "id").unwrap();
        assert!(id.required);
        assert_eq!(diags.of_kind(DiagnosticKind::DanglingReference).count(), 1);
    }

    #[test]
    fn test_request_body_component_ref() {
        let (ops, _) = collect(
            r#"
openapi: 3.1.0
components:
  requestBodies:
    PetBody:
      content:
        application/json:
          schema: { $ref: '#/components/schemas/Pet' }
paths:
  /pets:
    put:
      requestBody: { $ref: '#/components/requestBodies/PetBody' }
"#,
        );
        let body = ops[0].body.as_ref().unwrap();
        assert_eq!(body.schema, SchemaRef::reference("#/components/schemas/Pet"));
        assert_eq!(body.format, BodyFormat::Json);
    }

    #[test]
    fn test_swagger_form_data_becomes_multipart_body() {
        let (ops, _) = collect(
            r#"
swagger: "2.0"
paths:
  /avatar:
    post:
      parameters:
        - { name: image, in: formData, type: file, required: true }
        - { name: caption, in: formData, type: string }
"#,
        );
        let body = ops[0].body.as_ref().unwrap();
        assert_eq!(body.content_type, "multipart/form-data");
        assert_eq!(body.format, BodyFormat::Multipart);
        let SchemaRef::Inline(node) = &body.schema else {
            panic!("expected inline body");
        };
        let SchemaNode::Object(obj) = node.as_ref() else {
            panic!("expected object body");
        };
        assert!(obj.required.contains("image"));
        assert_eq!(obj.properties.len(), 2);
    }
}
