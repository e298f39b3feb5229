#![deny(missing_docs)]

//! # Schema Conversion
//!
//! Deserializes raw schema JSON with `utoipa` and converts it into the
//! [`SchemaTable`] model.
//!
//! Nullability is lifted out of the schema and onto the owning object:
//! `type: [T, null]` and `anyOf: [X, {type: null}]` both yield `X` plus a
//! nullable flag.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::oas::normalization::{normalize_schema_shape, ANY_OF_TITLE};
use crate::oas::ref_utils::normalize_ref;
use crate::schema::{
    CompositionKind, CompositionSchema, Discriminator, DiscriminatorMapping, Docs, ObjectSchema,
    PrimitiveKind, PrimitiveSchema, SchemaNode, SchemaRef, SchemaTable,
};
use indexmap::IndexMap;
use serde_json::Value;
use utoipa::openapi::schema::{
    AdditionalProperties, ArrayItems, Discriminator as OasDiscriminator, Object, Schema,
    SchemaFormat, SchemaType, Type,
};
use utoipa::openapi::RefOr;

/// Converts schemas of one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter<'a> {
    self_uri: Option<&'a str>,
}

impl<'a> SchemaConverter<'a> {
    /// Creates a converter; `self_uri` is the document's `$self`, if any.
    pub fn new(self_uri: Option<&'a str>) -> Self {
        Self { self_uri }
    }

    /// Builds the table from named schema JSON, in document order.
    ///
    /// A schema that fails to deserialize becomes `Any` with a diagnostic.
    pub fn table(&self, schemas: &IndexMap<String, Value>, diags: &mut Diagnostics) -> SchemaTable {
        let mut table = SchemaTable::new();
        for (name, raw) in schemas {
            let node = match self.value(raw, Some(name), diags).0 {
                SchemaRef::Ref(target) => SchemaNode::Reference(target),
                SchemaRef::Inline(node) => *node,
            };
            table.insert(name.clone(), node);
        }
        tracing::debug!(schemas = table.len(), "converted component schemas");
        table
    }

    /// Converts one schema value. Returns the schema and whether it admits `null`.
    pub fn value(
        &self,
        raw: &Value,
        subject: Option<&str>,
        diags: &mut Diagnostics,
    ) -> (SchemaRef, bool) {
        let mut shaped = raw.clone();
        normalize_schema_shape(&mut shaped);
        match serde_json::from_value::<RefOr<Schema>>(shaped) {
            Ok(schema) => self.ref_or(&schema),
            Err(e) => {
                diags.warn(
                    DiagnosticKind::Unsupported,
                    subject,
                    format!("schema could not be read ({}); treated as any", e),
                );
                (SchemaRef::inline(SchemaNode::Any), false)
            }
        }
    }

    fn ref_or(&self, schema: &RefOr<Schema>) -> (SchemaRef, bool) {
        match schema {
            RefOr::Ref(r) => (
                SchemaRef::Ref(normalize_ref(&r.ref_location, self.self_uri)),
                false,
            ),
            RefOr::T(s) => self.schema(s),
        }
    }

    fn schema(&self, schema: &Schema) -> (SchemaRef, bool) {
        match schema {
            Schema::Object(obj) => {
                let (node, nullable) = self.object(obj);
                (SchemaRef::inline(node), nullable)
            }
            Schema::Array(arr) => {
                let items = match &arr.items {
                    ArrayItems::RefOrSchema(items) => self.ref_or(items).0,
                    _ => SchemaRef::inline(SchemaNode::Any),
                };
                let (_, nullable) = effective_type(&arr.schema_type);
                (SchemaRef::inline(SchemaNode::ArrayOf(items)), nullable)
            }
            Schema::AllOf(c) => {
                let docs = docs(&c.title, &c.description);
                self.composition(CompositionKind::AllOf, &c.items, None, docs)
            }
            Schema::OneOf(c) => {
                let docs = docs(&c.title, &c.description);
                let discriminator = c.discriminator.as_ref().map(|d| self.discriminator(d));
                self.composition(CompositionKind::OneOf, &c.items, discriminator, docs)
            }
            Schema::AnyOf(c) => {
                let title = c
                    .extensions
                    .as_ref()
                    .and_then(|ext| ext.get(ANY_OF_TITLE))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let docs = docs(&title, &c.description);
                let discriminator = c.discriminator.as_ref().map(|d| self.discriminator(d));
                self.composition(CompositionKind::AnyOf, &c.items, discriminator, docs)
            }
            _ => (SchemaRef::inline(SchemaNode::Any), false),
        }
    }

    fn object(&self, obj: &Object) -> (SchemaNode, bool) {
        let (ty, nullable) = effective_type(&obj.schema_type);
        let docs = docs(&obj.title, &obj.description);
        let enum_values = obj.enum_values.clone().unwrap_or_default();

        let primitive = |kind| {
            SchemaNode::Primitive(PrimitiveSchema {
                kind,
                format: obj.format.as_ref().and_then(format_name),
                enum_values: enum_values.clone(),
                docs: docs.clone(),
            })
        };

        let node = match ty {
            Some(Type::String) => primitive(PrimitiveKind::String),
            Some(Type::Integer) => primitive(PrimitiveKind::Integer),
            Some(Type::Number) => primitive(PrimitiveKind::Number),
            Some(Type::Boolean) => primitive(PrimitiveKind::Boolean),
            Some(Type::Array) => SchemaNode::ArrayOf(SchemaRef::inline(SchemaNode::Any)),
            Some(Type::Object) | None => match &obj.additional_properties {
                Some(additional) if obj.properties.is_empty() => {
                    let value = match additional.as_ref() {
                        AdditionalProperties::RefOr(schema) => self.ref_or(schema).0,
                        _ => SchemaRef::inline(SchemaNode::Any),
                    };
                    SchemaNode::MapOf(value)
                }
                _ if ty.is_none() && obj.properties.is_empty() && obj.required.is_empty() => {
                    match enum_values.iter().find_map(literal_kind) {
                        Some(kind) => primitive(kind),
                        None => SchemaNode::Any,
                    }
                }
                // An `allOf` member may carry only `required`.
                _ => SchemaNode::Object(self.object_properties(obj, docs.clone())),
            },
            _ => SchemaNode::Any,
        };
        (node, nullable)
    }

    fn object_properties(&self, obj: &Object, docs: Docs) -> ObjectSchema {
        let mut object = ObjectSchema {
            docs,
            ..ObjectSchema::default()
        };
        for (name, prop) in obj.properties.iter() {
            let (schema, nullable) = self.ref_or(prop);
            object.properties.insert(name.clone(), schema);
            if nullable {
                object.nullable.insert(name.clone());
            }
        }
        object.required.extend(obj.required.iter().cloned());
        object
    }

    fn composition(
        &self,
        kind: CompositionKind,
        items: &[RefOr<Schema>],
        discriminator: Option<Discriminator>,
        docs: Docs,
    ) -> (SchemaRef, bool) {
        let mut nullable = false;
        let mut members = Vec::new();
        for item in items {
            if is_null_schema(item) {
                nullable = true;
                continue;
            }
            let (member, member_nullable) = self.ref_or(item);
            nullable |= member_nullable && kind != CompositionKind::AllOf;
            members.push(member);
        }

        // `anyOf: [X, null]` is how a nullable reference is spelled.
        if nullable && kind != CompositionKind::AllOf && members.len() == 1 {
            if let Some(single) = members.pop() {
                return (single, true);
            }
        }

        let node = SchemaNode::Composition(CompositionSchema {
            kind,
            members,
            discriminator,
            docs,
        });
        (SchemaRef::inline(node), nullable)
    }

    fn discriminator(&self, d: &OasDiscriminator) -> Discriminator {
        Discriminator {
            property_name: d.property_name.clone(),
            mapping: d
                .mapping
                .iter()
                .map(|(wire, target)| DiscriminatorMapping {
                    wire_value: wire.clone(),
                    target: normalize_ref(target, self.self_uri),
                })
                .collect(),
        }
    }
}

/// The non-null type of a `type` keyword plus whether `null` is admitted.
fn effective_type(schema_type: &SchemaType) -> (Option<Type>, bool) {
    match schema_type {
        SchemaType::Type(Type::Null) => (None, true),
        SchemaType::Type(t) => (Some(t.clone()), false),
        SchemaType::Array(types) => {
            let nullable = types.contains(&Type::Null);
            let first = types.iter().find(|t| **t != Type::Null).cloned();
            (first, nullable)
        }
        _ => (None, false),
    }
}

fn is_null_schema(schema: &RefOr<Schema>) -> bool {
    matches!(
        schema,
        RefOr::T(Schema::Object(Object {
            schema_type: SchemaType::Type(Type::Null),
            ..
        }))
    )
}

fn format_name(format: &SchemaFormat) -> Option<String> {
    serde_json::to_value(format)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
}

fn literal_kind(value: &Value) -> Option<PrimitiveKind> {
    match value {
        Value::String(_) => Some(PrimitiveKind::String),
        Value::Bool(_) => Some(PrimitiveKind::Boolean),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(PrimitiveKind::Integer),
        Value::Number(_) => Some(PrimitiveKind::Number),
        _ => None,
    }
}

fn docs(title: &Option<String>, description: &Option<String>) -> Docs {
    Docs {
        title: title.clone(),
        description: description.clone(),
    }
}
