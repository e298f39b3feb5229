#![deny(missing_docs)]

//! # Metadata Builder
//!
//! Finalizes models and operations on demand. The builder only reads: the
//! table must already be flattened and cycle-marked, and the sealed registry
//! must already hold every parent link.

use crate::diagnostics::Diagnostics;
use crate::graph::resolver::Resolver;
use crate::graph::sealed::{CompositionAlternative, Discovery};
use crate::metadata::models::{
    EnumVariable, ModelMetadata, OperationMetadata, ParameterMetadata, PropertyMetadata,
    RequestBodyMetadata,
};
use crate::naming::{resolve_collisions, ModelNamer};
use crate::oas::operations::{BodyFormat, OperationDescriptor, RequestBodyDescriptor};
use crate::schema::{
    Docs, ObjectSchema, PrimitiveKind, PrimitiveSchema, SchemaNode, SchemaRef, SchemaTable,
};
use crate::type_mapping::{ImportHint, PayloadContext, SchemaTypeMapper, TypeMapper};
use serde_json::Value;

/// Builds [`ModelMetadata`] and [`OperationMetadata`] over a prepared table.
#[derive(Debug, Clone, Copy)]
pub struct MetadataBuilder<'a> {
    table: &'a SchemaTable,
    namer: &'a ModelNamer,
    discovery: &'a Discovery,
}

impl<'a> MetadataBuilder<'a> {
    /// Creates a builder.
    pub fn new(table: &'a SchemaTable, namer: &'a ModelNamer, discovery: &'a Discovery) -> Self {
        Self {
            table,
            namer,
            discovery,
        }
    }

    fn mapper(&self) -> SchemaTypeMapper<'a> {
        SchemaTypeMapper::new(Resolver::new(self.table), self.namer)
    }

    /// Finalizes one named schema. `None` if the table has no such name.
    pub fn model(&self, name: &str, diags: &mut Diagnostics) -> Option<ModelMetadata> {
        let (schema_name, node) = self.table.get_key_value(name)?;
        let class_name = self.namer.class_name(schema_name);
        let docs = docs_of(node).cloned().unwrap_or_default();

        let mut model = ModelMetadata {
            schema_name: schema_name.to_string(),
            file_name: self.namer.file_name(schema_name),
            title: docs.title,
            description: docs.description,
            is_enum: false,
            enum_variables: Vec::new(),
            is_composition: false,
            composition: None,
            parent_type_name: self
                .discovery
                .registry
                .parent_of(schema_name)
                .map(|parent| self.namer.class_name(parent)),
            properties: Vec::new(),
            value_type: None,
            imports: Vec::new(),
            class_name,
        };

        match node {
            SchemaNode::Primitive(p) if !p.enum_values.is_empty() => {
                model.is_enum = true;
                model.enum_variables = self.enum_variables(p);
            }
            SchemaNode::Object(object) => {
                model.properties = self.properties(schema_name, object, diags);
            }
            SchemaNode::Composition(_) => {
                if let Some(composition) = self.discovery.compositions.get(schema_name) {
                    model.is_composition = true;
                    model.composition = Some(composition.clone());
                }
            }
            other => {
                let inline = SchemaRef::inline(other.clone());
                model.value_type = Some(self.mapper().map(
                    &inline,
                    PayloadContext::Default,
                    Some(schema_name),
                    diags,
                ));
            }
        }

        model.imports = self.model_imports(&model);
        Some(model)
    }

    /// Finalizes every named schema, in table order.
    pub fn models(&self, diags: &mut Diagnostics) -> Vec<ModelMetadata> {
        self.table
            .names()
            .filter_map(|name| self.model(name, diags))
            .collect()
    }

    /// Finalizes one operation.
    pub fn operation(
        &self,
        operation: &OperationDescriptor,
        diags: &mut Diagnostics,
    ) -> OperationMetadata {
        let subject = operation.operation_id.as_str();
        let mapper = self.mapper();

        let identifiers = resolve_collisions(
            operation
                .parameters
                .iter()
                .map(|p| self.namer.identifier(&p.name)),
        );
        let parameters: Vec<ParameterMetadata> = operation
            .parameters
            .iter()
            .zip(identifiers)
            .map(|(param, identifier)| {
                let type_ref =
                    mapper.map(&param.schema, PayloadContext::Default, Some(subject), diags);
                ParameterMetadata {
                    name: param.name.clone(),
                    identifier,
                    location: Some(param.location),
                    imports: type_ref.imports(),
                    type_ref,
                    required: param.required,
                    nullable: param.nullable,
                    description: param.description.clone(),
                }
            })
            .collect();

        let body = operation
            .body
            .as_ref()
            .map(|body| self.request_body(subject, body, diags));

        let mut imports = Vec::new();
        for param in &parameters {
            merge_imports(&mut imports, &param.imports);
        }
        if let Some(body) = &body {
            merge_imports(&mut imports, &body.type_ref.imports());
            for field in &body.fields {
                merge_imports(&mut imports, &field.imports);
            }
        }

        OperationMetadata {
            operation_id: operation.operation_id.clone(),
            method: operation.method.clone(),
            path: operation.path.clone(),
            parameters,
            body,
            imports,
        }
    }

    fn request_body(
        &self,
        subject: &str,
        body: &RequestBodyDescriptor,
        diags: &mut Diagnostics,
    ) -> RequestBodyMetadata {
        let type_ref = self
            .mapper()
            .map(&body.schema, PayloadContext::Default, Some(subject), diags);

        let fields = match body.format {
            BodyFormat::Multipart => {
                self.body_fields(subject, &body.schema, PayloadContext::Multipart, diags)
            }
            BodyFormat::Form => {
                self.body_fields(subject, &body.schema, PayloadContext::Default, diags)
            }
            BodyFormat::Json | BodyFormat::Other => Vec::new(),
        };

        RequestBodyMetadata {
            content_type: body.content_type.clone(),
            format: body.format,
            type_ref,
            required: body.required,
            description: body.description.clone(),
            fields,
        }
    }

    /// One field per top-level property of the body object, resolved in `context`.
    fn body_fields(
        &self,
        subject: &str,
        schema: &SchemaRef,
        context: PayloadContext,
        diags: &mut Diagnostics,
    ) -> Vec<ParameterMetadata> {
        let Some(object) = self.object_of(schema, subject, diags) else {
            return Vec::new();
        };
        let mapper = self.mapper();
        let identifiers =
            resolve_collisions(object.properties.keys().map(|name| self.namer.identifier(name)));

        object
            .properties
            .iter()
            .zip(identifiers)
            .map(|((name, property), identifier)| {
                let type_ref = mapper.map(property, context, Some(subject), diags);
                ParameterMetadata {
                    name: name.clone(),
                    identifier,
                    location: None,
                    imports: type_ref.imports(),
                    type_ref,
                    required: object.required.contains(name),
                    nullable: object.nullable.contains(name),
                    description: inline_description(property),
                }
            })
            .collect()
    }

    fn object_of<'s>(
        &self,
        schema: &'s SchemaRef,
        subject: &str,
        diags: &mut Diagnostics,
    ) -> Option<&'s ObjectSchema>
    where
        'a: 's,
    {
        let resolver = Resolver::new(self.table);
        match resolver.target(schema, Some(subject), diags).node() {
            SchemaNode::Object(object) => Some(object),
            SchemaNode::Reference(r) => match resolver.resolve(r, Some(subject), diags).node {
                SchemaNode::Object(object) => Some(object),
                _ => None,
            },
            _ => None,
        }
    }

    fn properties(
        &self,
        owner: &str,
        object: &ObjectSchema,
        diags: &mut Diagnostics,
    ) -> Vec<PropertyMetadata> {
        let mapper = self.mapper();
        let identifiers =
            resolve_collisions(object.properties.keys().map(|name| self.namer.identifier(name)));

        object
            .properties
            .iter()
            .zip(identifiers)
            .map(|((name, schema), identifier)| {
                let type_ref = mapper.map(schema, PayloadContext::Default, Some(owner), diags);
                PropertyMetadata {
                    name: name.clone(),
                    identifier,
                    imports: type_ref.imports(),
                    type_ref,
                    required: object.required.contains(name),
                    nullable: object.nullable.contains(name),
                    description: inline_description(schema),
                }
            })
            .collect()
    }

    fn enum_variables(&self, primitive: &PrimitiveSchema) -> Vec<EnumVariable> {
        // `null` in the literal list only marks the enum nullable.
        let literals: Vec<String> = primitive
            .enum_values
            .iter()
            .filter(|v| !v.is_null())
            .map(literal_text)
            .collect();
        let identifiers =
            resolve_collisions(literals.iter().map(|l| self.namer.enum_identifier(l)));
        let is_string_kind = primitive.kind == PrimitiveKind::String;

        literals
            .into_iter()
            .zip(identifiers)
            .map(|(literal_value, identifier)| EnumVariable {
                identifier,
                literal_value,
                is_string_kind,
            })
            .collect()
    }

    fn model_imports(&self, model: &ModelMetadata) -> Vec<ImportHint> {
        let mut imports = Vec::new();
        if let Some(parent) = self.discovery.registry.parent_of(&model.schema_name) {
            merge_imports(&mut imports, &[self.model_hint(parent)]);
        }
        if let Some(composition) = &model.composition {
            for alternative in &composition.alternatives {
                if let CompositionAlternative::Reference { schema_name, .. } =
                    &alternative.alternative
                {
                    if self.table.contains(schema_name) {
                        merge_imports(&mut imports, &[self.model_hint(schema_name)]);
                    }
                }
            }
        }
        for property in &model.properties {
            merge_imports(&mut imports, &property.imports);
        }
        if let Some(value_type) = &model.value_type {
            merge_imports(&mut imports, &value_type.imports());
        }

        imports.retain(|hint| {
            !matches!(hint, ImportHint::Model { class_name, .. } if *class_name == model.class_name)
        });
        imports
    }

    fn model_hint(&self, schema_name: &str) -> ImportHint {
        ImportHint::Model {
            class_name: self.namer.class_name(schema_name),
            file_name: self.namer.file_name(schema_name),
        }
    }
}

fn docs_of(node: &SchemaNode) -> Option<&Docs> {
    match node {
        SchemaNode::Primitive(p) => Some(&p.docs),
        SchemaNode::Object(o) => Some(&o.docs),
        SchemaNode::Composition(c) => Some(&c.docs),
        _ => None,
    }
}

fn inline_description(schema: &SchemaRef) -> Option<String> {
    schema
        .as_inline()
        .and_then(docs_of)
        .and_then(|docs| docs.description.clone())
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn merge_imports(into: &mut Vec<ImportHint>, hints: &[ImportHint]) {
    for hint in hints {
        if !into.contains(hint) {
            into.push(hint.clone());
        }
    }
}
