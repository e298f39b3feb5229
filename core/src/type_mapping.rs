#![deny(missing_docs)]

//! # Type Mapping
//!
//! Resolves schema references into language-neutral [`TypeRef`]s for the
//! template stage.
//!
//! Binary leaves (`type: string, format: binary`) depend on the payload they
//! appear in: a file attachment inside a multipart body, a byte buffer
//! everywhere else. The payload is passed explicitly as a [`PayloadContext`]
//! on each call, so one resolution can never observe another's context.

use crate::diagnostics::Diagnostics;
use crate::graph::resolver::{Resolver, Target, UNKNOWN_SCHEMA};
use crate::naming::ModelNamer;
use crate::schema::{CompositionKind, PrimitiveKind, SchemaNode, SchemaRef};
use serde::Serialize;
use std::fmt::Display;

/// Encoding of the payload a schema is resolved for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PayloadContext {
    /// Anything that is not a multipart body.
    #[default]
    Default,
    /// Direct fields of a `multipart/*` request body.
    Multipart,
}

impl PayloadContext {
    /// The context that applies one property level further down.
    ///
    /// Only the fields of the body itself see the multipart context.
    pub fn nested(self) -> Self {
        PayloadContext::Default
    }
}

/// A resolved, language-neutral type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TypeRef {
    /// A scalar.
    Primitive {
        /// Scalar kind.
        primitive: PrimitiveKind,
        /// `format`, if any.
        format: Option<String>,
    },
    /// A generated model.
    Model {
        /// Canonical schema name.
        schema_name: String,
        /// Generated class name.
        class_name: String,
        /// Generated file name.
        file_name: String,
    },
    /// A homogeneous list.
    List {
        /// Item type.
        item: Box<TypeRef>,
    },
    /// A string-keyed map.
    Map {
        /// Value type.
        value: Box<TypeRef>,
    },
    /// A binary field uploaded as a multipart file.
    FileAttachment,
    /// A binary field carried as raw bytes.
    ByteBuffer,
    /// Any JSON value.
    Any,
    /// The target of an unresolvable reference.
    Unknown,
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Primitive {
                primitive,
                format: Some(format),
            } => write!(f, "{}({})", primitive, format),
            TypeRef::Primitive { primitive, .. } => write!(f, "{}", primitive),
            TypeRef::Model { class_name, .. } => write!(f, "{}", class_name),
            TypeRef::List { item } => write!(f, "list<{}>", item),
            TypeRef::Map { value } => write!(f, "map<{}>", value),
            TypeRef::FileAttachment => write!(f, "file"),
            TypeRef::ByteBuffer => write!(f, "bytes"),
            TypeRef::Any => write!(f, "any"),
            TypeRef::Unknown => write!(f, "{}", UNKNOWN_SCHEMA),
        }
    }
}

/// Something a generated file must import to use a [`TypeRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ImportHint {
    /// Another generated model.
    Model {
        /// Class name.
        class_name: String,
        /// File name.
        file_name: String,
    },
    /// The multipart file type.
    FileAttachment,
    /// The byte buffer type.
    ByteBuffer,
}

impl TypeRef {
    /// Shorthand for a scalar without format.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive {
            primitive: kind,
            format: None,
        }
    }

    /// Imports needed by this type, outermost first, without duplicates.
    pub fn imports(&self) -> Vec<ImportHint> {
        let mut out = Vec::new();
        self.collect_imports(&mut out);
        out
    }

    fn collect_imports(&self, out: &mut Vec<ImportHint>) {
        let hint = match self {
            TypeRef::Model {
                class_name,
                file_name,
                ..
            } => ImportHint::Model {
                class_name: class_name.clone(),
                file_name: file_name.clone(),
            },
            TypeRef::FileAttachment => ImportHint::FileAttachment,
            TypeRef::ByteBuffer => ImportHint::ByteBuffer,
            TypeRef::List { item } => return item.collect_imports(out),
            TypeRef::Map { value } => return value.collect_imports(out),
            TypeRef::Primitive { .. } | TypeRef::Any | TypeRef::Unknown => return,
        };
        if !out.contains(&hint) {
            out.push(hint);
        }
    }
}

/// Trait for resolving schemas into [`TypeRef`]s.
pub trait TypeMapper {
    /// Maps `schema` as seen in `context`. `subject` names the owner for diagnostics.
    fn map(
        &self,
        schema: &SchemaRef,
        context: PayloadContext,
        subject: Option<&str>,
        diags: &mut Diagnostics,
    ) -> TypeRef;
}

/// The standard [`TypeMapper`] over a schema table.
#[derive(Debug, Clone, Copy)]
pub struct SchemaTypeMapper<'a> {
    resolver: Resolver<'a>,
    namer: &'a ModelNamer,
}

impl<'a> SchemaTypeMapper<'a> {
    /// Creates a mapper.
    pub fn new(resolver: Resolver<'a>, namer: &'a ModelNamer) -> Self {
        Self { resolver, namer }
    }

    fn model(&self, schema_name: &str) -> TypeRef {
        TypeRef::Model {
            schema_name: schema_name.to_string(),
            class_name: self.namer.class_name(schema_name),
            file_name: self.namer.file_name(schema_name),
        }
    }

    fn map_inline(
        &self,
        node: &SchemaNode,
        context: PayloadContext,
        subject: Option<&str>,
        diags: &mut Diagnostics,
    ) -> TypeRef {
        match node {
            SchemaNode::Primitive(p) if p.is_binary() => match context {
                PayloadContext::Multipart => TypeRef::FileAttachment,
                PayloadContext::Default => TypeRef::ByteBuffer,
            },
            SchemaNode::Primitive(p) => TypeRef::Primitive {
                primitive: p.kind,
                format: p.format.clone(),
            },
            // Array items are part of the same field.
            SchemaNode::ArrayOf(items) => TypeRef::List {
                item: Box::new(self.map(items, context, subject, diags)),
            },
            SchemaNode::MapOf(values) => TypeRef::Map {
                value: Box::new(self.map(values, context.nested(), subject, diags)),
            },
            SchemaNode::Reference(r) => {
                self.map(&SchemaRef::Ref(r.clone()), context, subject, diags)
            }
            SchemaNode::Composition(c)
                if c.kind == CompositionKind::AllOf && c.members.len() == 1 =>
            {
                self.map(&c.members[0], context, subject, diags)
            }
            SchemaNode::Object(_) | SchemaNode::Composition(_) | SchemaNode::Any => TypeRef::Any,
            SchemaNode::Unknown => TypeRef::Unknown,
        }
    }
}

impl TypeMapper for SchemaTypeMapper<'_> {
    fn map(
        &self,
        schema: &SchemaRef,
        context: PayloadContext,
        subject: Option<&str>,
        diags: &mut Diagnostics,
    ) -> TypeRef {
        match self.resolver.target(schema, subject, diags) {
            Target::Inline(node) => self.map_inline(node, context, subject, diags),
            Target::Named(resolved) if resolved.is_unknown() => TypeRef::Unknown,
            Target::Named(resolved) => match resolved.node {
                // Plain named scalars are used inline; enums get their own model.
                SchemaNode::Primitive(p) if p.enum_values.is_empty() => {
                    self.map_inline(resolved.node, context, subject, diags)
                }
                SchemaNode::Any => TypeRef::Any,
                _ => self.model(resolved.name),
            },
        }
    }
}
