#![deny(missing_docs)]

//! # Schema Table
//!
//! The in-memory type graph for one document: named schemas that reference each
//! other, compose via `allOf` / `oneOf` / `anyOf`, and carry enums and
//! discriminators.
//!
//! The table is owned by a single session and mutated in place by the
//! flattening and cycle passes. Names are unique and iteration follows
//! document order.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

/// The four scalar kinds a schema may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// `type: string`
    String,
    /// `type: integer`
    Integer,
    /// `type: number`
    Number,
    /// `type: boolean`
    Boolean,
}

impl PrimitiveKind {
    /// The schema-level type name (`string`, `integer`, ...).
    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Title and description carried by a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docs {
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
}

/// A scalar schema, optionally restricted to enum literals.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    /// Scalar kind.
    pub kind: PrimitiveKind,
    /// `format` (e.g. `binary`, `date-time`, `int64`).
    pub format: Option<String>,
    /// `enum` literals, in declaration order.
    pub enum_values: Vec<serde_json::Value>,
    /// Documentation.
    pub docs: Docs,
}

impl PrimitiveSchema {
    /// A bare primitive with no format or enum.
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            format: None,
            enum_values: Vec::new(),
            docs: Docs::default(),
        }
    }

    /// Builder-style format setter.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// True for `type: string, format: binary`.
    pub fn is_binary(&self) -> bool {
        self.kind == PrimitiveKind::String && self.format.as_deref() == Some("binary")
    }
}

/// An object schema with named properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Properties in declaration order.
    pub properties: IndexMap<String, SchemaRef>,
    /// Names of required properties.
    pub required: IndexSet<String>,
    /// Names of properties that may hold `null`.
    ///
    /// Populated by the loader (`nullable`, `type: [.., null]`) and by the
    /// cycle detector for back-edges.
    pub nullable: IndexSet<String>,
    /// Documentation.
    pub docs: Docs,
}

impl ObjectSchema {
    /// Builder-style property insertion.
    pub fn with_property(mut self, name: &str, schema: SchemaRef, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.insert(name.to_string());
        }
        self
    }
}

/// Which composition keyword produced a [`CompositionSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompositionKind {
    /// `allOf`: intersection, merged into one object.
    AllOf,
    /// `oneOf`: exactly one alternative matches.
    OneOf,
    /// `anyOf`: at least one alternative matches.
    AnyOf,
}

impl fmt::Display for CompositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::OneOf => "oneOf",
            CompositionKind::AnyOf => "anyOf",
        })
    }
}

/// One `discriminator.mapping` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorMapping {
    /// Value found on the wire in the discriminator property.
    pub wire_value: String,
    /// Reference (or bare name) of the schema it selects.
    pub target: String,
}

/// A `discriminator` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discriminator {
    /// `propertyName`. May be empty in malformed documents.
    pub property_name: String,
    /// `mapping`, in document order.
    pub mapping: Vec<DiscriminatorMapping>,
}

/// An `allOf` / `oneOf` / `anyOf` schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionSchema {
    /// Keyword.
    pub kind: CompositionKind,
    /// Members in declaration order.
    pub members: Vec<SchemaRef>,
    /// Optional discriminator.
    pub discriminator: Option<Discriminator>,
    /// Documentation.
    pub docs: Docs,
}

impl CompositionSchema {
    /// A composition with no discriminator or docs.
    pub fn new(kind: CompositionKind, members: Vec<SchemaRef>) -> Self {
        Self {
            kind,
            members,
            discriminator: None,
            docs: Docs::default(),
        }
    }
}

/// A schema definition.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `string` / `integer` / `number` / `boolean`.
    Primitive(PrimitiveSchema),
    /// `type: array` with an item schema.
    ArrayOf(SchemaRef),
    /// `type: object` with only `additionalProperties`.
    MapOf(SchemaRef),
    /// `type: object` with properties.
    Object(ObjectSchema),
    /// A bare alias to another schema.
    Reference(String),
    /// `allOf` / `oneOf` / `anyOf`.
    Composition(CompositionSchema),
    /// A schema with no recognizable type (`{}`, description only, ...).
    Any,
    /// Sentinel returned for references that cannot be resolved.
    Unknown,
}

impl SchemaNode {
    /// True for `oneOf` / `anyOf` compositions.
    pub fn is_sum_type(&self) -> bool {
        matches!(
            self,
            SchemaNode::Composition(CompositionSchema {
                kind: CompositionKind::OneOf | CompositionKind::AnyOf,
                ..
            })
        )
    }

    /// True for `allOf` compositions.
    pub fn is_all_of(&self) -> bool {
        matches!(
            self,
            SchemaNode::Composition(CompositionSchema {
                kind: CompositionKind::AllOf,
                ..
            })
        )
    }

    /// Short label used in diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            SchemaNode::Primitive(p) => p.kind.type_name(),
            SchemaNode::ArrayOf(_) => "array",
            SchemaNode::MapOf(_) => "map",
            SchemaNode::Object(_) => "object",
            SchemaNode::Reference(_) => "reference",
            SchemaNode::Composition(c) => match c.kind {
                CompositionKind::AllOf => "allOf",
                CompositionKind::OneOf => "oneOf",
                CompositionKind::AnyOf => "anyOf",
            },
            SchemaNode::Any => "any",
            SchemaNode::Unknown => "unknown",
        }
    }
}

/// Either an inline schema or a named reference (`#/components/schemas/Pet` or `Pet`).
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    /// A `$ref` string.
    Ref(String),
    /// An inline definition.
    Inline(Box<SchemaNode>),
}

impl SchemaRef {
    /// Shorthand for a reference.
    pub fn reference(target: impl Into<String>) -> Self {
        SchemaRef::Ref(target.into())
    }

    /// Shorthand for an inline node.
    pub fn inline(node: SchemaNode) -> Self {
        SchemaRef::Inline(Box::new(node))
    }

    /// Shorthand for an inline primitive.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::inline(SchemaNode::Primitive(PrimitiveSchema::new(kind)))
    }

    /// Returns the reference string if this is a `$ref`.
    pub fn as_ref_str(&self) -> Option<&str> {
        match self {
            SchemaRef::Ref(r) => Some(r),
            SchemaRef::Inline(_) => None,
        }
    }

    /// Returns the inline node if this is not a `$ref`.
    pub fn as_inline(&self) -> Option<&SchemaNode> {
        match self {
            SchemaRef::Ref(_) => None,
            SchemaRef::Inline(node) => Some(node),
        }
    }
}

/// Named schemas of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaTable {
    schemas: IndexMap<String, SchemaNode>,
}

impl SchemaTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces in place) a named schema.
    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        self.schemas.insert(name.into(), node);
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: &str, node: SchemaNode) -> Self {
        self.insert(name, node);
        self
    }

    /// Looks up a schema by exact name.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    /// Looks up a schema, returning the stored key alongside it.
    pub fn get_key_value(&self, name: &str) -> Option<(&str, &SchemaNode)> {
        self.schemas
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable lookup by exact name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SchemaNode> {
        self.schemas.get_mut(name)
    }

    /// True if `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schema names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// `(name, node)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_preserves_order_on_replace() {
        let mut table = SchemaTable::new()
            .with("B", SchemaNode::Any)
            .with("A", SchemaNode::Any);
        table.insert("B", SchemaNode::Object(ObjectSchema::default()));

        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(matches!(table.get("B"), Some(SchemaNode::Object(_))));
    }

    #[test]
    fn test_sum_type_detection() {
        let one_of =
            SchemaNode::Composition(CompositionSchema::new(CompositionKind::OneOf, vec![]));
        let all_of =
            SchemaNode::Composition(CompositionSchema::new(CompositionKind::AllOf, vec![]));
        assert!(one_of.is_sum_type());
        assert!(!all_of.is_sum_type());
        assert!(all_of.is_all_of());
    }

    #[test]
    fn test_binary_primitive() {
        let bin = PrimitiveSchema::new(PrimitiveKind::String).with_format("binary");
        assert!(bin.is_binary());
        assert!(!PrimitiveSchema::new(PrimitiveKind::String).is_binary());
    }
}
