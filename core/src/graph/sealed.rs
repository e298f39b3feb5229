#![deny(missing_docs)]

//! # Sealed Types
//!
//! Turns `oneOf` / `anyOf` schemas into tagged-union metadata and records which
//! parent each referenced alternative belongs to.
//!
//! Discovery runs over the whole table before any model is finalized, so a
//! model always sees its parent regardless of table order.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::resolver::{ref_name, Resolver};
use crate::naming::{resolve_collisions, ModelNamer};
use crate::schema::{
    CompositionKind, CompositionSchema, PrimitiveKind, SchemaNode, SchemaRef, SchemaTable,
};
use indexmap::IndexMap;
use serde::Serialize;

/// Child schema name -> parent schema name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SealedRegistry {
    parents: IndexMap<String, String>,
}

impl SealedRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `child` as an alternative of `parent`.
    ///
    /// A child claimed by two different parents keeps the later one.
    pub fn register(&mut self, child: &str, parent: &str, diags: &mut Diagnostics) {
        if let Some(previous) = self.parents.get(child) {
            if previous != parent {
                diags.warn(
                    DiagnosticKind::SealedParentConflict,
                    Some(child),
                    format!(
                        "alternative of both '{}' and '{}'; '{}' is used as parent",
                        previous, parent, parent
                    ),
                );
            }
        }
        self.parents.insert(child.to_string(), parent.to_string());
    }

    /// The parent schema of `child`, if any.
    pub fn parent_of(&self, child: &str) -> Option<&str> {
        self.parents.get(child).map(String::as_str)
    }

    /// Children registered under `parent`, in registration order.
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.parents
            .iter()
            .filter(move |(_, p)| p.as_str() == parent)
            .map(|(c, _)| c.as_str())
    }

    /// `(child, parent)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parents.iter().map(|(c, p)| (c.as_str(), p.as_str()))
    }

    /// Number of registered children.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// One classified alternative of a sum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CompositionAlternative {
    /// A named schema.
    Reference {
        /// Canonical schema name (or the unknown sentinel).
        schema_name: String,
        /// Generated class name.
        class_name: String,
    },
    /// An inline scalar, wrapped in a synthesized class.
    Primitive {
        /// Scalar kind.
        primitive_kind: PrimitiveKind,
        /// `parent + Capitalized(kind)`.
        wrapper_name: String,
    },
    /// An inline object, array or map.
    Inline {
        /// 1-based position in the member list.
        index: usize,
        /// `parent + "Option" + index`.
        synthetic_name: String,
    },
}

impl CompositionAlternative {
    /// The generated type name for this alternative.
    pub fn type_name(&self) -> &str {
        match self {
            CompositionAlternative::Reference { class_name, .. } => class_name,
            CompositionAlternative::Primitive { wrapper_name, .. } => wrapper_name,
            CompositionAlternative::Inline { synthetic_name, .. } => synthetic_name,
        }
    }
}

/// An alternative plus its position flag for templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeMetadata {
    /// The alternative.
    #[serde(flatten)]
    pub alternative: CompositionAlternative,
    /// False on the last alternative.
    pub has_next: bool,
}

/// A resolved discriminator mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscriminatorTarget {
    /// Value on the wire.
    pub wire_value: String,
    /// Canonical schema name.
    pub schema_name: String,
    /// Generated subclass name.
    pub class_name: String,
}

/// An enabled discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscriminatorMetadata {
    /// Tag property name; never empty.
    pub property_name: String,
    /// Resolved mapping, in declaration order.
    pub mappings: Vec<DiscriminatorTarget>,
}

/// Tagged-union view of one `oneOf` / `anyOf` schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionMetadata {
    /// `oneOf` or `anyOf`.
    pub kind: CompositionKind,
    /// Classified alternatives.
    pub alternatives: Vec<AlternativeMetadata>,
    /// Always `None` for `anyOf`.
    pub discriminator: Option<DiscriminatorMetadata>,
}

/// Result of the whole-table discovery pass.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Parent links for every referenced alternative.
    pub registry: SealedRegistry,
    /// Metadata per sum-type schema, in table order.
    pub compositions: IndexMap<String, CompositionMetadata>,
}

/// Builds composition metadata for every `oneOf` / `anyOf` in the table and
/// fills the registry.
pub fn discover(table: &SchemaTable, namer: &ModelNamer, diags: &mut Diagnostics) -> Discovery {
    let resolver = Resolver::new(table);
    let mut discovery = Discovery::default();

    for (name, node) in table.iter() {
        let SchemaNode::Composition(composition) = node else {
            continue;
        };
        if composition.kind == CompositionKind::AllOf {
            continue;
        }
        let metadata = build_composition(
            name,
            composition,
            &resolver,
            namer,
            &mut discovery.registry,
            diags,
        );
        discovery.compositions.insert(name.to_string(), metadata);
    }

    tracing::debug!(
        compositions = discovery.compositions.len(),
        children = discovery.registry.len(),
        "sealed-type discovery finished"
    );
    discovery
}

/// Classifies the alternatives of one sum type and resolves its discriminator.
///
/// Referenced alternatives are registered under `parent`. Unclassifiable
/// members are dropped with a diagnostic.
pub fn build_composition(
    parent: &str,
    composition: &CompositionSchema,
    resolver: &Resolver<'_>,
    namer: &ModelNamer,
    registry: &mut SealedRegistry,
    diags: &mut Diagnostics,
) -> CompositionMetadata {
    let parent_class = namer.class_name(parent);
    let mut alternatives = Vec::new();

    for (index, member) in composition.members.iter().enumerate() {
        let position = index + 1;
        let reference = match member {
            SchemaRef::Ref(r) => Some(r.as_str()),
            SchemaRef::Inline(node) => match node.as_ref() {
                SchemaNode::Reference(r) => Some(r.as_str()),
                _ => None,
            },
        };

        if let Some(reference) = reference {
            let resolved = resolver.resolve(reference, Some(parent), diags);
            if !resolved.is_unknown() {
                registry.register(resolved.name, parent, diags);
            }
            alternatives.push(CompositionAlternative::Reference {
                schema_name: resolved.name.to_string(),
                class_name: namer.class_name(resolved.name),
            });
            continue;
        }

        match member.as_inline() {
            Some(SchemaNode::Primitive(p)) => {
                alternatives.push(CompositionAlternative::Primitive {
                    primitive_kind: p.kind,
                    wrapper_name: format!("{}{}", parent_class, capitalized(p.kind)),
                });
            }
            Some(SchemaNode::Object(_) | SchemaNode::ArrayOf(_) | SchemaNode::MapOf(_)) => {
                alternatives.push(CompositionAlternative::Inline {
                    index: position,
                    synthetic_name: format!("{}Option{}", parent_class, position),
                });
            }
            other => diags.warn(
                DiagnosticKind::AlternativeDropped,
                Some(parent),
                format!(
                    "{} member {} ({}) has no reference or recognizable type; dropped",
                    composition.kind,
                    position,
                    other.map(SchemaNode::kind_label).unwrap_or("unknown")
                ),
            ),
        }
    }

    dedupe_synthetic_names(&mut alternatives);

    let discriminator = match composition.kind {
        CompositionKind::OneOf => {
            resolve_discriminator(parent, composition, &alternatives, resolver, namer, diags)
        }
        _ => {
            if composition.discriminator.is_some() {
                tracing::debug!(schema = parent, "discriminator ignored on {}", composition.kind);
            }
            None
        }
    };

    let count = alternatives.len();
    CompositionMetadata {
        kind: composition.kind,
        alternatives: alternatives
            .into_iter()
            .enumerate()
            .map(|(i, alternative)| AlternativeMetadata {
                alternative,
                has_next: i + 1 < count,
            })
            .collect(),
        discriminator,
    }
}

fn capitalized(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "String",
        PrimitiveKind::Integer => "Integer",
        PrimitiveKind::Number => "Number",
        PrimitiveKind::Boolean => "Boolean",
    }
}

/// Two inline scalars of the same kind would otherwise share a wrapper name.
fn dedupe_synthetic_names(alternatives: &mut [CompositionAlternative]) {
    let wrappers: Vec<String> = alternatives
        .iter()
        .filter_map(|a| match a {
            CompositionAlternative::Primitive { wrapper_name, .. } => Some(wrapper_name.clone()),
            _ => None,
        })
        .collect();
    let mut unique = resolve_collisions(wrappers).into_iter();
    for alternative in alternatives.iter_mut() {
        if let CompositionAlternative::Primitive { wrapper_name, .. } = alternative {
            if let Some(name) = unique.next() {
                *wrapper_name = name;
            }
        }
    }
}

fn resolve_discriminator(
    parent: &str,
    composition: &CompositionSchema,
    alternatives: &[CompositionAlternative],
    resolver: &Resolver<'_>,
    namer: &ModelNamer,
    diags: &mut Diagnostics,
) -> Option<DiscriminatorMetadata> {
    let discriminator = composition.discriminator.as_ref()?;
    let property_name = discriminator.property_name.trim();
    if property_name.is_empty() {
        return None;
    }

    let mappings = if discriminator.mapping.is_empty() {
        alternatives
            .iter()
            .filter_map(|a| match a {
                CompositionAlternative::Reference {
                    schema_name,
                    class_name,
                } if resolver.table().contains(schema_name) => Some(DiscriminatorTarget {
                    wire_value: schema_name.clone(),
                    schema_name: schema_name.clone(),
                    class_name: class_name.clone(),
                }),
                _ => None,
            })
            .collect()
    } else {
        let mut mappings = Vec::new();
        for entry in &discriminator.mapping {
            match resolver.try_resolve(&entry.target) {
                Some(resolved) => mappings.push(DiscriminatorTarget {
                    wire_value: entry.wire_value.clone(),
                    schema_name: resolved.name.to_string(),
                    class_name: namer.class_name(resolved.name),
                }),
                None => diags.warn(
                    DiagnosticKind::DiscriminatorMapping,
                    Some(parent),
                    format!(
                        "mapping '{}' -> '{}' does not match any schema; entry dropped",
                        entry.wire_value,
                        ref_name(&entry.target).unwrap_or_else(|| entry.target.clone())
                    ),
                ),
            }
        }
        mappings
    };

    Some(DiscriminatorMetadata {
        property_name: property_name.to_string(),
        mappings,
    })
}
