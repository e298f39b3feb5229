#![deny(missing_docs)]

//! # allOf Flattening
//!
//! Replaces every `allOf` schema in the table with a single merged object.
//!
//! Logic:
//! - Object members (inline or referenced) contribute their properties; a later
//!   member overrides an earlier one on the same name, and required / nullable
//!   sets are unioned.
//! - A referenced `oneOf` / `anyOf` member is not inlined. It becomes one new
//!   required property named after the member (camelCase), typed as a
//!   reference to it.
//! - A referenced member that is itself an `allOf` is flattened first. Each
//!   schema is still flattened exactly once.
//! - A member that closes an `allOf` cycle is skipped with an error diagnostic.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::resolver::{ref_name, Resolver};
use crate::naming::to_camel_case;
use crate::schema::{
    CompositionKind, CompositionSchema, ObjectSchema, SchemaNode, SchemaRef, SchemaTable,
};
use indexmap::{IndexMap, IndexSet};

/// Flattens all `allOf` schemas in place, in table order.
///
/// Returns the names of the schemas that were replaced.
pub fn flatten_all_of(table: &mut SchemaTable, diags: &mut Diagnostics) -> Vec<String> {
    let targets: Vec<String> = table
        .iter()
        .filter(|(_, node)| node.is_all_of())
        .map(|(name, _)| name.to_string())
        .collect();

    let mut flattened = Vec::new();
    let mut stack = Vec::new();
    for name in targets {
        flatten_one(table, &name, &mut stack, &mut flattened, diags);
    }
    flattened
}

fn flatten_one(
    table: &mut SchemaTable,
    name: &str,
    stack: &mut Vec<String>,
    flattened: &mut Vec<String>,
    diags: &mut Diagnostics,
) {
    let composition = match table.get(name) {
        Some(SchemaNode::Composition(c)) if c.kind == CompositionKind::AllOf => c.clone(),
        // Already flattened as a dependency of an earlier schema.
        _ => return,
    };

    stack.push(name.to_string());
    let mut acc = MergeAccumulator::default();

    for (index, member) in composition.members.iter().enumerate() {
        let position = index + 1;
        match member {
            SchemaRef::Ref(reference) => {
                let (target, unknown, nested_all_of) = {
                    let resolved = Resolver::new(table).resolve(reference, Some(name), diags);
                    (
                        resolved.name.to_string(),
                        resolved.is_unknown(),
                        resolved.node.is_all_of(),
                    )
                };
                if unknown {
                    continue;
                }
                if nested_all_of {
                    if stack.contains(&target) {
                        let mut path = stack.clone();
                        path.push(target.clone());
                        diags.error(
                            DiagnosticKind::AllOfCycle,
                            Some(name),
                            format!(
                                "allOf member {} closes a cycle ({}); member skipped",
                                position,
                                path.join(" -> ")
                            ),
                        );
                        continue;
                    }
                    flatten_one(table, &target, stack, flattened, diags);
                }
                merge_named_member(table, name, reference, &target, position, &mut acc, diags);
            }
            SchemaRef::Inline(node) => {
                merge_inline_member(name, node, position, &mut acc, diags);
            }
        }
    }

    stack.pop();
    tracing::debug!(
        schema = name,
        properties = acc.properties.len(),
        "flattened allOf"
    );
    table.insert(name, SchemaNode::Object(acc.into_object(&composition)));
    flattened.push(name.to_string());
}

fn merge_named_member(
    table: &SchemaTable,
    parent: &str,
    reference: &str,
    target: &str,
    position: usize,
    acc: &mut MergeAccumulator,
    diags: &mut Diagnostics,
) {
    match table.get(target) {
        Some(node) if node.is_sum_type() => {
            let property = to_camel_case(target);
            acc.insert(
                parent,
                &property,
                SchemaRef::Ref(reference.to_string()),
                true,
                false,
                diags,
            );
        }
        Some(SchemaNode::Object(object)) => acc.merge_object(parent, object, diags),
        Some(SchemaNode::Any) => {}
        Some(other) => diags.warn(
            DiagnosticKind::AllOfMemberIgnored,
            Some(parent),
            format!(
                "allOf member {} ('{}') is {} and contributes no properties",
                position,
                target,
                other.kind_label()
            ),
        ),
        None => {}
    }
}

fn merge_inline_member(
    parent: &str,
    node: &SchemaNode,
    position: usize,
    acc: &mut MergeAccumulator,
    diags: &mut Diagnostics,
) {
    match node {
        SchemaNode::Object(object) => acc.merge_object(parent, object, diags),
        // Description-only members are common and carry nothing to merge.
        SchemaNode::Any => {}
        other => diags.warn(
            DiagnosticKind::AllOfMemberIgnored,
            Some(parent),
            format!(
                "inline allOf member {} is {} and contributes no properties",
                position,
                other.kind_label()
            ),
        ),
    }
}

#[derive(Default)]
struct MergeAccumulator {
    properties: IndexMap<String, SchemaRef>,
    required: IndexSet<String>,
    nullable: IndexSet<String>,
}

impl MergeAccumulator {
    fn merge_object(&mut self, parent: &str, object: &ObjectSchema, diags: &mut Diagnostics) {
        for (prop, schema) in &object.properties {
            self.insert(
                parent,
                prop,
                schema.clone(),
                object.required.contains(prop),
                object.nullable.contains(prop),
                diags,
            );
        }
        // Required names without a local property still apply to inherited ones.
        self.required.extend(object.required.iter().cloned());
    }

    fn insert(
        &mut self,
        parent: &str,
        prop: &str,
        schema: SchemaRef,
        required: bool,
        nullable: bool,
        diags: &mut Diagnostics,
    ) {
        if let Some(existing) = self.properties.get(prop) {
            let before = type_signature(existing);
            let after = type_signature(&schema);
            if before != after {
                diags.warn(
                    DiagnosticKind::PropertyConflict,
                    Some(parent),
                    format!(
                        "property '{}' redefined from {} to {}; last definition wins",
                        prop, before, after
                    ),
                );
            }
        }
        self.properties.insert(prop.to_string(), schema);
        if required {
            self.required.insert(prop.to_string());
        }
        if nullable {
            self.nullable.insert(prop.to_string());
        } else {
            self.nullable.shift_remove(prop);
        }
    }

    fn into_object(self, source: &CompositionSchema) -> ObjectSchema {
        ObjectSchema {
            properties: self.properties,
            required: self.required,
            nullable: self.nullable,
            docs: source.docs.clone(),
        }
    }
}

/// Structural label used to decide whether two property definitions conflict.
fn type_signature(schema: &SchemaRef) -> String {
    match schema {
        SchemaRef::Ref(r) => format!("${}", ref_name(r).unwrap_or_default()),
        SchemaRef::Inline(node) => node_signature(node),
    }
}

fn node_signature(node: &SchemaNode) -> String {
    match node {
        SchemaNode::Primitive(p) => match &p.format {
            Some(format) => format!("{}({})", p.kind, format),
            None => p.kind.to_string(),
        },
        SchemaNode::ArrayOf(items) => format!("array<{}>", type_signature(items)),
        SchemaNode::MapOf(values) => format!("map<{}>", type_signature(values)),
        SchemaNode::Reference(r) => format!("${}", ref_name(r).unwrap_or_default()),
        other => other.kind_label().to_string(),
    }
}
