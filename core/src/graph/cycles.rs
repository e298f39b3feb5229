#![deny(missing_docs)]

//! # Cycle Detection
//!
//! Marks the properties that close a reference cycle as nullable so that the
//! generated types can be constructed.
//!
//! Only two kinds of property edge are followed:
//! - a property whose schema is a direct reference,
//! - an array property whose item schema is a reference.
//!
//! Inline objects, maps and compositions are not traversed.
//!
//! An edge `X.p -> Y` closes a cycle exactly when `Y` can reach `X` again over
//! followed edges, i.e. when both ends lie in the same strongly connected
//! component. A schema reachable along two disjoint paths (a diamond) is never
//! flagged.

use crate::graph::resolver::Resolver;
use crate::schema::{SchemaNode, SchemaRef, SchemaTable};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::HashMap;

/// A property edge that closes a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BackEdge {
    /// Schema owning the property.
    pub schema: String,
    /// Property name.
    pub property: String,
    /// Canonical name of the referenced schema.
    pub target: String,
}

/// Outcome of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Marked edges, in table and property order.
    pub back_edges: Vec<BackEdge>,
}

impl CycleReport {
    /// True if `schema.property` was marked.
    pub fn is_marked(&self, schema: &str, property: &str) -> bool {
        self.back_edges
            .iter()
            .any(|e| e.schema == schema && e.property == property)
    }
}

/// Runs detection over the (flattened) table and marks back-edge properties nullable.
///
/// Structure is never changed; only `ObjectSchema::nullable` grows.
pub fn detect_cycles(table: &mut SchemaTable) -> CycleReport {
    let back_edges = find_back_edges(table);

    for edge in &back_edges {
        if let Some(SchemaNode::Object(object)) = table.get_mut(&edge.schema) {
            object.nullable.insert(edge.property.clone());
        }
    }

    tracing::debug!(marked = back_edges.len(), "cycle detection finished");
    CycleReport { back_edges }
}

/// Computes the back-edges without touching the table.
pub fn find_back_edges(table: &SchemaTable) -> Vec<BackEdge> {
    let edges = followed_edges(table);

    let mut graph = DiGraphMap::<&str, ()>::new();
    for name in table.names() {
        graph.add_node(name);
    }
    for edge in &edges {
        graph.add_edge(edge.schema.as_str(), edge.target.as_str(), ());
    }

    let component: HashMap<&str, usize> = tarjan_scc(&graph)
        .into_iter()
        .enumerate()
        .flat_map(|(id, members)| members.into_iter().map(move |name| (name, id)))
        .collect();

    edges
        .iter()
        .filter(|edge| {
            let from = component.get(edge.schema.as_str());
            from.is_some() && from == component.get(edge.target.as_str())
        })
        .cloned()
        .collect()
}

/// Every followed `(schema, property) -> target` edge in table order.
fn followed_edges(table: &SchemaTable) -> Vec<BackEdge> {
    let resolver = Resolver::new(table);
    let mut edges = Vec::new();

    for (name, node) in table.iter() {
        let SchemaNode::Object(object) = node else {
            continue;
        };
        for (property, schema) in &object.properties {
            let Some(reference) = followed_reference(schema) else {
                continue;
            };
            // Dangling references are reported when the model is built.
            if let Some(target) = resolver.try_resolve(reference) {
                edges.push(BackEdge {
                    schema: name.to_string(),
                    property: property.clone(),
                    target: target.name.to_string(),
                });
            }
        }
    }
    edges
}

fn followed_reference(schema: &SchemaRef) -> Option<&str> {
    match schema {
        SchemaRef::Ref(r) => Some(r),
        SchemaRef::Inline(node) => match node.as_ref() {
            SchemaNode::Reference(r) => Some(r),
            SchemaNode::ArrayOf(items) => match items {
                SchemaRef::Ref(r) => Some(r),
                SchemaRef::Inline(inner) => match inner.as_ref() {
                    SchemaNode::Reference(r) => Some(r),
                    _ => None,
                },
            },
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CompositionKind, CompositionSchema, ObjectSchema, PrimitiveKind};
    use std::collections::BTreeSet;

    fn r(name: &str) -> SchemaRef {
        SchemaRef::reference(format!("#/components/schemas/{}", name))
    }

    fn array_of(name: &str) -> SchemaRef {
        SchemaRef::inline(SchemaNode::ArrayOf(r(name)))
    }

    fn object(props: Vec<(&str, SchemaRef)>) -> SchemaNode {
        let mut obj = ObjectSchema::default();
        for (name, schema) in props {
            obj = obj.with_property(name, schema, false);
        }
        SchemaNode::Object(obj)
    }

    fn nullable<'a>(table: &'a SchemaTable, name: &str) -> Vec<&'a str> {
        match table.get(name) {
            Some(SchemaNode::Object(o)) => o.nullable.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Depth-first walk from every schema carrying a fresh copy of the current
    /// path per branch. Exponential on deep diamonds; only used to cross-check.
    fn path_copy_marks(table: &SchemaTable) -> BTreeSet<(String, String)> {
        fn walk(
            table: &SchemaTable,
            name: &str,
            path: Vec<String>,
            marks: &mut BTreeSet<(String, String)>,
        ) {
            let resolver = Resolver::new(table);
            let Some(SchemaNode::Object(object)) = table.get(name) else {
                return;
            };
            for (property, schema) in &object.properties {
                let Some(target) = followed_reference(schema).and_then(|r| resolver.try_resolve(r))
                else {
                    continue;
                };
                if path.iter().any(|p| p == target.name) {
                    marks.insert((name.to_string(), property.clone()));
                    continue;
                }
                let mut next = path.clone();
                next.push(target.name.to_string());
                walk(table, target.name, next, marks);
            }
        }

        let mut marks = BTreeSet::new();
        for name in table.names() {
            walk(table, name, vec![name.to_string()], &mut marks);
        }
        marks
    }

    fn scc_marks(table: &SchemaTable) -> BTreeSet<(String, String)> {
        find_back_edges(table)
            .into_iter()
            .map(|e| (e.schema, e.property))
            .collect()
    }

    #[test]
    fn test_self_referencing_array() {
        let mut table = SchemaTable::new().with(
            "Node",
            object(vec![
                ("value", SchemaRef::primitive(PrimitiveKind::String)),
                ("children", array_of("Node")),
            ]),
        );

        let report = detect_cycles(&mut table);

        assert_eq!(nullable(&table, "Node"), vec!["children"]);
        assert!(report.is_marked("Node", "children"));
        assert!(!report.is_marked("Node", "value"));
    }

    #[test]
    fn test_mutual_recursion_marks_both_edges() {
        let mut table = SchemaTable::new()
            .with("A", object(vec![("b", r("B"))]))
            .with("B", object(vec![("a", r("A"))]));

        detect_cycles(&mut table);

        assert_eq!(nullable(&table, "A"), vec!["b"]);
        assert_eq!(nullable(&table, "B"), vec!["a"]);
    }

    #[test]
    fn test_diamond_not_flagged() {
        let mut table = SchemaTable::new()
            .with("Root", object(vec![("left", r("Left")), ("right", r("Right"))]))
            .with("Left", object(vec![("leaf", r("Leaf"))]))
            .with("Right", object(vec![("leaf", r("Leaf"))]))
            .with("Leaf", object(vec![("v", SchemaRef::primitive(PrimitiveKind::Integer))]));

        let report = detect_cycles(&mut table);

        assert!(report.back_edges.is_empty());
        for name in ["Root", "Left", "Right", "Leaf"] {
            assert!(nullable(&table, name).is_empty(), "{} flagged", name);
        }
    }

    #[test]
    fn test_untraversed_edges() {
        let inline_object = SchemaRef::inline(object(vec![("back", r("Holder"))]));
        let map_of_ref = SchemaRef::inline(SchemaNode::MapOf(r("Holder")));
        let choice = SchemaRef::inline(SchemaNode::Composition(CompositionSchema::new(
            CompositionKind::OneOf,
            vec![r("Holder")],
        )));
        let merged = SchemaRef::inline(SchemaNode::Composition(CompositionSchema::new(
            CompositionKind::AllOf,
            vec![r("Holder"), r("Holder")],
        )));
        let mut table = SchemaTable::new().with(
            "Holder",
            object(vec![
                ("inline", inline_object),
                ("map", map_of_ref),
                ("choice", choice),
                ("merged", merged),
            ]),
        );

        assert!(detect_cycles(&mut table).back_edges.is_empty());
        assert!(nullable(&table, "Holder").is_empty());
    }

    #[test]
    fn test_alias_target_is_canonicalized() {
        let mut table = SchemaTable::new()
            .with("Tree", object(vec![("kids", array_of("Forest"))]))
            .with("Forest", SchemaNode::Reference("#/components/schemas/Tree".into()));

        let report = detect_cycles(&mut table);

        assert_eq!(report.back_edges[0].target, "Tree");
        assert_eq!(nullable(&table, "Tree"), vec!["kids"]);
    }

    #[test]
    fn test_matches_path_copy_walk() {
        // A cycle through a diamond plus a tail that re-enters it.
        let table = SchemaTable::new()
            .with("A", object(vec![("b", r("B")), ("c", r("C"))]))
            .with("B", object(vec![("d", r("D"))]))
            .with("C", object(vec![("d", r("D")), ("e", array_of("E"))]))
            .with("D", object(vec![("a", r("A")), ("self_", r("D"))]))
            .with("E", object(vec![("c", r("C")), ("f", r("F"))]))
            .with("F", object(vec![("x", SchemaRef::primitive(PrimitiveKind::Boolean))]))
            .with("G", object(vec![("a", r("A"))]));

        let expected = path_copy_marks(&table);
        assert!(!expected.is_empty());
        assert_eq!(scc_marks(&table), expected);
        assert!(!expected.contains(&("G".to_string(), "a".to_string())));
        assert!(!expected.contains(&("E".to_string(), "f".to_string())));
    }
}
