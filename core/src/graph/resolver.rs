#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Resolves `$ref` strings against the [`SchemaTable`].
//!
//! Resolution never fails: a dangling or malformed reference resolves to the
//! [`UNKNOWN_SCHEMA`] sentinel and records a diagnostic. A reference without a
//! `/` separator is taken as a literal schema name.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::oas::ref_utils::decode_pointer_segment;
use crate::schema::{SchemaNode, SchemaRef, SchemaTable};
use std::collections::HashSet;

/// Name given to references that cannot be resolved.
pub const UNKNOWN_SCHEMA: &str = "UnknownSchema";

static UNKNOWN_NODE: SchemaNode = SchemaNode::Unknown;

/// Extracts the schema name from a reference.
///
/// `#/components/schemas/Pet` -> `Pet`; `Pet` -> `Pet`. Returns `None` when
/// the last pointer segment is empty.
pub fn ref_name(reference: &str) -> Option<String> {
    let raw = match reference.rsplit_once('/') {
        Some((_, last)) => last,
        None => reference.trim_start_matches('#'),
    };
    let name = decode_pointer_segment(raw);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// A named schema found in the table (or the sentinel).
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Canonical name after following aliases, or [`UNKNOWN_SCHEMA`].
    pub name: &'a str,
    /// The definition.
    pub node: &'a SchemaNode,
}

impl Resolved<'_> {
    /// True when this is the unresolvable sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self.node, SchemaNode::Unknown)
    }
}

/// What a [`SchemaRef`] points at.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A named table entry.
    Named(Resolved<'a>),
    /// An inline definition.
    Inline(&'a SchemaNode),
}

impl<'a> Target<'a> {
    /// The underlying node regardless of how it was reached.
    pub fn node(&self) -> &'a SchemaNode {
        match self {
            Target::Named(r) => r.node,
            Target::Inline(node) => node,
        }
    }
}

struct Failure<'a> {
    kind: DiagnosticKind,
    alias: Option<&'a str>,
    message: String,
}

/// Read-only resolver over one table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a SchemaTable,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver.
    pub fn new(table: &'a SchemaTable) -> Self {
        Self { table }
    }

    /// The table being resolved against.
    pub fn table(&self) -> &'a SchemaTable {
        self.table
    }

    /// Resolves a reference to its definition, following alias chains.
    ///
    /// `subject` names the schema being processed, for diagnostics.
    pub fn resolve(
        &self,
        reference: &str,
        subject: Option<&str>,
        diags: &mut Diagnostics,
    ) -> Resolved<'a> {
        match self.follow(reference) {
            Ok(resolved) => resolved,
            Err(failure) => {
                let subject = failure.alias.or(subject);
                match failure.kind {
                    DiagnosticKind::ReferenceLoop => {
                        diags.error(failure.kind, subject, failure.message)
                    }
                    kind => diags.warn(kind, subject, failure.message),
                }
                Self::unknown()
            }
        }
    }

    fn follow(&self, reference: &str) -> Result<Resolved<'a>, Failure<'a>> {
        let mut name = ref_name(reference).ok_or_else(|| Failure {
            kind: DiagnosticKind::DanglingReference,
            alias: None,
            message: format!("malformed reference '{}'", reference),
        })?;

        let mut seen = HashSet::new();
        loop {
            let (key, node) = self.lookup(&name).ok_or_else(|| Failure {
                kind: DiagnosticKind::DanglingReference,
                alias: None,
                message: format!("reference '{}' does not match any schema", reference),
            })?;
            if !seen.insert(key) {
                return Err(Failure {
                    kind: DiagnosticKind::ReferenceLoop,
                    alias: None,
                    message: format!("alias chain starting at '{}' loops on '{}'", reference, key),
                });
            }
            match node {
                SchemaNode::Reference(next) => {
                    name = ref_name(next).ok_or_else(|| Failure {
                        kind: DiagnosticKind::DanglingReference,
                        alias: Some(key),
                        message: format!("malformed reference '{}'", next),
                    })?;
                }
                _ => return Ok(Resolved { name: key, node }),
            }
        }
    }

    /// Resolves a [`SchemaRef`]: references through the table, inline nodes as-is.
    pub fn target<'s>(
        &self,
        schema: &'s SchemaRef,
        subject: Option<&str>,
        diags: &mut Diagnostics,
    ) -> Target<'s>
    where
        'a: 's,
    {
        match schema {
            SchemaRef::Ref(r) => Target::Named(self.resolve(r, subject, diags)),
            SchemaRef::Inline(node) => Target::Inline(node),
        }
    }

    /// Resolves a reference without recording diagnostics.
    pub fn try_resolve(&self, reference: &str) -> Option<Resolved<'a>> {
        self.follow(reference).ok()
    }

    fn lookup(&self, name: &str) -> Option<(&'a str, &'a SchemaNode)> {
        self.table.get_key_value(name)
    }

    fn unknown() -> Resolved<'a> {
        Resolved {
            name: UNKNOWN_SCHEMA,
            node: &UNKNOWN_NODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ObjectSchema, PrimitiveKind};

    fn table() -> SchemaTable {
        SchemaTable::new()
            .with("Pet", SchemaNode::Object(ObjectSchema::default()))
            .with("Animal", SchemaNode::Reference("#/components/schemas/Pet".into()))
            .with("LoopA", SchemaNode::Reference("LoopB".into()))
            .with("LoopB", SchemaNode::Reference("LoopA".into()))
    }

    #[test]
    fn test_ref_name_forms() {
        assert_eq!(ref_name("#/components/schemas/Pet").as_deref(), Some("Pet"));
        assert_eq!(ref_name("Pet").as_deref(), Some("Pet"));
        assert_eq!(ref_name("#/components/schemas/A~1B").as_deref(), Some("A/B"));
        assert_eq!(ref_name("#/components/schemas/"), None);
    }

    #[test]
    fn test_resolve_pointer_and_literal() {
        let table = table();
        let resolver = Resolver::new(&table);
        let mut diags = Diagnostics::new();

        let by_pointer = resolver.resolve("#/components/schemas/Pet", None, &mut diags);
        let by_name = resolver.resolve("Pet", None, &mut diags);
        assert_eq!(by_pointer.name, "Pet");
        assert_eq!(by_name.name, "Pet");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_alias_is_followed() {
        let table = table();
        let resolver = Resolver::new(&table);
        let mut diags = Diagnostics::new();
        let resolved = resolver.resolve("#/components/schemas/Animal", None, &mut diags);
        assert_eq!(resolved.name, "Pet");
        assert!(matches!(resolved.node, SchemaNode::Object(_)));
    }

    #[test]
    fn test_dangling_yields_sentinel() {
        let table = table();
        let resolver = Resolver::new(&table);
        let mut diags = Diagnostics::new();
        let resolved = resolver.resolve("#/components/schemas/Missing", Some("Owner"), &mut diags);
        assert!(resolved.is_unknown());
        assert_eq!(resolved.name, UNKNOWN_SCHEMA);
        assert_eq!(diags.of_kind(DiagnosticKind::DanglingReference).count(), 1);
        assert_eq!(diags.iter().next().unwrap().subject.as_deref(), Some("Owner"));
    }

    #[test]
    fn test_alias_loop_yields_sentinel() {
        let table = table();
        let resolver = Resolver::new(&table);
        let mut diags = Diagnostics::new();
        let resolved = resolver.resolve("LoopA", None, &mut diags);
        assert!(resolved.is_unknown());
        assert_eq!(diags.of_kind(DiagnosticKind::ReferenceLoop).count(), 1);
    }

    #[test]
    fn test_inline_target() {
        let table = table();
        let resolver = Resolver::new(&table);
        let mut diags = Diagnostics::new();
        let inline = SchemaRef::primitive(PrimitiveKind::String);
        assert!(matches!(
            resolver.target(&inline, None, &mut diags),
            Target::Inline(SchemaNode::Primitive(_))
        ));
    }
}
