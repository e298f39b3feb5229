#![deny(missing_docs)]

//! # Generation Session
//!
//! Owns one document's schema table and drives the whole-table passes in a
//! fixed order:
//!
//! 1. `allOf` flattening,
//! 2. cycle detection over the flattened table,
//! 3. sealed-type discovery over every `oneOf` / `anyOf`.
//!
//! [`Session::prepare`] consumes the session and returns a [`PreparedSession`];
//! models and operations can only be finalized from the prepared state, so a
//! model never observes a partially populated sealed registry.
//!
//! Sessions are independent: concurrent documents each get their own.

use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{AppError, AppResult};
use crate::graph::cycles::{detect_cycles, BackEdge, CycleReport};
use crate::graph::flatten::flatten_all_of;
use crate::graph::sealed::{discover, Discovery, SealedRegistry};
use crate::metadata::{MetadataBuilder, ModelMetadata, OperationMetadata};
use crate::naming::ModelNamer;
use crate::oas::{parse_document, OperationDescriptor, ParsedDocument};
use crate::schema::SchemaTable;
use serde::Serialize;

/// A loaded document waiting for the whole-table passes.
#[derive(Debug, Clone)]
pub struct Session {
    table: SchemaTable,
    operations: Vec<OperationDescriptor>,
    title: Option<String>,
    config: GeneratorConfig,
    diagnostics: Diagnostics,
}

impl Session {
    /// Starts a session from a parsed document. Loader diagnostics are kept.
    pub fn new(document: ParsedDocument, config: GeneratorConfig) -> Self {
        Self {
            table: document.table,
            operations: document.operations,
            title: document.title,
            config,
            diagnostics: document.diagnostics,
        }
    }

    /// Starts a session from a bare schema table (no operations).
    pub fn from_table(table: SchemaTable, config: GeneratorConfig) -> Self {
        Self {
            table,
            operations: Vec::new(),
            title: None,
            config,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Parses document text and starts a session.
    ///
    /// # Errors
    ///
    /// Fails only when the document itself cannot be parsed.
    pub fn load(content: &str, config: GeneratorConfig) -> AppResult<Self> {
        Ok(Self::new(parse_document(content)?, config))
    }

    /// Runs flattening, cycle detection and sealed-type discovery.
    pub fn prepare(self) -> PreparedSession {
        let Session {
            mut table,
            operations,
            title,
            config,
            mut diagnostics,
        } = self;

        let namer = ModelNamer::new(config.reserved(), config.reserved_model_suffix.clone());

        let flattened = flatten_all_of(&mut table, &mut diagnostics);
        let cycles = detect_cycles(&mut table);
        let discovery = discover(&table, &namer, &mut diagnostics);

        tracing::info!(
            schemas = table.len(),
            flattened = flattened.len(),
            back_edges = cycles.back_edges.len(),
            compositions = discovery.compositions.len(),
            "session prepared"
        );

        PreparedSession {
            table,
            operations,
            title,
            config,
            namer,
            flattened,
            cycles,
            discovery,
            diagnostics,
        }
    }
}

/// A session after the whole-table passes. Finalizes metadata on demand.
#[derive(Debug, Clone)]
pub struct PreparedSession {
    table: SchemaTable,
    operations: Vec<OperationDescriptor>,
    title: Option<String>,
    config: GeneratorConfig,
    namer: ModelNamer,
    flattened: Vec<String>,
    cycles: CycleReport,
    discovery: Discovery,
    diagnostics: Diagnostics,
}

impl PreparedSession {
    /// Finalizes one model. `None` if no schema has that name.
    pub fn model(&mut self, name: &str) -> Option<ModelMetadata> {
        MetadataBuilder::new(&self.table, &self.namer, &self.discovery)
            .model(name, &mut self.diagnostics)
    }

    /// Finalizes every model, in table order.
    pub fn models(&mut self) -> Vec<ModelMetadata> {
        MetadataBuilder::new(&self.table, &self.namer, &self.discovery)
            .models(&mut self.diagnostics)
    }

    /// Finalizes every operation, in document order.
    pub fn operations(&mut self) -> Vec<OperationMetadata> {
        let builder = MetadataBuilder::new(&self.table, &self.namer, &self.discovery);
        self.operations
            .iter()
            .map(|op| builder.operation(op, &mut self.diagnostics))
            .collect()
    }

    /// Everything recorded so far, loader diagnostics first.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Child-to-parent links of every sum type.
    pub fn registry(&self) -> &SealedRegistry {
        &self.discovery.registry
    }

    /// Sum-type discovery results.
    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// The flattened, cycle-marked table.
    pub fn table(&self) -> &SchemaTable {
        &self.table
    }

    /// Names of the schemas that were `allOf` compositions.
    pub fn flattened(&self) -> &[String] {
        &self.flattened
    }

    /// Property edges marked nullable by cycle detection.
    pub fn cycles(&self) -> &CycleReport {
        &self.cycles
    }

    /// `info.title`, if the document had one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The sanitized package name.
    pub fn package_name(&self) -> String {
        self.config.resolved_package_name()
    }

    /// Fails in strict mode when any error diagnostic was recorded.
    ///
    /// # Errors
    ///
    /// [`AppError::General`] naming the number of error diagnostics.
    pub fn ensure_clean(&self) -> AppResult<()> {
        if !self.config.strict || !self.diagnostics.has_errors() {
            return Ok(());
        }
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        Err(AppError::General(format!(
            "strict mode: {} error diagnostic(s) recorded",
            errors
        )))
    }

    /// Finalizes everything into one serializable graph.
    pub fn graph(&mut self) -> TypeGraph {
        let models = self.models();
        let operations = self.operations();
        TypeGraph {
            package_name: self.package_name(),
            title: self.title.clone(),
            models,
            operations,
            sealed: self.discovery.registry.clone(),
            back_edges: self.cycles.back_edges.clone(),
            flattened: self.flattened.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// The complete annotated type graph of one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeGraph {
    /// Sanitized package name.
    pub package_name: String,
    /// Document title.
    pub title: Option<String>,
    /// Every model, in table order.
    pub models: Vec<ModelMetadata>,
    /// Every operation, in document order.
    pub operations: Vec<OperationMetadata>,
    /// Child-to-parent links.
    pub sealed: SealedRegistry,
    /// Properties marked nullable by cycle detection.
    pub back_edges: Vec<BackEdge>,
    /// Schemas flattened from `allOf`.
    pub flattened: Vec<String>,
    /// Everything recorded while loading and finalizing.
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        CompositionKind, CompositionSchema, ObjectSchema, PrimitiveKind, PrimitiveSchema,
        SchemaNode, SchemaRef,
    };

    fn r(name: &str) -> SchemaRef {
        SchemaRef::reference(format!("#/components/schemas/{}", name))
    }

    #[test]
    fn test_prepare_runs_passes_in_order() {
        // Child's allOf adds the back-reference that closes the cycle, so the
        // cycle is only visible after flattening.
        let table = SchemaTable::new()
            .with(
                "Base",
                SchemaNode::Object(
                    ObjectSchema::default().with_property("parent", r("Child"), false),
                ),
            )
            .with(
                "Child",
                SchemaNode::Composition(CompositionSchema::new(
                    CompositionKind::AllOf,
                    vec![r("Base")],
                )),
            );

        let prepared = Session::from_table(table, GeneratorConfig::default()).prepare();
        assert_eq!(prepared.flattened(), ["Child".to_string()]);
        assert!(prepared.cycles().is_marked("Child", "parent"));
        assert!(!prepared.table().get("Child").is_some_and(SchemaNode::is_all_of));
    }

    #[test]
    fn test_strict_mode_fails_on_errors() {
        let looped = SchemaTable::new()
            .with(
                "A",
                SchemaNode::Composition(CompositionSchema::new(
                    CompositionKind::AllOf,
                    vec![r("B")],
                )),
            )
            .with(
                "B",
                SchemaNode::Composition(CompositionSchema::new(
                    CompositionKind::AllOf,
                    vec![r("A")],
                )),
            );

        let lenient = Session::from_table(looped.clone(), GeneratorConfig::default()).prepare();
        assert!(lenient.diagnostics().has_errors());
        assert!(lenient.ensure_clean().is_ok());

        let config = GeneratorConfig {
            strict: true,
            ..GeneratorConfig::default()
        };
        let strict = Session::from_table(looped, config).prepare();
        assert!(matches!(strict.ensure_clean(), Err(AppError::General(_))));
    }

    #[test]
    fn test_reserved_model_suffix_from_config() {
        let table = SchemaTable::new()
            .with("class", SchemaNode::Object(ObjectSchema::default()))
            .with("Record", SchemaNode::Primitive(PrimitiveSchema::new(PrimitiveKind::String)));
        let config = GeneratorConfig {
            reserved_words: vec!["record".into()],
            reserved_model_suffix: "Type".into(),
            package_name: Some("Pet Store".into()),
            ..GeneratorConfig::default()
        };
        let mut prepared = Session::from_table(table, config).prepare();

        assert_eq!(prepared.model("class").unwrap().class_name, "ClassType");
        assert_eq!(prepared.model("Record").unwrap().class_name, "RecordType");
        assert_eq!(prepared.package_name(), "pet_store");
    }

    #[test]
    fn test_repeated_finalization_is_stable() {
        let table = SchemaTable::new().with(
            "Owner",
            SchemaNode::Object(ObjectSchema::default().with_property("pet", r("Missing"), true)),
        );
        let mut prepared = Session::from_table(table, GeneratorConfig::default()).prepare();
        let first = prepared.models();
        let second = prepared.models();
        assert_eq!(first, second);
        assert_eq!(prepared.diagnostics().len(), 1);
    }

    #[test]
    fn test_graph_serializes_camel_case() {
        let yaml = r#"
openapi: 3.0.3
info: { title: Shapes, version: "1" }
paths: {}
components:
  schemas:
    Shape:
      oneOf:
        - $ref: '#/components/schemas/Circle'
    Circle:
      type: object
      properties:
        radius: { type: number }
"#;
        let mut prepared = Session::load(yaml, GeneratorConfig::default())
            .unwrap()
            .prepare();
        let value = serde_json::to_value(prepared.graph()).unwrap();
        assert_eq!(value["packageName"], "openapi_client");
        assert_eq!(value["title"], "Shapes");
        assert_eq!(value["sealed"]["Circle"], "Shape");
        assert_eq!(value["models"][0]["isComposition"], true);
        assert_eq!(value["models"][1]["parentTypeName"], "Shape");
    }
}
