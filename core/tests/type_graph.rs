use pretty_assertions::assert_eq;
use std::fs;
use typegraph_core::graph::{CompositionAlternative, DiscriminatorTarget};
use typegraph_core::naming::{
    enum_identifier, resolve_collisions, sanitize_package_name, ReservedWords,
};
use typegraph_core::schema::{PrimitiveKind, SchemaNode};
use typegraph_core::{
    DiagnosticKind, GeneratorConfig, ImportHint, PreparedSession, Session, TypeRef,
};

fn prepare(yaml: &str) -> PreparedSession {
    Session::load(yaml, GeneratorConfig::default())
        .expect("document should parse")
        .prepare()
}

fn schemas(body: &str) -> String {
    format!(
        "openapi: 3.1.0\ninfo: {{ title: Test, version: '1' }}\npaths: {{}}\ncomponents:\n  schemas:\n{}",
        body
    )
}

fn property_types(session: &mut PreparedSession, model: &str) -> Vec<(String, String, bool)> {
    session
        .model(model)
        .expect("model exists")
        .properties
        .into_iter()
        .map(|p| (p.name, p.type_ref.to_string(), p.required))
        .collect()
}

#[test]
fn test_all_of_merge() {
    let mut session = prepare(&schemas(
        r#"
    A:
      allOf:
        - type: object
          properties:
            x: { type: string }
        - $ref: '#/components/schemas/B'
    B:
      type: object
      required: [y]
      properties:
        y: { type: integer }
"#,
    ));

    assert_eq!(
        property_types(&mut session, "A"),
        vec![
            ("x".to_string(), "string".to_string(), false),
            ("y".to_string(), "integer".to_string(), true),
        ]
    );
    assert_eq!(session.flattened(), ["A".to_string()]);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_all_of_conflict_last_wins() {
    let mut session = prepare(&schemas(
        r#"
    A:
      allOf:
        - type: object
          properties:
            x: { type: string }
        - $ref: '#/components/schemas/B'
    B:
      type: object
      properties:
        x: { type: integer }
"#,
    ));

    assert_eq!(
        property_types(&mut session, "A"),
        vec![("x".to_string(), "integer".to_string(), false)]
    );
    let conflicts: Vec<_> = session
        .diagnostics()
        .of_kind(DiagnosticKind::PropertyConflict)
        .collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].subject.as_deref(), Some("A"));
}

#[test]
fn test_all_of_with_sum_type_member_becomes_property() {
    let mut session = prepare(&schemas(
        r#"
    PaymentMethod:
      oneOf:
        - $ref: '#/components/schemas/Card'
        - $ref: '#/components/schemas/Transfer'
    Card: { type: object, properties: { number: { type: string } } }
    Transfer: { type: object, properties: { iban: { type: string } } }
    Order:
      allOf:
        - type: object
          properties:
            id: { type: string }
        - $ref: '#/components/schemas/PaymentMethod'
"#,
    ));

    assert_eq!(
        property_types(&mut session, "Order"),
        vec![
            ("id".to_string(), "string".to_string(), false),
            ("paymentMethod".to_string(), "PaymentMethod".to_string(), true),
        ]
    );
    // Order is not an alternative of the sum type it contains.
    assert_eq!(session.registry().parent_of("Order"), None);
    assert_eq!(session.registry().parent_of("Card"), Some("PaymentMethod"));
}

#[test]
fn test_all_of_with_sibling_object_keywords() {
    let mut session = prepare(&schemas(
        r#"
    Pet:
      type: object
      required: [name]
      properties:
        name: { type: string }
    Dog:
      type: object
      allOf:
        - $ref: '#/components/schemas/Pet'
        - type: object
          properties:
            bark: { type: boolean }
    Cat:
      type: object
      allOf:
        - $ref: '#/components/schemas/Pet'
      required: [purr]
      properties:
        purr: { type: boolean }
"#,
    ));

    assert_eq!(
        property_types(&mut session, "Dog"),
        vec![
            ("name".to_string(), "string".to_string(), true),
            ("bark".to_string(), "boolean".to_string(), false),
        ]
    );
    assert_eq!(
        property_types(&mut session, "Cat"),
        vec![
            ("name".to_string(), "string".to_string(), true),
            ("purr".to_string(), "boolean".to_string(), true),
        ]
    );
    assert_eq!(session.flattened(), ["Dog".to_string(), "Cat".to_string()]);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_all_of_member_adding_only_required() {
    let mut session = prepare(&schemas(
        r#"
    Pet:
      type: object
      properties:
        name: { type: string }
        tag: { type: string }
    Dog:
      allOf:
        - $ref: '#/components/schemas/Pet'
        - required: [name]
    Cat:
      allOf:
        - $ref: '#/components/schemas/Pet'
        - type: object
          required: [tag]
"#,
    ));

    assert_eq!(
        property_types(&mut session, "Dog"),
        vec![
            ("name".to_string(), "string".to_string(), true),
            ("tag".to_string(), "string".to_string(), false),
        ]
    );
    assert_eq!(
        property_types(&mut session, "Cat"),
        vec![
            ("name".to_string(), "string".to_string(), false),
            ("tag".to_string(), "string".to_string(), true),
        ]
    );
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_nullable_all_of_with_sibling_type() {
    let mut session = prepare(&schemas(
        r#"
    Pet:
      type: object
      properties:
        name: { type: string }
    Owner:
      type: object
      properties:
        pet:
          type: [object, "null"]
          allOf:
            - $ref: '#/components/schemas/Pet'
"#,
    ));

    let owner = session.model("Owner").expect("model exists");
    assert_eq!(owner.properties.len(), 1);
    assert_eq!(owner.properties[0].type_ref.to_string(), "Pet");
    assert!(owner.properties[0].nullable);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_all_of_cycle_is_reported() {
    let mut session = prepare(&schemas(
        r#"
    A:
      allOf:
        - $ref: '#/components/schemas/B'
        - type: object
          properties:
            a: { type: string }
    B:
      allOf:
        - $ref: '#/components/schemas/A'
        - type: object
          properties:
            b: { type: string }
"#,
    ));

    assert!(session
        .table()
        .iter()
        .all(|(_, node)| !node.is_all_of()));
    assert_eq!(
        session.diagnostics().of_kind(DiagnosticKind::AllOfCycle).count(),
        1
    );
    let names: Vec<_> = session
        .model("A")
        .unwrap()
        .properties
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn test_cycle_marks_back_edge_only() {
    let mut session = prepare(&schemas(
        r#"
    Node:
      type: object
      required: [value, children]
      properties:
        value: { type: string }
        children:
          type: array
          items: { $ref: '#/components/schemas/Node' }
"#,
    ));

    let node = session.model("Node").unwrap();
    let children = &node.properties[1];
    assert_eq!(children.name, "children");
    assert!(children.nullable);
    assert_eq!(children.type_ref.to_string(), "list<Node>");
    assert!(!node.properties[0].nullable);
    assert!(session.cycles().is_marked("Node", "children"));
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let session = prepare(&schemas(
        r#"
    Root:
      type: object
      properties:
        left: { $ref: '#/components/schemas/Left' }
        right: { $ref: '#/components/schemas/Right' }
    Left:
      type: object
      properties:
        leaf: { $ref: '#/components/schemas/Leaf' }
    Right:
      type: object
      properties:
        leaves:
          type: array
          items: { $ref: '#/components/schemas/Leaf' }
    Leaf:
      type: object
      properties:
        name: { type: string }
"#,
    ));

    assert!(session.cycles().back_edges.is_empty());
}

#[test]
fn test_map_and_inline_edges_are_not_traversed() {
    let session = prepare(&schemas(
        r#"
    Tree:
      type: object
      properties:
        byName:
          type: object
          additionalProperties: { $ref: '#/components/schemas/Tree' }
        wrapper:
          type: object
          properties:
            inner: { $ref: '#/components/schemas/Tree' }
"#,
    ));

    assert!(session.cycles().back_edges.is_empty());
}

#[test]
fn test_one_of_primitive_alternatives() {
    let mut session = prepare(&schemas(
        r#"
    StringOrNumber:
      oneOf:
        - type: string
        - type: number
"#,
    ));

    let model = session.model("StringOrNumber").unwrap();
    assert!(model.is_composition);
    let composition = model.composition.unwrap();
    let summary: Vec<_> = composition
        .alternatives
        .iter()
        .map(|a| (a.alternative.clone(), a.has_next))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                CompositionAlternative::Primitive {
                    primitive_kind: PrimitiveKind::String,
                    wrapper_name: "StringOrNumberString".into(),
                },
                true
            ),
            (
                CompositionAlternative::Primitive {
                    primitive_kind: PrimitiveKind::Number,
                    wrapper_name: "StringOrNumberNumber".into(),
                },
                false
            ),
        ]
    );
    assert!(session.registry().is_empty());
}

const PETS: &str = r#"
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
      discriminator:
        propertyName: petType
        mapping:
          cat: '#/components/schemas/Cat'
          dog: '#/components/schemas/Dog'
    Cat:
      type: object
      properties:
        petType: { type: string }
        lives: { type: integer }
    Dog:
      type: object
      properties:
        petType: { type: string }
"#;

#[test]
fn test_one_of_with_discriminator() {
    let mut session = prepare(&schemas(PETS));

    let pet = session.model("Pet").unwrap();
    let discriminator = pet.composition.unwrap().discriminator.unwrap();
    assert_eq!(discriminator.property_name, "petType");
    assert_eq!(
        discriminator.mappings,
        vec![
            DiscriminatorTarget {
                wire_value: "cat".into(),
                schema_name: "Cat".into(),
                class_name: "Cat".into(),
            },
            DiscriminatorTarget {
                wire_value: "dog".into(),
                schema_name: "Dog".into(),
                class_name: "Dog".into(),
            },
        ]
    );
    assert_eq!(session.registry().parent_of("Cat"), Some("Pet"));
    assert_eq!(session.registry().parent_of("Dog"), Some("Pet"));
    assert_eq!(
        session.model("Cat").unwrap().parent_type_name.as_deref(),
        Some("Pet")
    );
}

#[test]
fn test_any_of_never_has_discriminator() {
    let mut session = prepare(&schemas(&PETS.replace("oneOf", "anyOf")));

    let pet = session.model("Pet").unwrap();
    let composition = pet.composition.unwrap();
    assert_eq!(composition.alternatives.len(), 2);
    assert_eq!(composition.discriminator, None);
    assert_eq!(session.registry().parent_of("Cat"), Some("Pet"));
}

#[test]
fn test_blank_discriminator_property_is_ignored() {
    let mut session = prepare(&schemas(&PETS.replace("propertyName: petType", "propertyName: ''")));
    assert_eq!(
        session.model("Pet").unwrap().composition.unwrap().discriminator,
        None
    );
}

#[test]
fn test_unrecognized_alternative_is_dropped() {
    let mut session = prepare(&schemas(
        r#"
    Mixed:
      oneOf:
        - $ref: '#/components/schemas/Known'
        - description: nothing to go on
        - type: object
          properties:
            code: { type: integer }
    Known: { type: object }
"#,
    ));

    let composition = session.model("Mixed").unwrap().composition.unwrap();
    let names: Vec<_> = composition
        .alternatives
        .iter()
        .map(|a| a.alternative.type_name().to_string())
        .collect();
    assert_eq!(names, vec!["Known", "MixedOption3"]);
    assert_eq!(
        session
            .diagnostics()
            .of_kind(DiagnosticKind::AlternativeDropped)
            .count(),
        1
    );
}

#[test]
fn test_enum_identifiers() {
    let reserved = ReservedWords::default();
    let cases = [
        ("123", "value123"),
        ("-123", "value123"),
        ("123.45", "value12345"),
        ("", "empty"),
        ("class", "class_"),
        ("user-active", "userActive"),
    ];
    for (literal, expected) in cases {
        assert_eq!(enum_identifier(literal, &reserved), expected, "literal {:?}", literal);
    }
}

#[test]
fn test_enum_model_collisions() {
    let mut session = prepare(&schemas(
        r#"
    Status:
      type: string
      enum: [active, ACTIVE, Active]
"#,
    ));

    let model = session.model("Status").unwrap();
    assert!(model.is_enum);
    let identifiers: Vec<_> = model
        .enum_variables
        .into_iter()
        .map(|v| v.identifier)
        .collect();
    assert_eq!(identifiers, vec!["active", "active2", "active3"]);
    assert_eq!(
        resolve_collisions(["a", "b", "a", "a"]),
        vec!["a", "b", "a2", "a3"]
    );
}

#[test]
fn test_package_names() {
    assert_eq!(sanitize_package_name(Some("My-API@2.0_Client!")), "my_api20_client");
    assert_eq!(sanitize_package_name(None), "openapi_client");
    assert_eq!(sanitize_package_name(Some("")), "openapi_client");
    assert_eq!(sanitize_package_name(Some("123api")), "api_123api");
}

const UPLOADS: &str = r#"
openapi: 3.0.3
info: { title: Files, version: '1' }
paths:
  /files:
    post:
      operationId: uploadFile
      requestBody:
        required: true
        content:
          multipart/form-data:
            schema: { $ref: '#/components/schemas/Upload' }
    put:
      operationId: replaceFile
      requestBody:
        content:
          application/x-www-form-urlencoded:
            schema: { $ref: '#/components/schemas/Upload' }
  /raw:
    post:
      operationId: uploadRaw
      requestBody:
        content:
          application/octet-stream:
            schema: { type: string, format: binary }
components:
  schemas:
    Upload:
      type: object
      required: [file]
      properties:
        file: { type: string, format: binary }
        attachments:
          type: array
          items: { type: string, format: binary }
        note: { type: string, nullable: true }
"#;

#[test]
fn test_multipart_context_is_scoped_to_one_body() {
    let mut session = prepare(UPLOADS);
    let operations = session.operations();
    let ids: Vec<_> = operations.iter().map(|o| o.operation_id.as_str()).collect();
    assert_eq!(ids, vec!["replaceFile", "uploadFile", "uploadRaw"]);

    let multipart = operations[1].body.as_ref().unwrap();
    let field_types: Vec<_> = multipart
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.type_ref.to_string()))
        .collect();
    assert_eq!(
        field_types,
        vec![
            ("file", "file".to_string()),
            ("attachments", "list<file>".to_string()),
            ("note", "string".to_string()),
        ]
    );
    assert!(multipart.fields[0].required);
    assert!(multipart.fields[2].nullable);
    assert!(operations[1].imports.contains(&ImportHint::FileAttachment));

    // The same schema outside the multipart body.
    let form = operations[0].body.as_ref().unwrap();
    assert_eq!(form.fields[0].type_ref, TypeRef::ByteBuffer);
    let raw = operations[2].body.as_ref().unwrap();
    assert_eq!(raw.type_ref, TypeRef::ByteBuffer);
    assert!(raw.fields.is_empty());

    let upload = session.model("Upload").unwrap();
    assert_eq!(upload.properties[0].type_ref, TypeRef::ByteBuffer);
    assert_eq!(upload.imports, vec![ImportHint::ByteBuffer]);
}

#[test]
fn test_dangling_reference_degrades() {
    let mut session = prepare(&schemas(
        r#"
    Owner:
      type: object
      properties:
        pet: { $ref: '#/components/schemas/Missing' }
        name: { type: string }
"#,
    ));

    let owner = session.model("Owner").unwrap();
    assert_eq!(owner.properties[0].type_ref, TypeRef::Unknown);
    assert_eq!(owner.properties[0].type_ref.to_string(), "UnknownSchema");
    assert_eq!(owner.properties[1].type_ref.to_string(), "string");
    assert_eq!(
        session
            .diagnostics()
            .of_kind(DiagnosticKind::DanglingReference)
            .count(),
        1
    );
}

#[test]
fn test_swagger_document() {
    let yaml = r#"
swagger: '2.0'
info: { title: Legacy, version: '1' }
paths:
  /avatar:
    post:
      operationId: setAvatar
      consumes: [multipart/form-data]
      parameters:
        - { name: image, in: formData, type: file, required: true }
        - { name: X-Trace, in: header, type: string }
definitions:
  Category:
    type: object
    properties:
      parent: { $ref: '#/definitions/Category' }
"#;
    let mut session = prepare(yaml);
    assert!(session.cycles().is_marked("Category", "parent"));

    let operations = session.operations();
    let op = &operations[0];
    assert_eq!(op.parameters.len(), 1);
    assert_eq!(op.parameters[0].identifier, "xTrace");
    let body = op.body.as_ref().unwrap();
    assert_eq!(body.fields[0].type_ref, TypeRef::FileAttachment);
}

#[test]
fn test_config_file_shapes_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typegraph.yaml");
    fs::write(
        &path,
        "packageName: Pet Store!\nreservedWords: [record]\nreservedModelSuffix: Type\n",
    )
    .unwrap();
    let config = GeneratorConfig::from_path(&path).unwrap();

    let mut session = Session::load(
        &schemas("    Record: { type: object }\n    class: { type: object }\n"),
        config,
    )
    .unwrap()
    .prepare();

    assert_eq!(session.package_name(), "pet_store");
    let names: Vec<_> = session
        .models()
        .into_iter()
        .map(|m| (m.class_name, m.file_name))
        .collect();
    assert_eq!(
        names,
        vec![
            ("RecordType".to_string(), "record_type".to_string()),
            ("ClassType".to_string(), "class_type".to_string()),
        ]
    );
}

#[test]
fn test_named_scalars_and_aliases() {
    let mut session = prepare(&schemas(
        r#"
    Timestamp: { type: string, format: date-time }
    Event:
      type: object
      properties:
        at: { $ref: '#/components/schemas/Timestamp' }
        tags:
          type: object
          additionalProperties: { type: string }
    AliasEvent: { $ref: '#/components/schemas/Event' }
"#,
    ));

    assert_eq!(
        property_types(&mut session, "Event"),
        vec![
            ("at".to_string(), "string(date-time)".to_string(), false),
            ("tags".to_string(), "map<string>".to_string(), false),
        ]
    );
    assert!(matches!(
        session.table().get("AliasEvent"),
        Some(SchemaNode::Reference(_))
    ));
    let alias = session.model("AliasEvent").unwrap();
    assert_eq!(alias.value_type.map(|t| t.to_string()).as_deref(), Some("Event"));
}
