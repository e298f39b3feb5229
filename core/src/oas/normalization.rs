#![deny(missing_docs)]

//! # Document Normalization
//!
//! Rewrites the raw JSON document into the shape the typed shims expect:
//!
//! - boolean schemas (`true` / `false`) become object schemas,
//! - `nullable` / `x-nullable` become a `null` member of `type`,
//! - `const` becomes a single-value `enum`,
//! - OAS 3.1 binary spellings (`contentEncoding`, `contentMediaType`) become `format: binary`.
//!
//! [`normalize_schema_shape`] runs later, per schema, right before `utoipa`
//! deserialization.
//!
//! Only schema positions are touched; example payloads are left alone.

use serde_json::{json, Map, Value};

/// Keys whose values are instance data, not schemas.
const DATA_KEYS: &[&str] = &["example", "examples", "default", "enum", "const"];

/// Keys holding a single subschema.
const SCHEMA_KEYS: &[&str] = &[
    "items",
    "not",
    "contains",
    "propertyNames",
    "if",
    "then",
    "else",
    "additionalProperties",
    "unevaluatedProperties",
    "unevaluatedItems",
];

/// Keys holding a list of subschemas.
const SCHEMA_LIST_KEYS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// Keys holding a map of subschemas.
const SCHEMA_MAP_KEYS: &[&str] = &["properties", "patternProperties", "dependentSchemas"];

/// Applies every normalization to a whole document.
pub(crate) fn normalize_document(value: &mut Value) {
    normalize_boolean_schemas(value);
    normalize_nullable_schemas(value);
    normalize_const_schemas(value);
    normalize_binary_spellings(value);
}

/// Replaces boolean schemas with equivalent objects.
///
/// - `true` becomes `{}` (accepts any instance)
/// - `false` becomes `{not: {}}` (accepts nothing)
///
/// `additionalProperties: false` and friends keep their boolean meaning.
pub(crate) fn normalize_boolean_schemas(value: &mut Value) {
    if let Some(schemas) = value
        .get_mut("components")
        .and_then(|c| c.get_mut("schemas"))
        .and_then(Value::as_object_mut)
    {
        schemas.values_mut().for_each(|s| normalize_schema_node(s, true));
    }
    if let Some(definitions) = value.get_mut("definitions").and_then(Value::as_object_mut) {
        definitions.values_mut().for_each(|s| normalize_schema_node(s, true));
    }
    normalize_schema_fields(value);
}

fn normalize_schema_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                match key.as_str() {
                    "schema" | "itemSchema" | "contentSchema" => normalize_schema_node(v, true),
                    _ => normalize_schema_fields(v),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_schema_fields),
        _ => {}
    }
}

fn normalize_schema_node(value: &mut Value, replace_bool: bool) {
    match value {
        Value::Bool(flag) if replace_bool => *value = bool_schema_replacement(*flag),
        Value::Object(map) => {
            for key in SCHEMA_KEYS {
                if let Some(sub) = map.get_mut(*key) {
                    // Boolean `additionalProperties` etc. are keyword values, not schemas.
                    normalize_schema_node(sub, *key == "items" || *key == "not");
                }
            }
            for key in SCHEMA_LIST_KEYS {
                if let Some(list) = map.get_mut(*key).and_then(Value::as_array_mut) {
                    list.iter_mut().for_each(|v| normalize_schema_node(v, true));
                }
            }
            for key in SCHEMA_MAP_KEYS {
                if let Some(props) = map.get_mut(*key).and_then(Value::as_object_mut) {
                    props.values_mut().for_each(|v| normalize_schema_node(v, true));
                }
            }
        }
        _ => {}
    }
}

fn bool_schema_replacement(flag: bool) -> Value {
    if flag {
        Value::Object(Map::new())
    } else {
        json!({ "not": {} })
    }
}

/// Rewrites `nullable` / `x-nullable` into a `type` union.
///
/// A schema without `type` (e.g. a `$ref` with `nullable`) is wrapped as
/// `anyOf: [<schema>, {type: null}]`; the converter unwraps that again.
pub(crate) fn normalize_nullable_schemas(value: &mut Value) {
    if let Value::Object(map) = value {
        if let Some(replacement) = apply_nullable_flag(map) {
            *value = replacement;
        }
    }

    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if !DATA_KEYS.contains(&key.as_str()) {
                    normalize_nullable_schemas(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_nullable_schemas),
        _ => {}
    }
}

fn apply_nullable_flag(map: &mut Map<String, Value>) -> Option<Value> {
    let mut nullable = false;
    for key in ["nullable", "x-nullable"] {
        // A property *named* `nullable` holds a schema, not a flag.
        if let Some(flag) = map.get(key).and_then(Value::as_bool) {
            nullable |= flag;
            map.remove(key);
        }
    }
    if !nullable {
        return None;
    }

    let has_type = matches!(map.get("type"), Some(Value::String(_) | Value::Array(_)));
    if !has_type {
        let original = Value::Object(std::mem::take(map));
        return Some(json!({ "anyOf": [original, { "type": "null" }] }));
    }

    if let Some(ty) = map.get_mut("type") {
        match ty {
            Value::Array(arr) => {
                if !arr.iter().any(|v| v.as_str() == Some("null")) {
                    arr.push(Value::String("null".into()));
                }
            }
            _ if ty.as_str() != Some("null") => {
                let single = ty.take();
                *ty = json!([single, "null"]);
            }
            _ => {}
        }
    }
    None
}

/// Rewrites `const: X` into `enum: [X]`, inferring `type` when absent.
pub(crate) fn normalize_const_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(const_val) = map.remove("const") {
                if !map.contains_key("type") {
                    if let Some(type_name) = infer_schema_type(&const_val) {
                        map.insert("type".into(), Value::String(type_name.into()));
                    }
                }
                map.entry("enum")
                    .or_insert_with(|| Value::Array(vec![const_val]));
            }
            for (key, v) in map.iter_mut() {
                if !DATA_KEYS.contains(&key.as_str()) {
                    normalize_const_schemas(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_const_schemas),
        _ => {}
    }
}

fn infer_schema_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(num) if num.is_i64() || num.is_u64() => Some("integer"),
        Value::Number(_) => Some("number"),
        Value::Array(_) => Some("array"),
        Value::Object(_) => Some("object"),
        Value::Null => None,
    }
}

/// Keywords that make a schema a composition.
const COMPOSITION_KEYS: &[&str] = &["allOf", "oneOf", "anyOf"];

/// Keywords that only make sense on an object.
const OBJECT_KEYS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
];

/// Extension key holding the `title` of an `anyOf` schema, which `utoipa`'s
/// `AnyOf` has no field for.
pub(crate) const ANY_OF_TITLE: &str = "x-typegraph-title";

/// Rewrites one schema (and its subschemas) into a shape `utoipa`'s untagged
/// `Schema` reads as intended.
///
/// - A composition keyword wins over a sibling `type`. The `type` is dropped;
///   a `null` member of it becomes an `anyOf` wrapper with a `null` alternative.
/// - Sibling `properties` / `required` / `additionalProperties` of an `allOf`
///   move into one extra inline object member.
/// - A schema without `type`, `$ref` or composition gets a `type` inferred from
///   its keywords, or a JSON `null` type (read as typeless) when nothing fits.
pub(crate) fn normalize_schema_shape(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    for key in SCHEMA_KEYS {
        if let Some(sub) = map.get_mut(*key) {
            normalize_schema_shape(sub);
        }
    }
    for key in SCHEMA_LIST_KEYS {
        if let Some(list) = map.get_mut(*key).and_then(Value::as_array_mut) {
            list.iter_mut().for_each(normalize_schema_shape);
        }
    }
    for key in SCHEMA_MAP_KEYS {
        if let Some(props) = map.get_mut(*key).and_then(Value::as_object_mut) {
            props.values_mut().for_each(normalize_schema_shape);
        }
    }

    if map.contains_key("$ref") {
        return;
    }
    match COMPOSITION_KEYS.iter().find(|key| map.contains_key(**key)) {
        Some(keyword) => {
            if let Some(wrapped) = shape_composition(map, keyword) {
                *value = wrapped;
            }
        }
        None if !map.contains_key("type") => {
            let inferred = infer_missing_type(map);
            map.insert("type".into(), inferred);
        }
        None => {}
    }
}

fn shape_composition(map: &mut Map<String, Value>, keyword: &str) -> Option<Value> {
    let nullable = match map.remove("type") {
        Some(Value::String(ty)) => ty == "null",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("null")),
        _ => false,
    };

    if keyword == "allOf" {
        let mut own = Map::new();
        for key in OBJECT_KEYS {
            if let Some(v) = map.remove(*key) {
                own.insert((*key).to_string(), v);
            }
        }
        if !own.is_empty() {
            own.insert("type".into(), Value::String("object".into()));
            if let Some(members) = map.get_mut("allOf").and_then(Value::as_array_mut) {
                members.push(Value::Object(own));
            }
        }
    } else if keyword == "anyOf" {
        if let Some(title) = map.remove("title") {
            map.insert(ANY_OF_TITLE.into(), title);
        }
    }

    nullable.then(|| {
        let schema = Value::Object(std::mem::take(map));
        json!({ "anyOf": [schema, { "type": "null" }] })
    })
}

fn infer_missing_type(map: &Map<String, Value>) -> Value {
    if OBJECT_KEYS.iter().any(|key| map.contains_key(*key)) {
        return Value::String("object".into());
    }
    if map.contains_key("items") || map.contains_key("prefixItems") {
        return Value::String("array".into());
    }
    map.get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.iter().find(|v| !v.is_null()))
        .and_then(|literal| match literal {
            Value::Array(_) | Value::Object(_) => None,
            scalar => infer_schema_type(scalar),
        })
        .map_or(Value::Null, |ty| Value::String(ty.into()))
}

/// Marks OAS 3.1 style binary strings with `format: binary`.
pub(crate) fn normalize_binary_spellings(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if spells_binary(map) {
                map.insert("format".into(), Value::String("binary".into()));
                if !map.contains_key("type") {
                    map.insert("type".into(), Value::String("string".into()));
                }
            }
            for (key, v) in map.iter_mut() {
                if !DATA_KEYS.contains(&key.as_str()) {
                    normalize_binary_spellings(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_binary_spellings),
        _ => {}
    }
}

fn spells_binary(map: &Map<String, Value>) -> bool {
    if map.contains_key("format") {
        return false;
    }
    let string_typed = match map.get("type") {
        None => true,
        Some(Value::String(s)) => s == "string",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("string")),
        Some(_) => false,
    };
    if !string_typed {
        return false;
    }
    if let Some(encoding) = map.get("contentEncoding").and_then(Value::as_str) {
        return encoding == "base64";
    }
    map.get("contentMediaType")
        .and_then(Value::as_str)
        .is_some_and(is_binary_media_type)
}

/// Media types whose payload is opaque bytes.
pub(crate) fn is_binary_media_type(media: &str) -> bool {
    let media = media.split(';').next().unwrap_or(media).trim();
    media == "application/octet-stream"
        || media == "application/pdf"
        || media.starts_with("image/")
        || media.starts_with("audio/")
        || media.starts_with("video/")
}
