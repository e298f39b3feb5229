#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Pure helpers for deriving generated identifiers from schema names and
//! literals: package names, model (class) names, file names, property
//! identifiers, enum identifiers, and per-collection collision resolution.

use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Package name used when sanitizing leaves nothing behind.
pub const DEFAULT_PACKAGE_NAME: &str = "openapi_client";

/// Suffix appended to model names that collide with a reserved word.
pub const DEFAULT_RESERVED_MODEL_SUFFIX: &str = "Model";

/// Keywords that cannot be used verbatim as generated identifiers.
pub const DEFAULT_RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "assert", "async", "await", "break", "case", "catch", "class", "const",
    "continue", "covariant", "default", "deferred", "do", "dynamic", "else", "enum", "export",
    "extends", "extension", "external", "factory", "false", "final", "finally", "for",
    "Function", "get", "hide", "if", "implements", "import", "in", "interface", "is", "late",
    "library", "mixin", "new", "null", "on", "operator", "part", "required", "rethrow",
    "return", "set", "show", "static", "super", "switch", "sync", "this", "throw", "true", "try",
    "typedef", "var", "void", "while", "with", "yield",
];

/// Set of reserved words consulted by the identifier helpers.
#[derive(Debug, Clone)]
pub struct ReservedWords {
    words: HashSet<String>,
    lowercase: HashSet<String>,
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_WORDS.iter().copied())
    }
}

impl ReservedWords {
    /// Builds a set from an explicit word list.
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self {
            words: HashSet::new(),
            lowercase: HashSet::new(),
        };
        set.extend(words);
        set
    }

    /// Adds more words.
    pub fn extend<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for w in words {
            self.words.insert(w.to_string());
            self.lowercase.insert(w.to_lowercase());
        }
    }

    /// Exact match.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Case-insensitive match.
    pub fn contains_ignore_case(&self, word: &str) -> bool {
        self.lowercase.contains(&word.to_lowercase())
    }
}

fn numeric_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-+]?\d+(\.\d+)?$").expect("Invalid regex"))
}

fn separators_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-_./\s]+").expect("Invalid regex"))
}

fn package_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ -]").expect("Invalid regex"))
}

fn package_invalid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_]").expect("Invalid regex"))
}

fn repeated_underscore_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("Invalid regex"))
}

/// Sanitizes a package name to `[a-z0-9_]`, never empty, never digit-leading.
///
/// `"My-API@2.0_Client!"` -> `my_api20_client`, `"123api"` -> `api_123api`,
/// `None` / `""` -> [`DEFAULT_PACKAGE_NAME`].
pub fn sanitize_package_name(name: Option<&str>) -> String {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return DEFAULT_PACKAGE_NAME.to_string();
    };

    let lowered = name.to_lowercase();
    let spaced = package_space_re().replace_all(&lowered, "_");
    let stripped = package_invalid_re().replace_all(&spaced, "");
    let collapsed = repeated_underscore_re().replace_all(&stripped, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        return DEFAULT_PACKAGE_NAME.to_string();
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("api_{}", trimmed);
    }
    trimmed.to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives an enum identifier from a literal.
///
/// Numeric literals keep only their digits (`"-123.45"` -> `value12345`).
/// Everything else is camel-cased over `-_./` and whitespace, stripped of
/// non-alphanumerics, prefixed with `value` when digit-leading, and suffixed
/// with `_` when reserved. An empty result is `empty`.
pub fn enum_identifier(literal: &str, reserved: &ReservedWords) -> String {
    if literal.is_empty() {
        return "empty".to_string();
    }

    if numeric_literal_re().is_match(literal) {
        let digits: String = literal.chars().filter(char::is_ascii_digit).collect();
        return format!("value{}", digits);
    }

    let mut identifier = lower_camel_words(literal);
    if identifier.is_empty() {
        return "empty".to_string();
    }
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier = format!("value{}", capitalize(&identifier));
    }
    if reserved.contains(&identifier) {
        identifier.push('_');
    }
    identifier
}

/// Separator-based camel case: every word is lowercased, words after the
/// first are capitalized, and leftover non-alphanumerics are dropped.
fn lower_camel_words(input: &str) -> String {
    let spaced = separators_re().replace_all(input, " ");
    let mut out = String::new();
    for (i, word) in spaced.split_whitespace().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            out.push_str(&capitalize(&lower));
        }
    }
    out.retain(|c| c.is_ascii_alphanumeric());
    out
}

/// Splits an identifier into words on separators and case boundaries.
///
/// Acronyms stay together: `HTTPResponse` -> `["HTTP", "Response"]`.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in input.split(|c: char| !c.is_ascii_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower);
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// Converts a schema or property name to snake_case.
///
/// `UserProfile` -> `user_profile`, `HTTPResponse` -> `http_response`,
/// `AValue` -> `a_value`, `USER` -> `user`.
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts a name to lowerCamelCase (`PetDetails` -> `petDetails`).
pub fn to_camel_case(s: &str) -> String {
    split_words(s)
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let lower = w.to_lowercase();
            if i == 0 {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect()
}

/// Derives the generated class name for a schema.
///
/// Words are capitalized and joined; digit-leading names get a `Model`
/// prefix; names whose lowercase form is reserved get `suffix` appended.
pub fn model_name(name: &str, reserved: &ReservedWords, suffix: &str) -> String {
    let mut class: String = split_words(name).iter().map(|w| capitalize(w)).collect();
    if class.is_empty() {
        class = "Model".to_string();
    } else if class.starts_with(|c: char| c.is_ascii_digit()) {
        class = format!("Model{}", class);
    }
    if reserved.contains_ignore_case(&class) {
        class.push_str(suffix);
    }
    class
}

/// File name (without extension) for a generated model.
pub fn model_file_name(class_name: &str) -> String {
    to_snake_case(class_name)
}

/// Identifier for a property or parameter: camelCase, `_` appended when reserved.
pub fn property_identifier(name: &str, reserved: &ReservedWords) -> String {
    let mut ident = to_camel_case(name);
    if ident.is_empty() {
        ident = "value".to_string();
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident = format!("value{}", capitalize(&ident));
    }
    if reserved.contains(&ident) {
        ident.push('_');
    }
    ident
}

/// Derives an operation name from the HTTP method and path when `operationId` is missing.
///
/// e.g. `GET /users/{id}` -> `get_users_id`
pub fn derive_operation_id(method: &str, path: &str) -> String {
    let clean_path = path.replace(['{', '}'], "").replace('/', "_");
    format!(
        "{}_{}",
        method.to_lowercase(),
        clean_path.trim_start_matches('_')
    )
}

/// Makes names unique within one collection.
///
/// The first occurrence of a name is kept; later ones get `2`, `3`, ...
/// appended. A suffixed candidate that is already taken is skipped.
pub fn resolve_collisions<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut counters: IndexMap<String, usize> = IndexMap::new();
    let mut out = Vec::new();

    for name in names {
        let base: String = name.into();
        if taken.insert(base.clone()) {
            counters.entry(base.clone()).or_insert(1);
            out.push(base);
            continue;
        }
        let counter = counters.entry(base.clone()).or_insert(1);
        let mut candidate;
        loop {
            *counter += 1;
            candidate = format!("{}{}", base, counter);
            if !taken.contains(&candidate) {
                break;
            }
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Reserved words and model suffix bundled for one session.
#[derive(Debug, Clone)]
pub struct ModelNamer {
    reserved: ReservedWords,
    suffix: String,
}

impl Default for ModelNamer {
    fn default() -> Self {
        Self::new(ReservedWords::default(), DEFAULT_RESERVED_MODEL_SUFFIX)
    }
}

impl ModelNamer {
    /// Creates a namer.
    pub fn new(reserved: ReservedWords, suffix: impl Into<String>) -> Self {
        Self {
            reserved,
            suffix: suffix.into(),
        }
    }

    /// The reserved word set.
    pub fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    /// See [`model_name`].
    pub fn class_name(&self, schema_name: &str) -> String {
        model_name(schema_name, &self.reserved, &self.suffix)
    }

    /// File name for the model generated from `schema_name`.
    pub fn file_name(&self, schema_name: &str) -> String {
        model_file_name(&self.class_name(schema_name))
    }

    /// See [`property_identifier`].
    pub fn identifier(&self, name: &str) -> String {
        property_identifier(name, &self.reserved)
    }

    /// See [`enum_identifier`].
    pub fn enum_identifier(&self, literal: &str) -> String {
        enum_identifier(literal, &self.reserved)
    }
}
