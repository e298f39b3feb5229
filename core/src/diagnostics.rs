#![deny(missing_docs)]

//! # Diagnostics
//!
//! Local, non-fatal findings produced while normalizing the type graph.
//!
//! Every pass degrades locally instead of aborting: a dangling reference turns
//! into a sentinel, a conflicting `allOf` property is overwritten, a bad
//! composition alternative is dropped. Each of those records a [`Diagnostic`]
//! here and mirrors it to `tracing`.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Generation continued with a reasonable fallback.
    Warning,
    /// Generation continued, but the output for the named schema is incomplete.
    Error,
}

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// A `$ref` points at nothing in the schema table.
    DanglingReference,
    /// A chain of alias schemas loops back on itself.
    ReferenceLoop,
    /// Two `allOf` members define the same property with different types.
    PropertyConflict,
    /// An `allOf` member cannot contribute properties (primitive, array, inline sum type).
    AllOfMemberIgnored,
    /// An `allOf` member closes a cycle of `allOf` compositions.
    AllOfCycle,
    /// A `oneOf` / `anyOf` alternative has neither a reference nor a recognizable type.
    AlternativeDropped,
    /// A schema is claimed as a child by more than one sealed parent.
    SealedParentConflict,
    /// A discriminator mapping entry could not be resolved.
    DiscriminatorMapping,
    /// A document element the loader does not model.
    Unsupported,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::DanglingReference => "dangling-reference",
            DiagnosticKind::ReferenceLoop => "reference-loop",
            DiagnosticKind::PropertyConflict => "property-conflict",
            DiagnosticKind::AllOfMemberIgnored => "allof-member-ignored",
            DiagnosticKind::AllOfCycle => "allof-cycle",
            DiagnosticKind::AlternativeDropped => "alternative-dropped",
            DiagnosticKind::SealedParentConflict => "sealed-parent-conflict",
            DiagnosticKind::DiscriminatorMapping => "discriminator-mapping",
            DiagnosticKind::Unsupported => "unsupported",
        };
        f.write_str(label)
    }
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// How bad it is.
    pub severity: Severity,
    /// The schema (or operation) being processed when it was found.
    pub subject: Option<String>,
    /// Human readable explanation.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.subject {
            Some(subject) => write!(f, "{}[{}] {}: {}", level, self.kind, subject, self.message),
            None => write!(f, "{}[{}] {}", level, self.kind, self.message),
        }
    }
}

/// Ordered collection of diagnostics for one session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning. An identical, already recorded entry is not repeated.
    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        subject: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(kind, Severity::Warning, subject, message.into());
    }

    /// Records an error. Generation still continues.
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        subject: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(kind, Severity::Error, subject, message.into());
    }

    fn push(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        subject: Option<&str>,
        message: String,
    ) {
        let duplicate = self.items.iter().any(|d| {
            d.kind == kind
                && d.severity == severity
                && d.subject.as_deref() == subject
                && d.message == message
        });
        if duplicate {
            return;
        }

        let subject_label = subject.unwrap_or("-");
        match severity {
            Severity::Warning => {
                tracing::warn!(kind = %kind, subject = subject_label, "{}", message)
            }
            Severity::Error => {
                tracing::error!(kind = %kind, subject = subject_label, "{}", message)
            }
        }
        self.items.push(Diagnostic {
            kind,
            severity,
            subject: subject.map(str::to_string),
            message,
        });
    }

    /// Appends every diagnostic from `other`, keeping order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Iterates diagnostics in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Iterates diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when at least one error-severity diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    /// Borrows the diagnostics as a slice.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}
