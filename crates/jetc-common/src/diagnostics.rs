//! Diagnostic types, message lookup and the reporter seam used by analysis.
//!
//! Source errors never abort analysis. The offending entity is excluded and a
//! `Diagnostic` is handed to whatever `DiagnosticReporter` the host injected.

use serde::Serialize;

use crate::Span;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Message = 2,
}

/// Related information for a diagnostic (e.g., the overridden declaration).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A source diagnostic with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g., where a conflicting member was declared)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic from a registered code, filling its template.
    ///
    /// Unknown codes produce an error with the raw arguments joined, which
    /// keeps a misregistered code visible instead of silently dropping it.
    #[must_use]
    pub fn from_code(file: &str, span: Span, code: u32, args: &[&str]) -> Self {
        let (category, message_text) = match get_diagnostic_message(code) {
            Some(message) => (message.category, format_message(message.message, args)),
            None => (DiagnosticCategory::Error, args.join(", ")),
        };
        Self {
            file: file.to_string(),
            start: span.start,
            length: span.len(),
            message_text,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Message Table
// =============================================================================

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub name: &'static str,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const REDECLARATION: u32 = 1001;
    pub const UNRESOLVED_REFERENCE: u32 = 1002;
    pub const CYCLIC_INHERITANCE_HIERARCHY: u32 = 1101;
    pub const SUPERTYPE_NOT_A_CLASS: u32 = 1102;
    pub const FINAL_SUPERTYPE: u32 = 1103;
    pub const MANY_COMPANION_OBJECTS: u32 = 1104;
    pub const COMPANION_OBJECT_NOT_ALLOWED: u32 = 1105;
    pub const CONFLICTING_INHERITED_MEMBERS: u32 = 1201;
    pub const CANNOT_INFER_VISIBILITY: u32 = 1202;
    pub const RETURN_TYPE_MISMATCH_ON_OVERRIDE: u32 = 1203;
    pub const PROPERTY_TYPE_MISMATCH_ON_OVERRIDE: u32 = 1204;
    pub const VAR_OVERRIDDEN_BY_VAL: u32 = 1205;
    pub const OVERRIDING_FINAL_MEMBER: u32 = 1206;
    pub const NOTHING_TO_OVERRIDE: u32 = 1207;
    pub const VIRTUAL_MEMBER_HIDDEN: u32 = 1208;
    pub const ABSTRACT_MEMBER_NOT_IMPLEMENTED: u32 = 1209;
}

use diagnostic_codes as codes;

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: codes::REDECLARATION,
        name: "REDECLARATION",
        category: DiagnosticCategory::Error,
        message: "Redeclaration: {0}",
    },
    DiagnosticMessage {
        code: codes::UNRESOLVED_REFERENCE,
        name: "UNRESOLVED_REFERENCE",
        category: DiagnosticCategory::Error,
        message: "Unresolved reference: {0}",
    },
    DiagnosticMessage {
        code: codes::CYCLIC_INHERITANCE_HIERARCHY,
        name: "CYCLIC_INHERITANCE_HIERARCHY",
        category: DiagnosticCategory::Error,
        message: "There's a cycle in the inheritance hierarchy for '{0}'",
    },
    DiagnosticMessage {
        code: codes::SUPERTYPE_NOT_A_CLASS,
        name: "SUPERTYPE_NOT_A_CLASS",
        category: DiagnosticCategory::Error,
        message: "Only classes and interfaces may serve as supertypes, '{0}' is not one",
    },
    DiagnosticMessage {
        code: codes::FINAL_SUPERTYPE,
        name: "FINAL_SUPERTYPE",
        category: DiagnosticCategory::Error,
        message: "This type is final, so it cannot be inherited from: '{0}'",
    },
    DiagnosticMessage {
        code: codes::MANY_COMPANION_OBJECTS,
        name: "MANY_COMPANION_OBJECTS",
        category: DiagnosticCategory::Error,
        message: "Only one companion object is allowed per class, '{0}' already has one",
    },
    DiagnosticMessage {
        code: codes::COMPANION_OBJECT_NOT_ALLOWED,
        name: "COMPANION_OBJECT_NOT_ALLOWED",
        category: DiagnosticCategory::Error,
        message: "A companion object is not allowed here: '{0}'",
    },
    DiagnosticMessage {
        code: codes::CONFLICTING_INHERITED_MEMBERS,
        name: "CONFLICTING_INHERITED_MEMBERS",
        category: DiagnosticCategory::Error,
        message: "'{0}' inherits conflicting members: {1} and {2}",
    },
    DiagnosticMessage {
        code: codes::CANNOT_INFER_VISIBILITY,
        name: "CANNOT_INFER_VISIBILITY",
        category: DiagnosticCategory::Error,
        message: "Cannot infer visibility for '{0}'. Please specify it explicitly",
    },
    DiagnosticMessage {
        code: codes::RETURN_TYPE_MISMATCH_ON_OVERRIDE,
        name: "RETURN_TYPE_MISMATCH_ON_OVERRIDE",
        category: DiagnosticCategory::Error,
        message: "Return type of '{0}' is not a subtype of the return type of the overridden member {1}",
    },
    DiagnosticMessage {
        code: codes::PROPERTY_TYPE_MISMATCH_ON_OVERRIDE,
        name: "PROPERTY_TYPE_MISMATCH_ON_OVERRIDE",
        category: DiagnosticCategory::Error,
        message: "Type of '{0}' doesn't match the type of the overridden property {1}",
    },
    DiagnosticMessage {
        code: codes::VAR_OVERRIDDEN_BY_VAL,
        name: "VAR_OVERRIDDEN_BY_VAL",
        category: DiagnosticCategory::Error,
        message: "Var-property {1} cannot be overridden by val-property '{0}'",
    },
    DiagnosticMessage {
        code: codes::OVERRIDING_FINAL_MEMBER,
        name: "OVERRIDING_FINAL_MEMBER",
        category: DiagnosticCategory::Error,
        message: "'{0}' in '{1}' is final and cannot be overridden",
    },
    DiagnosticMessage {
        code: codes::NOTHING_TO_OVERRIDE,
        name: "NOTHING_TO_OVERRIDE",
        category: DiagnosticCategory::Error,
        message: "'{0}' overrides nothing",
    },
    DiagnosticMessage {
        code: codes::VIRTUAL_MEMBER_HIDDEN,
        name: "VIRTUAL_MEMBER_HIDDEN",
        category: DiagnosticCategory::Error,
        message: "'{0}' hides member of supertype '{1}' and needs 'override' modifier",
    },
    DiagnosticMessage {
        code: codes::ABSTRACT_MEMBER_NOT_IMPLEMENTED,
        name: "ABSTRACT_MEMBER_NOT_IMPLEMENTED",
        category: DiagnosticCategory::Error,
        message: "Class '{0}' must be declared abstract or implement abstract member {1}",
    },
];

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

// =============================================================================
// Reporting
// =============================================================================

/// Sink for source diagnostics.
///
/// Analysis takes `&mut dyn DiagnosticReporter` so hosts can stream
/// diagnostics into their own infrastructure.
pub trait DiagnosticReporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A reporter that accumulates diagnostics in order.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the collected diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the collected diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Collected diagnostics with the given code.
    pub fn with_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticReporter for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
