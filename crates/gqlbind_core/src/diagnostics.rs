//! Diagnostic reporting for gqlbind.

use crate::location::SourceLocation;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// An error that prevents schema generation.
    Error,
    /// A warning that doesn't prevent schema generation.
    Warning,
}

/// A label attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// The location this label points to.
    pub location: SourceLocation,
    /// The label message.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Error code.
    pub code: String,
    /// Short title.
    pub title: String,
    /// Detailed message.
    pub message: Option<String>,
    /// Labels pointing to source locations.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a label at a location.
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(location, message));
        self
    }

    /// Returns the primary location, if any.
    pub fn primary_location(&self) -> Option<SourceLocation> {
        self.labels.first().map(|l| l.location)
    }
}

/// A collection of diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl FromIterator<Diagnostic> for DiagnosticBag {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}

/// Common diagnostic codes.
pub mod codes {
    pub const SYNTAX_ERROR: &str = "E0001";
    pub const MISSING_TYPE: &str = "E0010";
    pub const TYPE_REDEFINITION: &str = "E0012";
    pub const FIELD_REDEFINITION: &str = "E0013";
    pub const SCHEMA_REDEFINITION: &str = "E0014";
    pub const TYPE_KIND_MISMATCH: &str = "E0020";
    pub const DUPLICATE_INTERFACE: &str = "E0021";
    pub const MISSING_SCALAR_IMPLEMENTATION: &str = "E0040";
    pub const MISSING_TYPE_RESOLVER: &str = "E0041";
    pub const SCHEMA_MISSING: &str = "E0050";
    pub const QUERY_OPERATION_MISSING: &str = "E0051";
    pub const OPERATION_TYPE_MUST_BE_OBJECT: &str = "E0052";
    pub const INTERNAL: &str = "E0099";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.add(Diagnostic::error(codes::MISSING_TYPE, "missing type"));
        bag.add(Diagnostic {
            severity: DiagnosticSeverity::Warning,
            ..Diagnostic::error("W0001", "just a warning")
        });

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error(codes::SYNTAX_ERROR, "Test")
            .with_message("Details")
            .with_location(SourceLocation::new(2, 5), "here");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.primary_location(), Some(SourceLocation::new(2, 5)));
    }
}
