//! Error taxonomy for registry construction, checking and generation.

use gqlbind_core::diagnostics::codes;
use gqlbind_core::{Diagnostic, DiagnosticBag, SourceLocation};
use gqlbind_syntax::{Definition, SchemaDefinition, SyntaxError};
use std::fmt;
use thiserror::Error;

/// Where a missing or mismatched type name was referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceContext {
    /// The type of an object or interface field.
    Field,
    /// The type of a field argument.
    FieldArgument,
    /// A type extension, or something it references.
    TypeExtension,
    /// An entry of an object's `implements` list.
    ObjectImplements,
    /// A member of a union.
    UnionMember,
    /// The type of an input object field.
    InputValue,
    /// A root operation type of the schema definition.
    Operation,
}

impl ReferenceContext {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::FieldArgument => "field input",
            Self::TypeExtension => "type extension",
            Self::ObjectImplements => "object",
            Self::UnionMember => "union member",
            Self::InputValue => "input value",
            Self::Operation => "operation",
        }
    }
}

impl fmt::Display for ReferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors produced while turning IDL definitions into an executable schema.
#[derive(Debug, Clone, Error, miette::Diagnostic)]
pub enum SchemaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("'{name}' type {location} tried to redefine existing '{name}' type {existing_location}")]
    #[diagnostic(code(gqlbind::type_redefinition))]
    TypeRedefinition {
        name: String,
        location: SourceLocation,
        existing_location: SourceLocation,
        existing: Box<Definition>,
        redefinition: Box<Definition>,
    },

    #[error(
        "There is already a schema defined {existing_location}. The offending new one is here {location}"
    )]
    #[diagnostic(code(gqlbind::schema_redefinition))]
    SchemaRedefinition {
        location: SourceLocation,
        existing_location: SourceLocation,
        existing: Box<SchemaDefinition>,
        redefinition: Box<SchemaDefinition>,
    },

    #[error(
        "'{type_name}' field '{field}' {location} tried to redefine existing '{field}' field {existing_location}"
    )]
    #[diagnostic(code(gqlbind::field_redefinition))]
    FieldRedefinition {
        type_name: String,
        field: String,
        location: SourceLocation,
        existing_location: SourceLocation,
    },

    #[error("'{type_name}' {context} {location} implements '{interface}' again, first implemented {existing_location}")]
    #[diagnostic(code(gqlbind::duplicate_interface))]
    DuplicateInterface {
        context: ReferenceContext,
        type_name: String,
        interface: String,
        location: SourceLocation,
        existing_location: SourceLocation,
    },

    #[error("The {context} type '{missing}' is not present when resolving type '{referenced_by}' {location}")]
    #[diagnostic(code(gqlbind::missing_type))]
    MissingType {
        context: ReferenceContext,
        referenced_by: String,
        missing: String,
        /// Where the referencing definition starts.
        location: SourceLocation,
        /// Where the missing name is written.
        missing_at: SourceLocation,
    },

    #[error("The {context} type '{type_name}' used by '{referenced_by}' must be {expected} {location}")]
    #[diagnostic(code(gqlbind::type_kind_mismatch))]
    TypeKindMismatch {
        context: ReferenceContext,
        referenced_by: String,
        type_name: String,
        expected: &'static str,
        location: SourceLocation,
    },

    #[error("There is no scalar implementation for the named '{name}' scalar type")]
    #[diagnostic(code(gqlbind::missing_scalar_implementation))]
    MissingScalarImplementation { name: String },

    #[error("There is no type resolver defined for interface / union '{name}' type")]
    #[diagnostic(code(gqlbind::missing_type_resolver))]
    MissingTypeResolver {
        name: String,
        location: SourceLocation,
    },

    #[error("There is no top level schema object defined")]
    #[diagnostic(code(gqlbind::schema_missing))]
    SchemaMissing,

    #[error("A schema MUST have a 'query' operation defined")]
    #[diagnostic(code(gqlbind::query_operation_missing))]
    QueryOperationMissing,

    #[error("The operation type '{operation}' MUST have a object type as its definition {location}")]
    #[diagnostic(code(gqlbind::operation_type_must_be_object))]
    OperationTypeMustBeObject {
        operation: String,
        type_name: String,
        location: SourceLocation,
    },

    /// Checking passed but generation still hit an inconsistency.
    #[error("internal error: {0}")]
    #[diagnostic(code(gqlbind::internal))]
    Internal(String),
}

impl SchemaError {
    /// Creates a type redefinition error from the prior and the new definition.
    pub(crate) fn type_redefinition(existing: Definition, redefinition: Definition) -> Self {
        Self::TypeRedefinition {
            name: redefinition.name().unwrap_or_default().to_string(),
            location: redefinition.location(),
            existing_location: existing.location(),
            existing: Box::new(existing),
            redefinition: Box::new(redefinition),
        }
    }

    /// Creates a schema redefinition error from the prior and the new schema definition.
    pub(crate) fn schema_redefinition(
        existing: SchemaDefinition,
        redefinition: SchemaDefinition,
    ) -> Self {
        Self::SchemaRedefinition {
            location: redefinition.location,
            existing_location: existing.location,
            existing: Box::new(existing),
            redefinition: Box::new(redefinition),
        }
    }

    /// Returns the stable diagnostic code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax(_) => codes::SYNTAX_ERROR,
            Self::TypeRedefinition { .. } => codes::TYPE_REDEFINITION,
            Self::SchemaRedefinition { .. } => codes::SCHEMA_REDEFINITION,
            Self::FieldRedefinition { .. } => codes::FIELD_REDEFINITION,
            Self::DuplicateInterface { .. } => codes::DUPLICATE_INTERFACE,
            Self::MissingType { .. } => codes::MISSING_TYPE,
            Self::TypeKindMismatch { .. } => codes::TYPE_KIND_MISMATCH,
            Self::MissingScalarImplementation { .. } => codes::MISSING_SCALAR_IMPLEMENTATION,
            Self::MissingTypeResolver { .. } => codes::MISSING_TYPE_RESOLVER,
            Self::SchemaMissing => codes::SCHEMA_MISSING,
            Self::QueryOperationMissing => codes::QUERY_OPERATION_MISSING,
            Self::OperationTypeMustBeObject { .. } => codes::OPERATION_TYPE_MUST_BE_OBJECT,
            Self::Internal(_) => codes::INTERNAL,
        }
    }

    /// Returns the primary source location, if the error has one.
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::Syntax(err) => Some(err.location),
            Self::TypeRedefinition { location, .. }
            | Self::SchemaRedefinition { location, .. }
            | Self::FieldRedefinition { location, .. }
            | Self::DuplicateInterface { location, .. }
            | Self::MissingType { location, .. }
            | Self::TypeKindMismatch { location, .. }
            | Self::MissingTypeResolver { location, .. }
            | Self::OperationTypeMustBeObject { location, .. } => Some(*location),
            Self::MissingScalarImplementation { .. }
            | Self::SchemaMissing
            | Self::QueryOperationMissing
            | Self::Internal(_) => None,
        }
    }

    /// Lowers this error into a plain diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(self.code(), self.to_string());
        match self {
            Self::TypeRedefinition {
                location,
                existing_location,
                ..
            }
            | Self::SchemaRedefinition {
                location,
                existing_location,
                ..
            }
            | Self::FieldRedefinition {
                location,
                existing_location,
                ..
            }
            | Self::DuplicateInterface {
                location,
                existing_location,
                ..
            } => {
                diagnostic = diagnostic
                    .with_location(*location, "redefined here")
                    .with_location(*existing_location, "first defined here");
            }
            Self::MissingType {
                missing,
                missing_at,
                location,
                ..
            } => {
                diagnostic = diagnostic
                    .with_location(*missing_at, format!("'{missing}' is not defined"))
                    .with_location(*location, "referenced from this definition");
            }
            Self::Syntax(SyntaxError { message, .. }) => {
                diagnostic = diagnostic.with_message(message.clone());
                if let Some(location) = self.location() {
                    diagnostic = diagnostic.with_location(location, "here");
                }
            }
            _ => {
                if let Some(location) = self.location() {
                    diagnostic = diagnostic.with_location(location, "here");
                }
            }
        }
        diagnostic
    }
}

/// Lowers a list of errors into a diagnostic bag.
pub fn to_diagnostics(errors: &[SchemaError]) -> DiagnosticBag {
    errors.iter().map(SchemaError::to_diagnostic).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlbind_core::DiagnosticSeverity;

    #[test]
    fn test_missing_type_message() {
        let err = SchemaError::MissingType {
            context: ReferenceContext::FieldArgument,
            referenced_by: "Query".to_string(),
            missing: "Filter".to_string(),
            location: SourceLocation::new(1, 1),
            missing_at: SourceLocation::new(2, 14),
        };
        assert_eq!(
            err.to_string(),
            "The field input type 'Filter' is not present when resolving type 'Query' [@1:1]"
        );

        let diag = err.to_diagnostic();
        assert_eq!(diag.code, codes::MISSING_TYPE);
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.primary_location(), Some(SourceLocation::new(2, 14)));
    }

    #[test]
    fn test_field_redefinition_labels() {
        let err = SchemaError::FieldRedefinition {
            type_name: "Query".to_string(),
            field: "a".to_string(),
            location: SourceLocation::new(1, 37),
            existing_location: SourceLocation::new(1, 14),
        };
        assert_eq!(
            err.to_string(),
            "'Query' field 'a' [@1:37] tried to redefine existing 'a' field [@1:14]"
        );

        let diag = err.to_diagnostic();
        assert_eq!(diag.code, codes::FIELD_REDEFINITION);
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.primary_location(), Some(SourceLocation::new(1, 37)));
    }

    #[test]
    fn test_errors_without_location() {
        assert_eq!(SchemaError::SchemaMissing.location(), None);
        assert_eq!(
            SchemaError::QueryOperationMissing.to_string(),
            "A schema MUST have a 'query' operation defined"
        );
        assert!(SchemaError::QueryOperationMissing
            .to_diagnostic()
            .labels
            .is_empty());
    }

    #[test]
    fn test_to_diagnostics() {
        let bag = to_diagnostics(&[
            SchemaError::SchemaMissing,
            SchemaError::MissingScalarImplementation {
                name: "Date".to_string(),
            },
        ]);
        assert_eq!(bag.error_count(), 2);
        let found: Vec<_> = bag.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(found, [codes::SCHEMA_MISSING, codes::MISSING_SCALAR_IMPLEMENTATION]);
    }
}
