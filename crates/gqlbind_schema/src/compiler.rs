//! Compiles SDL source text into a [`TypeRegistry`].

use crate::errors::SchemaError;
use crate::registry::TypeRegistry;
use gqlbind_syntax::parse;
use tracing::debug;

/// Parses `source` and adds every definition to a fresh registry.
///
/// A syntax error aborts and is returned alone. Redefinitions do not stop
/// the remaining definitions from being added; all of them are returned.
pub fn compile(source: &str) -> Result<TypeRegistry, Vec<SchemaError>> {
    let document = parse(source).map_err(|err| vec![SchemaError::from(err)])?;
    debug!(definitions = document.definitions.len(), "compiling source");
    TypeRegistry::from_definitions(document.definitions)
}

/// Compiles each source independently and merges the results in order.
///
/// A source that fails to compile contributes its errors and is skipped;
/// merge collisions between sources are reported too.
pub fn compile_all<'s>(
    sources: impl IntoIterator<Item = &'s str>,
) -> Result<TypeRegistry, Vec<SchemaError>> {
    let mut registry = TypeRegistry::new();
    let mut errors = Vec::new();

    for (index, source) in sources.into_iter().enumerate() {
        let merged = compile(source).and_then(|compiled| registry.merge(&compiled));
        if let Err(source_errors) = merged {
            debug!(index, errors = source_errors.len(), "source rejected");
            errors.extend(source_errors);
        }
    }

    if errors.is_empty() {
        Ok(registry)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlbind_core::SourceLocation;

    #[test]
    fn test_compile_syntax_error_is_alone() {
        let errors = compile("type Query { a: Int }\ntype { }").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SchemaError::Syntax(_)));
        assert_eq!(errors[0].location(), Some(SourceLocation::new(2, 6)));
    }

    #[test]
    fn test_compile_collects_redefinitions() {
        let errors = compile("enum A { X } enum A { Y } type B { b: Int } type B { b: Int }")
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|err| matches!(err, SchemaError::TypeRedefinition { .. })));
    }

    #[test]
    fn test_compile_all_merges_in_order() {
        let registry = match compile_all([
            "type Query { user: User } schema { query: Query }",
            "type User { id: ID! }",
        ]) {
            Ok(registry) => registry,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert_eq!(
            registry.types().keys().collect::<Vec<_>>(),
            ["Query", "User"]
        );
        assert!(registry.schema_definition().is_some());
    }

    #[test]
    fn test_compile_all_keeps_going() {
        let errors = compile_all([
            "type Query { a: Int }",
            "type {",
            "type Query { b: Int }",
        ])
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SchemaError::Syntax(_)));
        assert!(matches!(errors[1], SchemaError::TypeRedefinition { .. }));
    }
}
