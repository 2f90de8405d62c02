//! Type checker for registries.
//!
//! Looks for missing types and makes sure the invariants needed to build an
//! executable schema hold. The checker never builds anything and never stops
//! at the first problem.

use crate::errors::{ReferenceContext, SchemaError};
use crate::registry::TypeRegistry;
use crate::type_info::TypeInfo;
use crate::wiring::RuntimeWiring;
use gqlbind_core::SourceLocation;
use gqlbind_syntax::ast::{FieldDefinition, NamedType, OperationType, Type, TypeDefinition};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Which kinds of named type a position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Output,
    Input,
    Interface,
    Object,
}

impl Position {
    fn accepts(self, def: &TypeDefinition) -> bool {
        match self {
            Self::Output => !matches!(def, TypeDefinition::InputObject(_)),
            Self::Input => matches!(
                def,
                TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_)
            ),
            Self::Interface => matches!(def, TypeDefinition::Interface(_)),
            Self::Object => matches!(def, TypeDefinition::Object(_)),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::Output => "an output type",
            Self::Input => "an input type",
            Self::Interface => "an interface type",
            Self::Object => "an object type",
        }
    }
}

/// The definition a type reference was found in.
struct Referrer<'d> {
    name: &'d str,
    location: SourceLocation,
}

fn field_names(fields: &[FieldDefinition]) -> impl Iterator<Item = (&str, SourceLocation)> {
    fields.iter().map(|f| (f.name.value.as_str(), f.location))
}

fn no_fields<'d>() -> std::iter::Empty<(&'d str, SourceLocation)> {
    std::iter::empty()
}

/// Type checker for a registry and its wiring.
pub struct TypeChecker<'a> {
    registry: &'a TypeRegistry,
    wiring: &'a RuntimeWiring,
    errors: Vec<SchemaError>,
}

impl<'a> TypeChecker<'a> {
    /// Creates a new type checker.
    pub fn new(registry: &'a TypeRegistry, wiring: &'a RuntimeWiring) -> Self {
        Self {
            registry,
            wiring,
            errors: Vec::new(),
        }
    }

    /// Runs every check and returns the errors found. An empty list means a
    /// schema can be generated.
    pub fn check(mut self) -> Vec<SchemaError> {
        self.check_missing_types();
        self.check_schema_invariants();
        self.check_scalar_implementations();
        self.check_type_resolvers();

        debug!(errors = self.errors.len(), "type check finished");
        self.errors
    }

    fn check_missing_types(&mut self) {
        let registry = self.registry;

        for ext in registry.type_extension_definitions() {
            let referrer = Referrer {
                name: &ext.name.value,
                location: ext.location,
            };

            let base = registry.get_type_by_name(&ext.name.value);
            match base {
                Some(TypeDefinition::Object(_)) => {}
                Some(_) => self.errors.push(SchemaError::TypeKindMismatch {
                    context: ReferenceContext::TypeExtension,
                    referenced_by: ext.name.value.clone(),
                    type_name: ext.name.value.clone(),
                    expected: Position::Object.expected(),
                    location: ext.location,
                }),
                None => self.errors.push(SchemaError::MissingType {
                    context: ReferenceContext::TypeExtension,
                    referenced_by: ext.name.value.clone(),
                    missing: ext.name.value.clone(),
                    location: ext.location,
                    missing_at: ext.location,
                }),
            }

            for named in &ext.implements {
                self.check_reference(
                    &referrer,
                    ReferenceContext::TypeExtension,
                    &Type::Named(named.clone()),
                    Position::Interface,
                );
            }
            self.check_fields(&referrer, &ext.fields);

            if let Some(TypeDefinition::Object(object)) = base {
                self.check_unique_fields(
                    &ext.name.value,
                    field_names(&object.fields),
                    field_names(&ext.fields),
                );
                self.check_unique_interfaces(
                    ReferenceContext::TypeExtension,
                    &ext.name.value,
                    &object.implements,
                    &ext.implements,
                );
            }
        }

        for def in registry.type_definitions() {
            let referrer = Referrer {
                name: def.name(),
                location: def.location(),
            };

            match def {
                TypeDefinition::Object(object) => {
                    for named in &object.implements {
                        self.check_reference(
                            &referrer,
                            ReferenceContext::ObjectImplements,
                            &Type::Named(named.clone()),
                            Position::Interface,
                        );
                    }
                    self.check_fields(&referrer, &object.fields);
                    let names = field_names(&object.fields);
                    self.check_unique_fields(def.name(), no_fields(), names);
                    self.check_unique_interfaces(
                        ReferenceContext::ObjectImplements,
                        def.name(),
                        &[],
                        &object.implements,
                    );
                }
                TypeDefinition::Interface(interface) => {
                    self.check_fields(&referrer, &interface.fields);
                    let names = field_names(&interface.fields);
                    self.check_unique_fields(def.name(), no_fields(), names);
                }
                TypeDefinition::Union(union) => {
                    for named in &union.members {
                        self.check_reference(
                            &referrer,
                            ReferenceContext::UnionMember,
                            &Type::Named(named.clone()),
                            Position::Object,
                        );
                    }
                }
                TypeDefinition::InputObject(input) => {
                    for value in &input.fields {
                        self.check_reference(
                            &referrer,
                            ReferenceContext::InputValue,
                            &value.ty,
                            Position::Input,
                        );
                    }
                    let names = input.fields.iter().map(|f| (f.name.value.as_str(), f.location));
                    self.check_unique_fields(def.name(), no_fields(), names);
                }
                TypeDefinition::Enum(_) | TypeDefinition::Scalar(_) => {}
            }
        }
    }

    fn check_fields(&mut self, referrer: &Referrer<'_>, fields: &[FieldDefinition]) {
        for field in fields {
            self.check_reference(referrer, ReferenceContext::Field, &field.ty, Position::Output);
        }
        for field in fields {
            for arg in &field.arguments {
                self.check_reference(
                    referrer,
                    ReferenceContext::FieldArgument,
                    &arg.ty,
                    Position::Input,
                );
            }
        }
    }

    /// Reports every field in `added` whose name is already taken, either by
    /// `existing` or by an earlier entry of `added`.
    fn check_unique_fields<'d>(
        &mut self,
        type_name: &str,
        existing: impl IntoIterator<Item = (&'d str, SourceLocation)>,
        added: impl IntoIterator<Item = (&'d str, SourceLocation)>,
    ) {
        let mut seen: FxHashMap<&str, SourceLocation> = existing.into_iter().collect();
        for (name, location) in added {
            if let Some(&existing_location) = seen.get(name) {
                self.errors.push(SchemaError::FieldRedefinition {
                    type_name: type_name.to_string(),
                    field: name.to_string(),
                    location,
                    existing_location,
                });
            } else {
                seen.insert(name, location);
            }
        }
    }

    fn check_unique_interfaces(
        &mut self,
        context: ReferenceContext,
        type_name: &str,
        existing: &[NamedType],
        added: &[NamedType],
    ) {
        let mut seen: FxHashMap<&str, SourceLocation> = existing
            .iter()
            .map(|named| (named.name.as_str(), named.location))
            .collect();
        for named in added {
            if let Some(&existing_location) = seen.get(named.name.as_str()) {
                self.errors.push(SchemaError::DuplicateInterface {
                    context,
                    type_name: type_name.to_string(),
                    interface: named.name.clone(),
                    location: named.location,
                    existing_location,
                });
            } else {
                seen.insert(named.name.as_str(), named.location);
            }
        }
    }

    fn check_reference(
        &mut self,
        referrer: &Referrer<'_>,
        context: ReferenceContext,
        ty: &Type,
        position: Position,
    ) {
        let info = TypeInfo::new(ty);
        trace!(%context, referenced_by = referrer.name, ty = info.name(), "checking reference");

        if !self.registry.has_type(info.name()) {
            self.errors.push(SchemaError::MissingType {
                context,
                referenced_by: referrer.name.to_string(),
                missing: info.name().to_string(),
                location: referrer.location,
                missing_at: info.location(),
            });
            return;
        }

        if let Some(def) = self.registry.get_type_by_name(info.name()) {
            if !position.accepts(def) {
                self.errors.push(SchemaError::TypeKindMismatch {
                    context,
                    referenced_by: referrer.name.to_string(),
                    type_name: info.name().to_string(),
                    expected: position.expected(),
                    location: info.location(),
                });
            }
        }
    }

    fn check_schema_invariants(&mut self) {
        let Some(schema) = self.registry.schema_definition() else {
            self.errors.push(SchemaError::SchemaMissing);
            return;
        };

        for op in &schema.operations {
            let info = TypeInfo::new(&op.ty);
            if !self.registry.has_type(info.name()) {
                self.errors.push(SchemaError::MissingType {
                    context: ReferenceContext::Operation,
                    referenced_by: op.operation.to_string(),
                    missing: info.name().to_string(),
                    location: op.location,
                    missing_at: info.location(),
                });
            }
        }

        for op in &schema.operations {
            let info = TypeInfo::new(&op.ty);
            // A missing root was already reported above.
            if !self.registry.has_type(info.name()) {
                continue;
            }
            let is_object = matches!(
                self.registry.get_type_by_name(info.name()),
                Some(TypeDefinition::Object(_))
            );
            if !is_object {
                self.errors.push(SchemaError::OperationTypeMustBeObject {
                    operation: op.operation.to_string(),
                    type_name: info.name().to_string(),
                    location: op.location,
                });
            }
        }

        if schema.operation(OperationType::Query).is_none() {
            self.errors.push(SchemaError::QueryOperationMissing);
        }
    }

    fn check_scalar_implementations(&mut self) {
        for name in self.registry.scalar_names() {
            if !self.wiring.has_scalar(name) {
                self.errors.push(SchemaError::MissingScalarImplementation {
                    name: name.to_string(),
                });
            }
        }
    }

    fn check_type_resolvers(&mut self) {
        for def in self.registry.type_definitions() {
            let is_abstract = matches!(
                def,
                TypeDefinition::Interface(_) | TypeDefinition::Union(_)
            );
            if is_abstract && !self.wiring.has_type_resolver(def.name()) {
                self.errors.push(SchemaError::MissingTypeResolver {
                    name: def.name().to_string(),
                    location: def.location(),
                });
            }
        }
    }
}

/// Checks that `registry` can be turned into an executable schema with
/// `wiring`, returning every problem found.
pub fn check(registry: &TypeRegistry, wiring: &RuntimeWiring) -> Vec<SchemaError> {
    TypeChecker::new(registry, wiring).check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TypeResolver;
    use crate::scalars::{PassthroughCoercing, ScalarCodec};
    use crate::wiring::TypeWiring;
    use gqlbind_syntax::parse;

    fn registry(source: &str) -> TypeRegistry {
        let doc = match parse(source) {
            Ok(doc) => doc,
            Err(err) => panic!("unexpected syntax error: {err}"),
        };
        match TypeRegistry::from_definitions(doc.definitions) {
            Ok(registry) => registry,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    fn check_source(source: &str) -> Vec<SchemaError> {
        check(&registry(source), &RuntimeWiring::new())
    }

    #[test]
    fn test_clean_schema() {
        let errors = check_source(
            r#"
            type Query { hello(name: String = "world"): String }
            schema { query: Query }
            "#,
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_schema_missing() {
        let errors = check_source("type Query { hello: String }");
        assert!(matches!(errors[..], [SchemaError::SchemaMissing]));
    }

    #[test]
    fn test_query_missing_with_mutation_present() {
        let errors = check_source(
            "type Mutation { save: Boolean } schema { mutation: Mutation }",
        );
        assert!(matches!(errors[..], [SchemaError::QueryOperationMissing]));
    }

    #[test]
    fn test_missing_operation_type_reported_once() {
        let errors = check_source("schema { query: Query }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SchemaError::MissingType { context: ReferenceContext::Operation, missing, referenced_by, .. }
                if missing == "Query" && referenced_by == "query"
        ));
    }

    #[test]
    fn test_operation_type_must_be_object() {
        let errors = check_source("enum Query { A } schema { query: Query }");
        assert!(matches!(
            &errors[..],
            [SchemaError::OperationTypeMustBeObject { operation, type_name, .. }]
                if operation == "query" && type_name == "Query"
        ));
    }

    #[test]
    fn test_errors_are_accumulated() {
        let errors = check_source(
            r#"
            type Query { a: Missing1, b(arg: Missing2): Int }
            union U = Missing3
            scalar Date
            "#,
        );
        let codes: Vec<_> = errors.iter().map(SchemaError::code).collect();
        assert_eq!(
            codes,
            ["E0010", "E0010", "E0010", "E0050", "E0040", "E0041"]
        );
    }

    #[test]
    fn test_scalar_and_resolver_checks_use_wiring() {
        let registry = registry(
            r#"
            scalar Date
            interface Node { id: ID! }
            type Query { node: Node, today: Date }
            schema { query: Query }
            "#,
        );

        let mut wiring = RuntimeWiring::new();
        let errors = check(&registry, &wiring);
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            SchemaError::MissingScalarImplementation { name } if name == "Date"
        ));
        assert!(matches!(
            &errors[1],
            SchemaError::MissingTypeResolver { name, .. } if name == "Node"
        ));

        wiring
            .scalar(ScalarCodec::new("Date", PassthroughCoercing))
            .type_wiring(TypeWiring::new("Node").type_resolver(TypeResolver::from_property("kind")));
        assert!(check(&registry, &wiring).is_empty());
    }

    #[test]
    fn test_type_kind_mismatches() {
        let errors = check_source(
            r#"
            input Filter { q: String }
            type Dog { name: String }
            interface Named { name: String }
            type Query implements Dog {
              a: Filter
              b(f: Dog): Int
            }
            input Bad { dog: Dog }
            union U = Named
            schema { query: Query }
            "#,
        );

        let mismatches: Vec<_> = errors
            .iter()
            .filter_map(|err| match err {
                SchemaError::TypeKindMismatch {
                    context,
                    type_name,
                    expected,
                    ..
                } => Some((*context, type_name.as_str(), *expected)),
                _ => None,
            })
            .collect();

        assert_eq!(
            mismatches,
            [
                (ReferenceContext::ObjectImplements, "Dog", "an interface type"),
                (ReferenceContext::Field, "Filter", "an output type"),
                (ReferenceContext::FieldArgument, "Dog", "an input type"),
                (ReferenceContext::InputValue, "Dog", "an input type"),
                (ReferenceContext::UnionMember, "Named", "an object type"),
            ]
        );
    }

    #[test]
    fn test_extension_needs_object_type() {
        let errors = check_source(
            "extend type Ghost { a: Int } type Query { a: Int } schema { query: Query }",
        );
        assert!(matches!(
            &errors[..],
            [SchemaError::MissingType { context: ReferenceContext::TypeExtension, missing, .. }]
                if missing == "Ghost"
        ));
    }

    #[test]
    fn test_extension_fields_are_checked() {
        let errors = check_source(
            r#"
            type Query { a: Int }
            extend type Query implements Missing { b: Other, c(x: Arg): Int }
            schema { query: Query }
            "#,
        );
        let contexts: Vec<_> = errors
            .iter()
            .filter_map(|err| match err {
                SchemaError::MissingType {
                    context, missing, ..
                } => Some((*context, missing.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            contexts,
            [
                (ReferenceContext::TypeExtension, "Missing"),
                (ReferenceContext::Field, "Other"),
                (ReferenceContext::FieldArgument, "Arg"),
            ]
        );
    }

    #[test]
    fn test_extension_cannot_redefine_fields() {
        let errors = check_source(
            "type Query { a: Int }\nextend type Query { b: Int a: String b: ID }\nschema { query: Query }",
        );
        let found: Vec<_> = errors
            .iter()
            .filter_map(|err| match err {
                SchemaError::FieldRedefinition {
                    type_name,
                    field,
                    location,
                    existing_location,
                } => Some((
                    type_name.as_str(),
                    field.as_str(),
                    location.line,
                    existing_location.line,
                )),
                _ => None,
            })
            .collect();
        assert_eq!(found, [("Query", "a", 2, 1), ("Query", "b", 2, 2)]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_duplicate_fields_in_one_definition() {
        let errors = check_source(
            r#"
            type Query { a: Int, a: String }
            input Filter { x: Int, x: Int }
            schema { query: Query }
            "#,
        );
        let fields: Vec<_> = errors
            .iter()
            .filter_map(|err| match err {
                SchemaError::FieldRedefinition {
                    type_name, field, ..
                } => Some((type_name.as_str(), field.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(fields, [("Query", "a"), ("Filter", "x")]);
    }

    #[test]
    fn test_extension_cannot_repeat_interfaces() {
        let mut wiring = RuntimeWiring::new();
        wiring.type_wiring(TypeWiring::new("Node").type_resolver(TypeResolver::from_property("kind")));
        let errors = check(
            &registry(
                r#"
                interface Node { id: ID }
                type Query implements Node { id: ID }
                extend type Query implements Node { b: Int }
                schema { query: Query }
                "#,
            ),
            &wiring,
        );
        assert!(
            matches!(
                &errors[..],
                [SchemaError::DuplicateInterface { context: ReferenceContext::TypeExtension, type_name, interface, .. }]
                    if type_name == "Query" && interface == "Node"
            ),
            "{errors:?}"
        );
    }
}
