//! The type registry: parsed definitions accumulated into namespaced tables.

use crate::errors::SchemaError;
use crate::scalars::STANDARD_SCALARS;
use crate::type_info::TypeInfo;
use gqlbind_syntax::ast::{
    Definition, SchemaDefinition, ScalarTypeDefinition, Type, TypeDefinition,
    TypeExtensionDefinition,
};
use indexmap::IndexMap;
use tracing::debug;

/// Accumulates type definitions, detecting redefinitions.
///
/// Names live in one of four namespaces: built-in scalars, custom scalars,
/// type extensions and all other named types. A name may be defined at most
/// once per namespace. At most one schema definition is held.
///
/// The registry does no cross-reference validation; see
/// [`TypeChecker`](crate::checker::TypeChecker).
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    standard_scalars: IndexMap<String, TypeDefinition>,
    scalars: IndexMap<String, TypeDefinition>,
    type_extensions: IndexMap<String, TypeExtensionDefinition>,
    types: IndexMap<String, TypeDefinition>,
    schema: Option<SchemaDefinition>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry seeded with the built-in scalars.
    pub fn new() -> Self {
        Self {
            standard_scalars: STANDARD_SCALARS
                .iter()
                .map(|name| {
                    let def = TypeDefinition::Scalar(ScalarTypeDefinition::builtin(name));
                    ((*name).to_string(), def)
                })
                .collect(),
            scalars: IndexMap::new(),
            type_extensions: IndexMap::new(),
            types: IndexMap::new(),
            schema: None,
        }
    }

    /// Builds a registry from a sequence of definitions.
    ///
    /// Every definition is offered to the registry; redefinitions are
    /// collected and returned together.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = Definition>,
    ) -> Result<Self, Vec<SchemaError>> {
        let mut registry = Self::new();
        let errors: Vec<_> = definitions
            .into_iter()
            .filter_map(|def| registry.add(def).err())
            .collect();

        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(errors)
        }
    }

    /// Adds a definition to its namespace.
    ///
    /// On a name collision the registry keeps the prior definition and
    /// returns an error carrying both.
    pub fn add(&mut self, definition: Definition) -> Result<(), SchemaError> {
        match definition {
            Definition::Schema(schema) => match &self.schema {
                Some(existing) => Err(SchemaError::schema_redefinition(existing.clone(), schema)),
                None => {
                    self.schema = Some(schema);
                    Ok(())
                }
            },
            Definition::TypeExtension(ext) => {
                if let Some(existing) = self.type_extensions.get(&ext.name.value) {
                    return Err(SchemaError::type_redefinition(
                        Definition::TypeExtension(existing.clone()),
                        Definition::TypeExtension(ext),
                    ));
                }
                self.type_extensions.insert(ext.name.value.clone(), ext);
                Ok(())
            }
            Definition::Type(def) => {
                let table = match def {
                    TypeDefinition::Scalar(_) => &mut self.scalars,
                    _ => &mut self.types,
                };
                define(table, &IndexMap::new(), def)
            }
        }
    }

    /// Merges `other` into this registry, all or nothing.
    ///
    /// Collisions are collected across every namespace; if there are any,
    /// nothing is committed and both registries are left unchanged. `other`'s
    /// schema definition is taken only when this registry has none.
    pub fn merge(&mut self, other: &TypeRegistry) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();

        let mut staged_types = IndexMap::new();
        for def in other.types.values() {
            if let Err(err) = define(&mut staged_types, &self.types, def.clone()) {
                errors.push(err);
            }
        }

        let mut staged_scalars = IndexMap::new();
        for def in other.scalars.values() {
            if let Err(err) = define(&mut staged_scalars, &self.scalars, def.clone()) {
                errors.push(err);
            }
        }

        let mut staged_extensions = IndexMap::new();
        for (name, ext) in &other.type_extensions {
            match self.type_extensions.get(name) {
                Some(existing) => errors.push(SchemaError::type_redefinition(
                    Definition::TypeExtension(existing.clone()),
                    Definition::TypeExtension(ext.clone()),
                )),
                None => {
                    staged_extensions.insert(name.clone(), ext.clone());
                }
            }
        }

        if let (Some(existing), Some(schema)) = (&self.schema, &other.schema) {
            errors.push(SchemaError::schema_redefinition(
                existing.clone(),
                schema.clone(),
            ));
        }

        if !errors.is_empty() {
            debug!(errors = errors.len(), "registry merge rejected");
            return Err(errors);
        }

        debug!(
            types = staged_types.len(),
            scalars = staged_scalars.len(),
            extensions = staged_extensions.len(),
            "registry merge committed"
        );
        self.types.extend(staged_types);
        self.scalars.extend(staged_scalars);
        self.type_extensions.extend(staged_extensions);
        if self.schema.is_none() {
            self.schema.clone_from(&other.schema);
        }
        Ok(())
    }

    /// Returns a snapshot of the object, interface, union, enum and input
    /// object definitions.
    pub fn types(&self) -> IndexMap<String, TypeDefinition> {
        self.types.clone()
    }

    /// Returns a snapshot of every scalar, built-in ones first.
    pub fn scalars(&self) -> IndexMap<String, ScalarTypeDefinition> {
        self.standard_scalars
            .iter()
            .chain(&self.scalars)
            .filter_map(|(name, def)| match def {
                TypeDefinition::Scalar(scalar) => Some((name.clone(), scalar.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns a snapshot of the type extensions.
    pub fn type_extensions(&self) -> IndexMap<String, TypeExtensionDefinition> {
        self.type_extensions.clone()
    }

    /// Returns the schema definition, if one was added.
    pub fn schema_definition(&self) -> Option<&SchemaDefinition> {
        self.schema.as_ref()
    }

    /// Returns true if `name` is defined in any namespace.
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
            || self.standard_scalars.contains_key(name)
            || self.scalars.contains_key(name)
            || self.type_extensions.contains_key(name)
    }

    /// Resolves the bare name of a type usage to its definition, looking at
    /// named types first, then scalars.
    pub fn get_type(&self, ty: &Type) -> Option<&TypeDefinition> {
        self.get_type_by_name(TypeInfo::new(ty).name())
    }

    /// Resolves a bare type name to its definition.
    pub fn get_type_by_name(&self, name: &str) -> Option<&TypeDefinition> {
        self.types
            .get(name)
            .or_else(|| self.standard_scalars.get(name))
            .or_else(|| self.scalars.get(name))
    }

    pub(crate) fn type_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub(crate) fn scalar_names(&self) -> impl Iterator<Item = &str> {
        self.standard_scalars
            .keys()
            .chain(self.scalars.keys())
            .map(String::as_str)
    }

    pub(crate) fn type_extension(&self, name: &str) -> Option<&TypeExtensionDefinition> {
        self.type_extensions.get(name)
    }

    pub(crate) fn type_extension_definitions(
        &self,
    ) -> impl Iterator<Item = &TypeExtensionDefinition> {
        self.type_extensions.values()
    }
}

/// Inserts `def` into `target` unless its name already exists in `target` or
/// in `existing`.
fn define(
    target: &mut IndexMap<String, TypeDefinition>,
    existing: &IndexMap<String, TypeDefinition>,
    def: TypeDefinition,
) -> Result<(), SchemaError> {
    let name = def.name();
    if let Some(prior) = target.get(name).or_else(|| existing.get(name)) {
        return Err(SchemaError::type_redefinition(
            Definition::Type(prior.clone()),
            Definition::Type(def),
        ));
    }
    target.insert(name.to_string(), def);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlbind_syntax::parse;

    fn definitions(source: &str) -> Vec<Definition> {
        match parse(source) {
            Ok(doc) => doc.definitions,
            Err(err) => panic!("unexpected syntax error: {err}"),
        }
    }

    fn registry(source: &str) -> TypeRegistry {
        match TypeRegistry::from_definitions(definitions(source)) {
            Ok(registry) => registry,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    #[test]
    fn test_standard_scalars_seeded() {
        let registry = TypeRegistry::new();
        for name in STANDARD_SCALARS {
            assert!(registry.has_type(name));
        }
        assert_eq!(registry.scalars().len(), STANDARD_SCALARS.len());
        assert!(registry.types().is_empty());
        assert!(registry.schema_definition().is_none());
    }

    #[test]
    fn test_redefinition_keeps_first() {
        let mut defs = definitions("type Foo { a: Int } type Foo { b: String }").into_iter();
        let mut registry = TypeRegistry::new();

        assert!(registry.add(defs.next().unwrap()).is_ok());
        let err = registry.add(defs.next().unwrap()).unwrap_err();
        assert!(matches!(
            &err,
            SchemaError::TypeRedefinition { name, .. } if name == "Foo"
        ));
        assert_eq!(
            err.to_string(),
            "'Foo' type [@1:21] tried to redefine existing 'Foo' type [@1:1]"
        );

        let Some(TypeDefinition::Object(foo)) = registry.types().get("Foo").cloned() else {
            panic!("Foo should be an object type");
        };
        assert_eq!(foo.fields[0].name.value, "a");
    }

    #[test]
    fn test_namespaces_are_separate() {
        let registry = registry("scalar Date extend type Query { a: Date } type Query { b: Int }");
        assert!(registry.has_type("Date"));
        assert!(registry.type_extensions().contains_key("Query"));
        assert!(registry.types().contains_key("Query"));
        assert!(registry.scalars().contains_key("Date"));
    }

    #[test]
    fn test_second_schema_is_rejected() {
        let errors = TypeRegistry::from_definitions(definitions(
            "schema { query: A } schema { query: B }",
        ))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SchemaError::SchemaRedefinition { .. }));
    }

    #[test]
    fn test_from_definitions_continues_after_error() {
        let errors = TypeRegistry::from_definitions(definitions(
            "type A { a: Int } type A { a: Int } enum E { X } enum E { Y } scalar S scalar S",
        ))
        .unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_get_type_strips_decoration() {
        let registry = registry("type Dog { name: String }");
        let usage = Type::named("Dog").non_null().list().non_null();
        assert_eq!(registry.get_type(&usage).map(TypeDefinition::name), Some("Dog"));
        assert_eq!(
            registry.get_type(&Type::named("Long")).map(TypeDefinition::kind_str),
            Some("scalar")
        );
        assert!(registry.get_type(&Type::named("Cat")).is_none());
    }

    #[test]
    fn test_type_extension_is_not_a_type() {
        let registry = registry("extend type Query { a: Int }");
        assert!(registry.has_type("Query"));
        assert!(registry.get_type_by_name("Query").is_none());
    }

    #[test]
    fn test_merge_commits_everything() {
        let mut left = registry("type A { a: Int } schema { query: A }");
        let right = registry("type B { b: Int } scalar Date extend type A { c: Date }");

        assert!(left.merge(&right).is_ok());
        assert!(left.types().contains_key("B"));
        assert!(left.scalars().contains_key("Date"));
        assert!(left.type_extensions().contains_key("A"));
        assert!(left.schema_definition().is_some());
    }

    #[test]
    fn test_merge_takes_schema_only_when_missing() {
        let mut left = registry("type A { a: Int }");
        let right = registry("schema { query: A }");
        assert!(left.merge(&right).is_ok());
        assert!(left.schema_definition().is_some());

        let mut both = registry("schema { query: A }");
        let errors = both.merge(&right).unwrap_err();
        assert!(matches!(errors[..], [SchemaError::SchemaRedefinition { .. }]));
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut left = registry("type Shared { a: Int } type Left { l: Int }");
        let right = registry("type Fresh { f: Int } type Shared { b: Int } scalar Date");
        let left_before = left.types();

        let errors = left.merge(&right).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SchemaError::TypeRedefinition { name, .. } if name == "Shared"
        ));

        assert_eq!(left.types(), left_before);
        assert!(!left.has_type("Fresh"));
        assert!(!left.has_type("Date"));
        assert!(right.has_type("Fresh"));
    }
}
