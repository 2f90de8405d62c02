//! Runtime wiring: the caller-supplied scalar codecs, field resolvers and
//! type resolvers a schema is generated against.

use crate::resolver::{
    FnResolver, Resolver, ResolverArgs, ResolverInfo, ResolverResult, SharedResolver,
    TypeResolver,
};
use crate::scalars::ScalarCodec;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Bindings for a single type, merged into a [`RuntimeWiring`] with
/// [`RuntimeWiring::type_wiring`].
#[derive(Debug, Clone)]
pub struct TypeWiring {
    type_name: String,
    field_resolvers: IndexMap<String, SharedResolver>,
    type_resolver: Option<TypeResolver>,
}

impl TypeWiring {
    /// Starts the bindings for `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_resolvers: IndexMap::new(),
            type_resolver: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Binds a resolver to a field of this type.
    #[must_use]
    pub fn field_resolver(
        mut self,
        field_name: impl Into<String>,
        resolver: impl Resolver + 'static,
    ) -> Self {
        self.field_resolvers
            .insert(field_name.into(), Arc::new(resolver));
        self
    }

    /// Binds a resolver function to a field of this type.
    #[must_use]
    pub fn field_fn<F>(self, field_name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &ResolverArgs, &ResolverInfo) -> ResolverResult + Send + Sync + 'static,
    {
        self.field_resolver(field_name, FnResolver::new(f))
    }

    /// Sets the type resolver. Interfaces and unions must have one.
    #[must_use]
    pub fn type_resolver(mut self, resolver: TypeResolver) -> Self {
        self.type_resolver = Some(resolver);
        self
    }
}

/// Scalar codecs, field resolvers and type resolvers keyed by type name.
///
/// Every accessor hands out copies; a schema generated from a wiring keeps
/// its own handles and is unaffected by later changes to the wiring.
#[derive(Debug, Clone)]
pub struct RuntimeWiring {
    scalars: IndexMap<String, ScalarCodec>,
    field_resolvers: IndexMap<String, IndexMap<String, SharedResolver>>,
    type_resolvers: IndexMap<String, TypeResolver>,
}

impl Default for RuntimeWiring {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeWiring {
    /// Creates a wiring seeded with codecs for the built-in scalars.
    pub fn new() -> Self {
        Self {
            scalars: ScalarCodec::standard_set()
                .map(|codec| (codec.name().to_string(), codec))
                .collect(),
            field_resolvers: IndexMap::new(),
            type_resolvers: IndexMap::new(),
        }
    }

    /// Registers a scalar codec under its name, replacing any existing one.
    pub fn scalar(&mut self, codec: ScalarCodec) -> &mut Self {
        self.scalars.insert(codec.name().to_string(), codec);
        self
    }

    /// Merges the bindings of one type. Later bindings for the same field or
    /// type resolver replace earlier ones.
    pub fn type_wiring(&mut self, wiring: TypeWiring) -> &mut Self {
        let TypeWiring {
            type_name,
            field_resolvers,
            type_resolver,
        } = wiring;

        if let Some(resolver) = type_resolver {
            self.type_resolvers.insert(type_name.clone(), resolver);
        }
        if !field_resolvers.is_empty() {
            self.field_resolvers
                .entry(type_name)
                .or_default()
                .extend(field_resolvers);
        }
        self
    }

    /// Returns a copy of the registered scalar codecs.
    pub fn scalars(&self) -> IndexMap<String, ScalarCodec> {
        self.scalars.clone()
    }

    /// Returns a copy of the field resolvers, keyed by type then field name.
    pub fn field_resolvers(&self) -> IndexMap<String, IndexMap<String, SharedResolver>> {
        self.field_resolvers.clone()
    }

    /// Returns a copy of the registered type resolvers.
    pub fn type_resolvers(&self) -> IndexMap<String, TypeResolver> {
        self.type_resolvers.clone()
    }

    pub fn has_scalar(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    pub fn has_type_resolver(&self, type_name: &str) -> bool {
        self.type_resolvers.contains_key(type_name)
    }

    pub fn scalar_codec(&self, name: &str) -> Option<ScalarCodec> {
        self.scalars.get(name).cloned()
    }

    pub fn field_resolver(&self, type_name: &str, field_name: &str) -> Option<SharedResolver> {
        self.field_resolvers
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
            .cloned()
    }

    pub fn type_resolver(&self, type_name: &str) -> Option<TypeResolver> {
        self.type_resolvers.get(type_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalars::{PassthroughCoercing, STANDARD_SCALARS};
    use serde_json::json;

    #[test]
    fn test_seeded_with_standard_scalars() {
        let wiring = RuntimeWiring::new();
        for name in STANDARD_SCALARS {
            assert!(wiring.has_scalar(name), "missing codec for {name}");
        }
        assert!(!wiring.has_scalar("Date"));
    }

    #[test]
    fn test_type_wiring_merges() {
        let mut wiring = RuntimeWiring::new();
        wiring
            .type_wiring(TypeWiring::new("Query").field_fn("hello", |_, _, _| Ok(json!("hi"))))
            .type_wiring(
                TypeWiring::new("Query").field_fn("bye", |_, _, _| Ok(json!("bye"))),
            )
            .type_wiring(TypeWiring::new("Pet").type_resolver(TypeResolver::from_property("kind")));

        let hello = wiring.field_resolver("Query", "hello");
        let info = ResolverInfo::new("hello", "Query");
        assert_eq!(
            hello.map(|r| r.resolve(&json!({}), &ResolverArgs::new(), &info)),
            Some(Ok(json!("hi")))
        );
        assert!(wiring.field_resolver("Query", "bye").is_some());
        assert!(wiring.field_resolver("Query", "missing").is_none());
        assert!(wiring.has_type_resolver("Pet"));
        assert!(!wiring.has_type_resolver("Query"));
    }

    #[test]
    fn test_getters_return_copies() {
        let mut wiring = RuntimeWiring::new();
        let before = wiring.scalars();
        wiring.scalar(ScalarCodec::new("Date", PassthroughCoercing));

        assert!(!before.contains_key("Date"));
        assert!(wiring.scalars().contains_key("Date"));
    }

    #[test]
    fn test_scalar_override() {
        let mut wiring = RuntimeWiring::new();
        wiring.scalar(ScalarCodec::new("Int", PassthroughCoercing).with_description("lenient"));

        let codec = wiring.scalar_codec("Int");
        assert_eq!(codec.as_ref().and_then(ScalarCodec::description), Some("lenient"));
        assert_eq!(
            codec.map(|c| c.serialize(&json!("not a number"))),
            Some(Ok(json!("not a number")))
        );
    }
}
