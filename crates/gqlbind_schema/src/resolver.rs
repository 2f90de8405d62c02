//! Resolver contracts bound into a generated schema.
//!
//! A [`Resolver`] supplies a field's value from its parent value and
//! arguments. A [`TypeResolver`] picks the concrete object type of a value
//! returned for an interface or union field.

use serde_json::Value;
use std::fmt::{self, Debug};
use std::sync::Arc;
use thiserror::Error;

/// Arguments passed to a resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverArgs {
    args: serde_json::Map<String, Value>,
}

impl ResolverArgs {
    /// Creates new resolver args.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets an argument by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Gets an argument as a specific type.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.args
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Gets a required argument, returning an error if not found.
    pub fn require<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, ResolverError> {
        let value = self
            .args
            .get(name)
            .ok_or_else(|| ResolverError::MissingArgument(name.to_string()))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ResolverError::ArgumentParseError(name.to_string(), e.to_string()))
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Sets an argument.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.args.insert(name.into(), value);
    }
}

/// Info about the field being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverInfo {
    /// The field name being resolved.
    pub field_name: String,

    /// The parent type name.
    pub parent_type: String,

    /// The return type, rendered in SDL form.
    pub return_type: String,
}

impl ResolverInfo {
    /// Creates new resolver info.
    pub fn new(field_name: impl Into<String>, parent_type: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            parent_type: parent_type.into(),
            return_type: String::new(),
        }
    }

    /// Sets the return type.
    #[must_use]
    pub fn with_return_type(mut self, ty: impl Into<String>) -> Self {
        self.return_type = ty.into();
        self
    }
}

/// Result type for resolvers.
pub type ResolverResult = Result<Value, ResolverError>;

/// Error from a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Failed to parse argument '{0}': {1}")]
    ArgumentParseError(String, String),

    #[error("{0}")]
    Custom(String),
}

/// Trait for field resolvers.
pub trait Resolver: Send + Sync {
    /// Resolves a field value.
    fn resolve(&self, parent: &Value, args: &ResolverArgs, info: &ResolverInfo) -> ResolverResult;
}

impl Debug for dyn Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<resolver>")
    }
}

/// A resolver shared between the wiring and every schema built from it.
pub type SharedResolver = Arc<dyn Resolver>;

/// A resolver function.
pub type ResolverFn = Arc<dyn Fn(&Value, &ResolverArgs, &ResolverInfo) -> ResolverResult + Send + Sync>;

/// A wrapper for resolver functions.
#[derive(Clone)]
pub struct FnResolver {
    func: ResolverFn,
}

impl FnResolver {
    /// Creates a new function resolver.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &ResolverArgs, &ResolverInfo) -> ResolverResult + Send + Sync + 'static,
    {
        Self { func: Arc::new(f) }
    }
}

impl Resolver for FnResolver {
    fn resolve(&self, parent: &Value, args: &ResolverArgs, info: &ResolverInfo) -> ResolverResult {
        (self.func)(parent, args, info)
    }
}

impl Debug for FnResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

/// Default resolver that reads the property named like the field off the parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl Resolver for DefaultResolver {
    fn resolve(&self, parent: &Value, _args: &ResolverArgs, info: &ResolverInfo) -> ResolverResult {
        match parent {
            Value::Object(map) => Ok(map.get(&info.field_name).cloned().unwrap_or(Value::Null)),
            Value::Null => Ok(Value::Null),
            _ => Err(ResolverError::FieldNotFound(info.field_name.clone())),
        }
    }
}

/// Picks the concrete object type name for a value of an abstract type.
#[derive(Clone)]
pub struct TypeResolver {
    func: Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>,
}

impl TypeResolver {
    /// Creates a new type resolver.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self { func: Arc::new(f) }
    }

    /// Creates a type resolver that reads the type name from a property,
    /// for example `__typename`.
    pub fn from_property(property: impl Into<String>) -> Self {
        let property = property.into();
        Self::new(move |value| value.get(&property)?.as_str().map(str::to_string))
    }

    /// Returns the object type name for a value, if it can be determined.
    pub fn resolve_type(&self, value: &Value) -> Option<String> {
        (self.func)(value)
    }
}

impl Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver").finish_non_exhaustive()
    }
}
