//! The materialized, executable type graph.

use crate::resolver::{
    ResolverArgs, ResolverError, ResolverInfo, ResolverResult, SharedResolver, TypeResolver,
};
use crate::scalars::ScalarCodec;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A reference to a materialized type, wrapped in any nesting of list and
/// non-null decorations.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A materialized named type.
    Named(SchemaType),
    /// `[T]`
    List(Box<TypeRef>),
    /// `T!`
    NonNull(Box<TypeRef>),
    /// A type that was still being materialized when it was referenced.
    /// Resolve it through [`Schema::resolve`].
    Reference(String),
}

impl TypeRef {
    /// Wraps this type in a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Wraps this type in a non-null.
    #[must_use]
    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    /// Returns the innermost type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(ty) => ty.name(),
            Self::List(inner) | Self::NonNull(inner) => inner.name(),
            Self::Reference(name) => name,
        }
    }

    /// Returns the innermost materialized type, if it is not a placeholder.
    pub fn named_type(&self) -> Option<&SchemaType> {
        match self {
            Self::Named(ty) => Some(ty),
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
            Self::Reference(_) => None,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns true if the innermost type is a placeholder.
    pub fn is_reference(&self) -> bool {
        match self {
            Self::Reference(_) => true,
            Self::List(inner) | Self::NonNull(inner) => inner.is_reference(),
            Self::Named(_) => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(ty) => f.write_str(ty.name()),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::Reference(name) => f.write_str(name),
        }
    }
}

/// A materialized named type.
#[derive(Debug, Clone)]
pub enum SchemaType {
    Object(Arc<ObjectType>),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    Enum(Arc<EnumType>),
    Scalar(Arc<ScalarType>),
    InputObject(Arc<InputObjectType>),
}

impl SchemaType {
    pub fn name(&self) -> &str {
        match self {
            Self::Object(ty) => &ty.name,
            Self::Interface(ty) => &ty.name,
            Self::Union(ty) => &ty.name,
            Self::Enum(ty) => &ty.name,
            Self::Scalar(ty) => &ty.name,
            Self::InputObject(ty) => &ty.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Object(ty) => ty.description.as_deref(),
            Self::Interface(ty) => ty.description.as_deref(),
            Self::Union(ty) => ty.description.as_deref(),
            Self::Enum(ty) => ty.description.as_deref(),
            Self::Scalar(ty) => ty.description.as_deref(),
            Self::InputObject(ty) => ty.description.as_deref(),
        }
    }

    /// Returns true if both refer to the same materialized node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Interface(a), Self::Interface(b)) => Arc::ptr_eq(a, b),
            (Self::Union(a), Self::Union(b)) => Arc::ptr_eq(a, b),
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::Scalar(a), Self::Scalar(b)) => Arc::ptr_eq(a, b),
            (Self::InputObject(a), Self::InputObject(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectType>> {
        match self {
            Self::Object(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Arc<InterfaceType>> {
        match self {
            Self::Interface(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&Arc<UnionType>> {
        match self {
            Self::Union(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            Self::Enum(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Arc<ScalarType>> {
        match self {
            Self::Scalar(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_input_object(&self) -> Option<&Arc<InputObjectType>> {
        match self {
            Self::InputObject(ty) => Some(ty),
            _ => None,
        }
    }
}

/// An object type.
#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, Field>,
    pub interfaces: Vec<TypeRef>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Runs the resolver bound to `field_name` against `parent`.
    ///
    /// Arguments absent from `args` take the declared default, if any.
    pub fn resolve_field(
        &self,
        field_name: &str,
        parent: &Value,
        args: &ResolverArgs,
    ) -> ResolverResult {
        let field = self
            .field(field_name)
            .ok_or_else(|| ResolverError::FieldNotFound(format!("{}.{field_name}", self.name)))?;

        let mut args = args.clone();
        for arg in &field.arguments {
            match &arg.default_value {
                Some(default) if args.get(&arg.name).is_none() => {
                    args.set(arg.name.clone(), default.clone());
                }
                _ => {}
            }
        }

        let info = ResolverInfo::new(&field.name, &self.name).with_return_type(field.ty.to_string());
        field.resolver.resolve(parent, &args, &info)
    }
}

/// An interface type.
#[derive(Debug)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, Field>,
    pub type_resolver: TypeResolver,
}

/// A union type.
#[derive(Debug)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<TypeRef>,
    pub type_resolver: TypeResolver,
}

impl UnionType {
    /// Returns the member type names in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(TypeRef::name)
    }
}

/// An enum type.
#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

/// A value of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
}

/// A scalar type bound to its codec.
#[derive(Debug)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub codec: ScalarCodec,
}

/// An input object type.
#[derive(Debug)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputValue>,
}

impl InputObjectType {
    pub fn field(&self, name: &str) -> Option<&InputValue> {
        self.fields.get(name)
    }
}

/// A field of an object or interface type, with its bound resolver.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValue>,
    pub ty: TypeRef,
    pub resolver: SharedResolver,
}

impl Field {
    pub fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("ty", &self.ty.to_string())
            .finish_non_exhaustive()
    }
}

/// A field argument or input object field.
#[derive(Debug, Clone)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    /// Decoded default value, if one was declared.
    pub default_value: Option<serde_json::Value>,
}

/// An executable schema.
#[derive(Debug, Clone)]
pub struct Schema {
    query: Arc<ObjectType>,
    mutation: Option<Arc<ObjectType>>,
    types: IndexMap<String, SchemaType>,
}

impl Schema {
    pub(crate) fn new(
        query: Arc<ObjectType>,
        mutation: Option<Arc<ObjectType>>,
        types: IndexMap<String, SchemaType>,
    ) -> Self {
        Self {
            query,
            mutation,
            types,
        }
    }

    /// Returns the query root type.
    pub fn query_type(&self) -> &Arc<ObjectType> {
        &self.query
    }

    /// Returns the mutation root type, if any.
    pub fn mutation_type(&self) -> Option<&Arc<ObjectType>> {
        self.mutation.as_ref()
    }

    /// Returns every reachable named type, in materialization order.
    pub fn types(&self) -> &IndexMap<String, SchemaType> {
        &self.types
    }

    /// Looks up a reachable named type.
    pub fn get_type(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    /// Resolves the innermost named type of `ty`, following placeholders.
    pub fn resolve<'a>(&'a self, ty: &'a TypeRef) -> Option<&'a SchemaType> {
        match ty {
            TypeRef::Named(named) => Some(named),
            TypeRef::List(inner) | TypeRef::NonNull(inner) => self.resolve(inner),
            TypeRef::Reference(name) => self.types.get(name),
        }
    }
}
