//! Abstract syntax tree types for GraphQL type-system documents.
//!
//! Nodes own their names so a parsed document can outlive the source text it
//! came from; every definition-level node records both its byte [`Span`] and
//! the 1-based [`SourceLocation`] used in error messages.

use gqlbind_core::{SourceLocation, Span};
use std::fmt;

/// A complete document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub definitions: Vec<Definition>,
    pub span: Span,
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Schema(SchemaDefinition),
    Type(TypeDefinition),
    TypeExtension(TypeExtensionDefinition),
}

impl Definition {
    /// Returns the defined name, if the definition has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Schema(_) => None,
            Self::Type(def) => Some(def.name()),
            Self::TypeExtension(ext) => Some(&ext.name.value),
        }
    }

    /// Returns where the definition starts.
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::Schema(def) => def.location,
            Self::Type(def) => def.location(),
            Self::TypeExtension(ext) => ext.location,
        }
    }
}

/// Schema definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    pub directives: Vec<Directive>,
    pub operations: Vec<OperationTypeDefinition>,
    pub span: Span,
    pub location: SourceLocation,
}

impl SchemaDefinition {
    /// Returns the root operation of the given kind, if declared.
    pub fn operation(&self, operation: OperationType) -> Option<&OperationTypeDefinition> {
        self.operations.iter().find(|op| op.operation == operation)
    }
}

/// Operation type in schema (query/mutation/subscription).
#[derive(Debug, Clone, PartialEq)]
pub struct OperationTypeDefinition {
    pub operation: OperationType,
    pub ty: Type,
    pub span: Span,
    pub location: SourceLocation,
}

/// Type of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named type definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    Object(ObjectTypeDefinition),
    Interface(InterfaceTypeDefinition),
    Union(UnionTypeDefinition),
    Enum(EnumTypeDefinition),
    InputObject(InputObjectTypeDefinition),
    Scalar(ScalarTypeDefinition),
}

impl TypeDefinition {
    /// Returns the type name.
    pub fn name(&self) -> &str {
        &self.name_node().value
    }

    /// Returns the name node.
    pub fn name_node(&self) -> &Name {
        match self {
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
            Self::Scalar(def) => &def.name,
        }
    }

    /// Returns where the definition starts.
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::Object(def) => def.location,
            Self::Interface(def) => def.location,
            Self::Union(def) => def.location,
            Self::Enum(def) => def.location,
            Self::InputObject(def) => def.location,
            Self::Scalar(def) => def.location,
        }
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        let description = match self {
            Self::Object(def) => &def.description,
            Self::Interface(def) => &def.description,
            Self::Union(def) => &def.description,
            Self::Enum(def) => &def.description,
            Self::InputObject(def) => &def.description,
            Self::Scalar(def) => &def.description,
        };
        description.as_ref().map(|d| d.value.as_str())
    }

    /// Returns the keyword that introduces this kind of definition.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Object(_) => "type",
            Self::Interface(_) => "interface",
            Self::Union(_) => "union",
            Self::Enum(_) => "enum",
            Self::InputObject(_) => "input",
            Self::Scalar(_) => "scalar",
        }
    }
}

/// Object type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub implements: Vec<NamedType>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Interface type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Union type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub members: Vec<NamedType>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Enum type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub values: Vec<EnumValueDefinition>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Enum value definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input object type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub fields: Vec<InputValueDefinition>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Scalar type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
    pub location: SourceLocation,
}

impl ScalarTypeDefinition {
    /// Creates a scalar definition that did not come from source text.
    pub fn builtin(name: &str) -> Self {
        Self {
            description: None,
            name: Name::new(name, Span::default()),
            directives: Vec::new(),
            span: Span::default(),
            location: SourceLocation::default(),
        }
    }
}

/// `extend type` definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExtensionDefinition {
    pub name: Name,
    pub implements: Vec<NamedType>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: Type,
    pub directives: Vec<Directive>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Input value definition (arguments, input fields).
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
    pub location: SourceLocation,
}

/// Type usage: a named type wrapped by any nesting of lists and non-nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Named type: `User`
    Named(NamedType),
    /// List type: `[User]`
    List(Box<Type>, Span),
    /// Non-null type: `User!`
    NonNull(Box<Type>, Span),
}

impl Type {
    /// Creates a bare named type without position information.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(NamedType {
            name: name.into(),
            span: Span::default(),
            location: SourceLocation::default(),
        })
    }

    /// Wraps this type in a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self), Span::default())
    }

    /// Wraps this type in a non-null.
    #[must_use]
    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self), Span::default())
    }

    /// Returns the innermost named type.
    pub fn innermost(&self) -> &NamedType {
        match self {
            Self::Named(named) => named,
            Self::List(inner, _) | Self::NonNull(inner, _) => inner.innermost(),
        }
    }

    /// Returns the span of this usage.
    pub fn span(&self) -> Span {
        match self {
            Self::Named(named) => named.span,
            Self::List(_, span) | Self::NonNull(_, span) => *span,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => f.write_str(&named.name),
            Self::List(inner, _) => write!(f, "[{inner}]"),
            Self::NonNull(inner, _) => write!(f, "{inner}!"),
        }
    }
}

/// Reference to a type by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub span: Span,
    pub location: SourceLocation,
}

/// Directive usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

/// Argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Name,
    pub value: Value,
    pub span: Span,
}

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64, Span),
    Float(f64, Span),
    String(String, Span),
    Boolean(bool, Span),
    Null(Span),
    Enum(Name),
    List(Vec<Value>, Span),
    Object(Vec<(Name, Value)>, Span),
}

/// Name with span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
    pub span: Span,
}

impl Name {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Description (documentation string), already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub value: String,
    pub span: Span,
}

impl Description {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        let ty = Type::named("Pet").non_null().list().non_null();
        assert_eq!(ty.to_string(), "[Pet!]!");
        assert_eq!(ty.innermost().name, "Pet");
    }

    #[test]
    fn test_builtin_scalar_definition() {
        let def = TypeDefinition::Scalar(ScalarTypeDefinition::builtin("Long"));
        assert_eq!(def.name(), "Long");
        assert_eq!(def.kind_str(), "scalar");
    }
}
