//! Schema-first binding layer for gqlbind.
//!
//! SDL definitions are collected into a [`TypeRegistry`], checked against a
//! [`RuntimeWiring`] of scalar codecs and resolvers, and materialized into an
//! executable [`Schema`].
//!
//! This crate provides:
//! - `registry`: Type registry with redefinition detection and atomic merge
//! - `compiler`: Source text to registry
//! - `type_info`: List/non-null decoration stacks
//! - `wiring`: Scalar codecs, field resolvers and type resolvers
//! - `checker`: Pre-generation checks
//! - `generator`: Materialization of the executable schema
//! - `schema`: The materialized type graph
//! - `printer`: Schema to SDL

pub mod checker;
pub mod compiler;
pub mod errors;
pub mod generator;
pub mod printer;
pub mod registry;
pub mod resolver;
pub mod scalars;
pub mod schema;
pub mod type_info;
pub mod value;
pub mod wiring;

pub use checker::{check, TypeChecker};
pub use compiler::{compile, compile_all};
pub use errors::{to_diagnostics, ReferenceContext, SchemaError};
pub use generator::{make_executable_schema, SchemaGenerator};
pub use printer::{print_schema, print_schema_with_options, PrintOptions, SchemaPrinter};
pub use registry::TypeRegistry;
pub use resolver::{
    DefaultResolver, FnResolver, Resolver, ResolverArgs, ResolverError, ResolverInfo,
    ResolverResult, SharedResolver, TypeResolver,
};
pub use scalars::{Coercing, CoercionError, CoercionResult, ScalarCodec};
pub use schema::{
    EnumType, EnumValue, Field, InputObjectType, InputValue, InterfaceType, ObjectType,
    ScalarType, Schema, SchemaType, TypeRef, UnionType,
};
pub use type_info::{TypeInfo, Wrapping};
pub use value::decode_literal;
pub use wiring::{RuntimeWiring, TypeWiring};
