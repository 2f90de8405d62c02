//! Schema generator: materializes a checked registry into an executable
//! [`Schema`].

use crate::checker;
use crate::errors::SchemaError;
use crate::registry::TypeRegistry;
use crate::resolver::DefaultResolver;
use crate::schema::{
    EnumType, EnumValue, Field, InputObjectType, InputValue, InterfaceType, ObjectType, Schema,
    ScalarType, SchemaType, TypeRef, UnionType,
};
use crate::type_info::TypeInfo;
use crate::value::decode_literal;
use crate::wiring::RuntimeWiring;
use gqlbind_syntax::ast::{
    EnumTypeDefinition, FieldDefinition, InputValueDefinition, InterfaceTypeDefinition,
    ObjectTypeDefinition, OperationType, OperationTypeDefinition, ScalarTypeDefinition, Type,
    TypeDefinition, UnionTypeDefinition,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

type BuildResult<T> = Result<T, SchemaError>;

/// State for one generation call.
#[derive(Default)]
struct BuildContext {
    /// Names currently being materialized, innermost last.
    stack: Vec<String>,
    outputs: FxHashMap<String, SchemaType>,
    inputs: FxHashMap<String, SchemaType>,
    /// Every named type reached, in materialization order.
    reached: IndexMap<String, SchemaType>,
}

impl BuildContext {
    fn is_building(&self, name: &str) -> bool {
        self.stack.iter().any(|n| n == name)
    }

    fn add_output(&mut self, ty: SchemaType) {
        let name = ty.name().to_string();
        self.reached.insert(name.clone(), ty.clone());
        self.outputs.insert(name, ty);
    }

    fn add_input(&mut self, ty: SchemaType) {
        let name = ty.name().to_string();
        self.reached.entry(name.clone()).or_insert_with(|| ty.clone());
        self.inputs.insert(name, ty);
    }
}

/// Turns a [`TypeRegistry`] plus [`RuntimeWiring`] into an executable
/// [`Schema`].
pub struct SchemaGenerator<'a> {
    registry: &'a TypeRegistry,
    wiring: &'a RuntimeWiring,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(registry: &'a TypeRegistry, wiring: &'a RuntimeWiring) -> Self {
        Self { registry, wiring }
    }

    /// Checks the registry and, if it is clean, generates the schema.
    ///
    /// Either every checker error is returned, or the complete schema.
    pub fn generate(&self) -> Result<Schema, Vec<SchemaError>> {
        let errors = checker::check(self.registry, self.wiring);
        if !errors.is_empty() {
            debug!(errors = errors.len(), "schema generation skipped");
            return Err(errors);
        }
        self.build().map_err(|err| vec![err])
    }

    fn build(&self) -> BuildResult<Schema> {
        let schema = self
            .registry
            .schema_definition()
            .ok_or_else(|| internal("schema definition vanished after checking"))?;
        debug!(operations = schema.operations.len(), "generating schema");

        let mut ctx = BuildContext::default();

        let query = schema
            .operation(OperationType::Query)
            .ok_or_else(|| internal("query operation vanished after checking"))?;
        let query = self.build_operation(&mut ctx, query)?;

        let mutation = schema
            .operation(OperationType::Mutation)
            .map(|op| self.build_operation(&mut ctx, op))
            .transpose()?;

        debug!(types = ctx.reached.len(), "schema generated");
        Ok(Schema::new(query, mutation, ctx.reached))
    }

    fn build_operation(
        &self,
        ctx: &mut BuildContext,
        op: &OperationTypeDefinition,
    ) -> BuildResult<Arc<ObjectType>> {
        match self.build_output(ctx, &op.ty)? {
            TypeRef::Named(SchemaType::Object(object)) => Ok(object),
            other => Err(internal(format!(
                "{} operation type '{other}' is not an object type",
                op.operation
            ))),
        }
    }

    fn definition(&self, info: &TypeInfo) -> BuildResult<&'a TypeDefinition> {
        self.registry
            .get_type_by_name(info.name())
            .ok_or_else(|| internal(format!("type '{}' vanished after checking", info.name())))
    }

    /// Materializes a type in output position.
    fn build_output(&self, ctx: &mut BuildContext, ty: &Type) -> BuildResult<TypeRef> {
        let info = TypeInfo::new(ty);
        let def = self.definition(&info)?;

        if let Some(existing) = ctx.outputs.get(info.name()) {
            return Ok(info.decorate(TypeRef::Named(existing.clone())));
        }
        if ctx.is_building(info.name()) {
            debug!(name = info.name(), "inserting type reference");
            return Ok(info.decorate(TypeRef::Reference(info.name().to_string())));
        }

        ctx.stack.push(info.name().to_string());
        let built = match def {
            TypeDefinition::Object(def) => SchemaType::Object(Arc::new(self.build_object(ctx, def)?)),
            TypeDefinition::Interface(def) => {
                SchemaType::Interface(Arc::new(self.build_interface(ctx, def)?))
            }
            TypeDefinition::Union(def) => SchemaType::Union(Arc::new(self.build_union(ctx, def)?)),
            TypeDefinition::Enum(def) => SchemaType::Enum(Arc::new(build_enum(def))),
            TypeDefinition::Scalar(def) => SchemaType::Scalar(Arc::new(self.build_scalar(def)?)),
            TypeDefinition::InputObject(_) => {
                return Err(internal(format!(
                    "input type '{}' used in output position",
                    info.name()
                )))
            }
        };
        debug!(name = info.name(), kind = def.kind_str(), "materialized output type");

        ctx.add_output(built.clone());
        ctx.stack.pop();
        Ok(info.decorate(TypeRef::Named(built)))
    }

    /// Materializes a type in input position.
    fn build_input(&self, ctx: &mut BuildContext, ty: &Type) -> BuildResult<TypeRef> {
        let info = TypeInfo::new(ty);
        let def = self.definition(&info)?;

        if let Some(existing) = ctx.inputs.get(info.name()) {
            return Ok(info.decorate(TypeRef::Named(existing.clone())));
        }
        if ctx.is_building(info.name()) {
            debug!(name = info.name(), "inserting type reference");
            return Ok(info.decorate(TypeRef::Reference(info.name().to_string())));
        }

        ctx.stack.push(info.name().to_string());
        let built = match def {
            TypeDefinition::InputObject(def) => {
                let mut fields = IndexMap::new();
                for field in &def.fields {
                    if fields.contains_key(&field.name.value) {
                        return Err(internal(format!(
                            "input field '{}.{}' defined twice after checking",
                            def.name.value, field.name.value
                        )));
                    }
                    let value = self.build_input_value(ctx, field)?;
                    fields.insert(value.name.clone(), value);
                }
                SchemaType::InputObject(Arc::new(InputObjectType {
                    name: def.name.value.clone(),
                    description: def.description.as_ref().map(|d| d.value.clone()),
                    fields,
                }))
            }
            TypeDefinition::Enum(def) => SchemaType::Enum(Arc::new(build_enum(def))),
            TypeDefinition::Scalar(def) => SchemaType::Scalar(Arc::new(self.build_scalar(def)?)),
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                return Err(internal(format!(
                    "output type '{}' used in input position",
                    info.name()
                )))
            }
        };
        debug!(name = info.name(), kind = def.kind_str(), "materialized input type");

        ctx.add_input(built.clone());
        ctx.stack.pop();
        Ok(info.decorate(TypeRef::Named(built)))
    }

    fn build_object(
        &self,
        ctx: &mut BuildContext,
        def: &'a ObjectTypeDefinition,
    ) -> BuildResult<ObjectType> {
        let extension = self.registry.type_extension(&def.name.value);

        let field_defs = def
            .fields
            .iter()
            .chain(extension.into_iter().flat_map(|ext| &ext.fields));
        let fields = self.build_fields(ctx, &def.name.value, field_defs)?;

        let mut interfaces: Vec<TypeRef> = Vec::new();
        for named in def
            .implements
            .iter()
            .chain(extension.into_iter().flat_map(|ext| &ext.implements))
        {
            if interfaces.iter().any(|ty| ty.name() == named.name) {
                return Err(internal(format!(
                    "'{}' implements '{}' twice after checking",
                    def.name.value, named.name
                )));
            }
            interfaces.push(self.build_output(ctx, &Type::Named(named.clone()))?);
        }

        Ok(ObjectType {
            name: def.name.value.clone(),
            description: def.description.as_ref().map(|d| d.value.clone()),
            fields,
            interfaces,
        })
    }

    fn build_interface(
        &self,
        ctx: &mut BuildContext,
        def: &InterfaceTypeDefinition,
    ) -> BuildResult<InterfaceType> {
        let type_resolver = self.wiring.type_resolver(&def.name.value).ok_or_else(|| {
            internal(format!("no type resolver for interface '{}'", def.name.value))
        })?;

        Ok(InterfaceType {
            name: def.name.value.clone(),
            description: def.description.as_ref().map(|d| d.value.clone()),
            fields: self.build_fields(ctx, &def.name.value, &def.fields)?,
            type_resolver,
        })
    }

    fn build_union(&self, ctx: &mut BuildContext, def: &UnionTypeDefinition) -> BuildResult<UnionType> {
        let type_resolver = self
            .wiring
            .type_resolver(&def.name.value)
            .ok_or_else(|| internal(format!("no type resolver for union '{}'", def.name.value)))?;

        let members = def
            .members
            .iter()
            .map(|named| self.build_output(ctx, &Type::Named(named.clone())))
            .collect::<BuildResult<_>>()?;

        Ok(UnionType {
            name: def.name.value.clone(),
            description: def.description.as_ref().map(|d| d.value.clone()),
            members,
            type_resolver,
        })
    }

    fn build_scalar(&self, def: &ScalarTypeDefinition) -> BuildResult<ScalarType> {
        let codec = self
            .wiring
            .scalar_codec(&def.name.value)
            .ok_or_else(|| internal(format!("no codec for scalar '{}'", def.name.value)))?;

        let description = def
            .description
            .as_ref()
            .map(|d| d.value.clone())
            .or_else(|| codec.description().map(str::to_string));

        Ok(ScalarType {
            name: def.name.value.clone(),
            description,
            codec,
        })
    }

    fn build_fields<'d>(
        &self,
        ctx: &mut BuildContext,
        parent: &str,
        defs: impl IntoIterator<Item = &'d FieldDefinition>,
    ) -> BuildResult<IndexMap<String, Field>> {
        let mut fields = IndexMap::new();
        for def in defs {
            if fields.contains_key(&def.name.value) {
                return Err(internal(format!(
                    "field '{parent}.{}' defined twice after checking",
                    def.name.value
                )));
            }
            let field = self.build_field(ctx, parent, def)?;
            fields.insert(field.name.clone(), field);
        }
        Ok(fields)
    }

    fn build_field(
        &self,
        ctx: &mut BuildContext,
        parent: &str,
        def: &FieldDefinition,
    ) -> BuildResult<Field> {
        let arguments = def
            .arguments
            .iter()
            .map(|arg| self.build_input_value(ctx, arg))
            .collect::<BuildResult<_>>()?;
        let ty = self.build_output(ctx, &def.ty)?;
        let resolver = self
            .wiring
            .field_resolver(parent, &def.name.value)
            .unwrap_or_else(|| Arc::new(DefaultResolver));

        Ok(Field {
            name: def.name.value.clone(),
            description: def.description.as_ref().map(|d| d.value.clone()),
            arguments,
            ty,
            resolver,
        })
    }

    fn build_input_value(
        &self,
        ctx: &mut BuildContext,
        def: &InputValueDefinition,
    ) -> BuildResult<InputValue> {
        Ok(InputValue {
            name: def.name.value.clone(),
            description: def.description.as_ref().map(|d| d.value.clone()),
            ty: self.build_input(ctx, &def.ty)?,
            default_value: def.default_value.as_ref().map(decode_literal),
        })
    }
}

fn build_enum(def: &EnumTypeDefinition) -> EnumType {
    EnumType {
        name: def.name.value.clone(),
        description: def.description.as_ref().map(|d| d.value.clone()),
        values: def
            .values
            .iter()
            .map(|value| EnumValue {
                name: value.name.value.clone(),
                description: value.description.as_ref().map(|d| d.value.clone()),
            })
            .collect(),
    }
}

fn internal(message: impl Into<String>) -> SchemaError {
    SchemaError::Internal(message.into())
}

/// Checks `registry` against `wiring` and generates an executable schema.
pub fn make_executable_schema(
    registry: &TypeRegistry,
    wiring: &RuntimeWiring,
) -> Result<Schema, Vec<SchemaError>> {
    SchemaGenerator::new(registry, wiring).generate()
}
