//! Prints a materialized schema back to SDL.

use crate::scalars::is_standard_scalar;
use crate::schema::{
    EnumType, Field, InputObjectType, InputValue, InterfaceType, ObjectType, ScalarType, Schema,
    SchemaType, TypeRef, UnionType,
};
use serde_json::Value;

/// Printing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Print types whose name starts with `__`.
    pub include_introspection_types: bool,
    /// Print the built-in scalars. Custom scalars are always printed.
    pub include_standard_scalars: bool,
    /// Number of spaces per indentation level.
    pub indent_size: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            include_introspection_types: false,
            include_standard_scalars: false,
            indent_size: 2,
        }
    }
}

impl PrintOptions {
    #[must_use]
    pub fn with_introspection_types(mut self, include: bool) -> Self {
        self.include_introspection_types = include;
        self
    }

    #[must_use]
    pub fn with_standard_scalars(mut self, include: bool) -> Self {
        self.include_standard_scalars = include;
        self
    }

    #[must_use]
    pub fn with_indent_size(mut self, indent_size: usize) -> Self {
        self.indent_size = indent_size;
        self
    }
}

/// Group order of the printed type definitions.
const GROUPS: [fn(&SchemaType) -> bool; 6] = [
    |ty| matches!(ty, SchemaType::InputObject(_)),
    |ty| matches!(ty, SchemaType::Interface(_)),
    |ty| matches!(ty, SchemaType::Union(_)),
    |ty| matches!(ty, SchemaType::Object(_)),
    |ty| matches!(ty, SchemaType::Enum(_)),
    |ty| matches!(ty, SchemaType::Scalar(_)),
];

/// Schema printer.
pub struct SchemaPrinter<'s> {
    options: PrintOptions,
    schema: Option<&'s Schema>,
    output: String,
    indent: usize,
}

impl<'s> SchemaPrinter<'s> {
    /// Creates a new printer.
    pub fn new(options: PrintOptions) -> Self {
        Self {
            options,
            schema: None,
            output: String::new(),
            indent: 0,
        }
    }

    /// Prints a schema.
    ///
    /// The schema block comes first, followed by input objects, interfaces,
    /// unions, objects, enums and scalars, each group sorted by name.
    pub fn print(&mut self, schema: &'s Schema) -> String {
        self.output.clear();
        self.indent = 0;
        self.schema = Some(schema);

        self.print_schema_block(schema);

        for group in GROUPS {
            let mut types: Vec<_> = schema
                .types()
                .values()
                .filter(|ty| group(ty) && self.is_printed(ty))
                .collect();
            types.sort_by(|a, b| a.name().cmp(b.name()));

            for ty in types {
                self.output.push('\n');
                self.print_type(ty);
            }
        }

        self.schema = None;
        std::mem::take(&mut self.output)
    }

    fn is_printed(&self, ty: &SchemaType) -> bool {
        if ty.name().starts_with("__") && !self.options.include_introspection_types {
            return false;
        }
        match ty {
            SchemaType::Scalar(scalar) => {
                self.options.include_standard_scalars || !is_standard_scalar(&scalar.name)
            }
            _ => true,
        }
    }

    fn print_schema_block(&mut self, schema: &Schema) {
        self.output.push_str("schema {\n");
        self.indent += 1;
        self.push_indent();
        self.output.push_str("query: ");
        self.output.push_str(&schema.query_type().name);
        self.output.push('\n');
        if let Some(mutation) = schema.mutation_type() {
            self.push_indent();
            self.output.push_str("mutation: ");
            self.output.push_str(&mutation.name);
            self.output.push('\n');
        }
        self.indent -= 1;
        self.output.push_str("}\n");
    }

    fn print_type(&mut self, ty: &SchemaType) {
        match ty {
            SchemaType::Object(object) => self.print_object(object),
            SchemaType::Interface(interface) => self.print_interface(interface),
            SchemaType::Union(union) => self.print_union(union),
            SchemaType::Enum(en) => self.print_enum(en),
            SchemaType::Scalar(scalar) => self.print_scalar(scalar),
            SchemaType::InputObject(input) => self.print_input_object(input),
        }
    }

    fn print_object(&mut self, object: &ObjectType) {
        self.print_description(object.description.as_deref());
        self.output.push_str("type ");
        self.output.push_str(&object.name);
        if !object.interfaces.is_empty() {
            self.output.push_str(" implements ");
            for (i, interface) in object.interfaces.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(" & ");
                }
                self.output.push_str(interface.name());
            }
        }
        self.output.push_str(" {\n");
        self.indent += 1;
        self.print_fields(object.fields.values());
        self.indent -= 1;
        self.output.push_str("}\n");
    }

    fn print_interface(&mut self, interface: &InterfaceType) {
        self.print_description(interface.description.as_deref());
        self.output.push_str("interface ");
        self.output.push_str(&interface.name);
        self.output.push_str(" {\n");
        self.indent += 1;
        self.print_fields(interface.fields.values());
        self.indent -= 1;
        self.output.push_str("}\n");
    }

    fn print_union(&mut self, union: &UnionType) {
        self.print_description(union.description.as_deref());
        self.output.push_str("union ");
        self.output.push_str(&union.name);
        self.output.push_str(" = ");
        for (i, member) in union.member_names().enumerate() {
            if i > 0 {
                self.output.push_str(" | ");
            }
            self.output.push_str(member);
        }
        self.output.push('\n');
    }

    fn print_enum(&mut self, en: &EnumType) {
        self.print_description(en.description.as_deref());
        self.output.push_str("enum ");
        self.output.push_str(&en.name);
        self.output.push_str(" {\n");
        self.indent += 1;
        for value in &en.values {
            self.print_description(value.description.as_deref());
            self.push_indent();
            self.output.push_str(&value.name);
            self.output.push('\n');
        }
        self.indent -= 1;
        self.output.push_str("}\n");
    }

    fn print_scalar(&mut self, scalar: &ScalarType) {
        self.print_description(scalar.description.as_deref());
        self.output.push_str("scalar ");
        self.output.push_str(&scalar.name);
        self.output.push('\n');
    }

    fn print_input_object(&mut self, input: &InputObjectType) {
        self.print_description(input.description.as_deref());
        self.output.push_str("input ");
        self.output.push_str(&input.name);
        self.output.push_str(" {\n");
        self.indent += 1;
        for field in input.fields.values() {
            self.print_description(field.description.as_deref());
            self.push_indent();
            self.print_input_value(field);
            self.output.push('\n');
        }
        self.indent -= 1;
        self.output.push_str("}\n");
    }

    fn print_fields<'f>(&mut self, fields: impl Iterator<Item = &'f Field>) {
        for field in fields {
            self.print_description(field.description.as_deref());
            self.push_indent();
            self.output.push_str(&field.name);
            self.print_arguments(&field.arguments);
            self.output.push_str(": ");
            self.output.push_str(&field.ty.to_string());
            self.output.push('\n');
        }
    }

    fn print_arguments(&mut self, arguments: &[InputValue]) {
        if arguments.is_empty() {
            return;
        }

        // Described arguments go one per line.
        if arguments.iter().any(|arg| arg.description.is_some()) {
            self.output.push_str("(\n");
            self.indent += 1;
            for arg in arguments {
                self.print_description(arg.description.as_deref());
                self.push_indent();
                self.print_input_value(arg);
                self.output.push('\n');
            }
            self.indent -= 1;
            self.push_indent();
            self.output.push(')');
            return;
        }

        self.output.push('(');
        for (i, arg) in arguments.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.print_input_value(arg);
        }
        self.output.push(')');
    }

    fn print_input_value(&mut self, value: &InputValue) {
        self.output.push_str(&value.name);
        self.output.push_str(": ");
        self.output.push_str(&value.ty.to_string());
        if let Some(default) = &value.default_value {
            self.output.push_str(" = ");
            self.print_value(default, Some(&value.ty));
        }
    }

    /// Prints a decoded value as an SDL literal. Strings in enum position are
    /// printed as bare enum values.
    fn print_value(&mut self, value: &Value, ty: Option<&TypeRef>) {
        let named = match (self.schema, ty) {
            (Some(schema), Some(ty)) => schema.resolve(ty),
            _ => None,
        };

        match value {
            Value::Null => self.output.push_str("null"),
            Value::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.output.push_str(&n.to_string()),
            Value::String(s) => match named {
                Some(SchemaType::Enum(_)) => self.output.push_str(s),
                _ => self.push_string(s),
            },
            Value::Array(items) => {
                let item_ty = ty.and_then(list_item);
                self.output.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_value(item, item_ty);
                }
                self.output.push(']');
            }
            Value::Object(fields) => {
                let input = named.and_then(SchemaType::as_input_object).cloned();
                self.output.push('{');
                for (i, (name, field_value)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.output.push_str(name);
                    self.output.push_str(": ");
                    let field_ty = input.as_ref().and_then(|input| input.field(name)).map(|f| &f.ty);
                    self.print_value(field_value, field_ty);
                }
                self.output.push('}');
            }
        }
    }

    fn print_description(&mut self, description: Option<&str>) {
        let Some(description) = description else {
            return;
        };
        self.push_indent();
        if description.contains('\n') {
            self.output.push_str("\"\"\"\n");
            for line in description.lines() {
                self.push_indent();
                self.output.push_str(&line.replace("\"\"\"", "\\\"\"\""));
                self.output.push('\n');
            }
            self.push_indent();
            self.output.push_str("\"\"\"\n");
        } else {
            self.push_string(description);
            self.output.push('\n');
        }
    }

    fn push_string(&mut self, s: &str) {
        self.output.push('"');
        for c in s.chars() {
            match c {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    fn push_indent(&mut self) {
        for _ in 0..(self.indent * self.options.indent_size) {
            self.output.push(' ');
        }
    }
}

/// Strips non-null wrappers down to the list item type, if `ty` is a list.
fn list_item(ty: &TypeRef) -> Option<&TypeRef> {
    match ty {
        TypeRef::NonNull(inner) => list_item(inner),
        TypeRef::List(inner) => Some(inner),
        TypeRef::Named(_) | TypeRef::Reference(_) => None,
    }
}

/// Prints a schema with default options.
pub fn print_schema(schema: &Schema) -> String {
    SchemaPrinter::new(PrintOptions::default()).print(schema)
}

/// Prints a schema with custom options.
pub fn print_schema_with_options(schema: &Schema, options: PrintOptions) -> String {
    SchemaPrinter::new(options).print(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::generator::make_executable_schema;
    use crate::resolver::TypeResolver;
    use crate::scalars::{PassthroughCoercing, ScalarCodec};
    use crate::wiring::{RuntimeWiring, TypeWiring};

    fn schema(source: &str, wiring: &RuntimeWiring) -> Schema {
        let registry = match compile(source) {
            Ok(registry) => registry,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        match make_executable_schema(&registry, wiring) {
            Ok(schema) => schema,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    fn pet_wiring() -> RuntimeWiring {
        let mut wiring = RuntimeWiring::new();
        wiring
            .scalar(ScalarCodec::new("Date", PassthroughCoercing))
            .type_wiring(TypeWiring::new("Pet").type_resolver(TypeResolver::from_property("kind")))
            .type_wiring(TypeWiring::new("Named").type_resolver(TypeResolver::from_property("kind")));
        wiring
    }

    const PETS: &str = r#"
        scalar Date
        interface Named { name: String! }
        type Dog implements Named { name: String!, born: Date }
        type Cat implements Named { name: String!, lives: Int }
        union Pet = Dog | Cat
        enum Order { ASC DESC }
        input PetFilter { name: String, order: Order = DESC }
        type Query {
          pets(filter: PetFilter = {order: ASC}, first: Int = 10): [Pet!]!
          named: Named
        }
        schema { query: Query }
    "#;

    #[test]
    fn test_print_groups_and_order() {
        let output = print_schema(&schema(PETS, &pet_wiring()));
        insta::assert_snapshot!(output, @r#"
        schema {
          query: Query
        }

        input PetFilter {
          name: String
          order: Order = DESC
        }

        interface Named {
          name: String!
        }

        union Pet = Dog | Cat

        type Cat implements Named {
          name: String!
          lives: Int
        }

        type Dog implements Named {
          name: String!
          born: Date
        }

        type Query {
          pets(filter: PetFilter = {order: ASC}, first: Int = 10): [Pet!]!
          named: Named
        }

        enum Order {
          ASC
          DESC
        }

        scalar Date
        "#);
    }

    #[test]
    fn test_print_options() {
        let schema = schema(
            "type Query { a: Int } schema { query: Query }",
            &RuntimeWiring::new(),
        );

        assert!(!print_schema(&schema).contains("scalar Int"));

        let options = PrintOptions::default()
            .with_standard_scalars(true)
            .with_indent_size(4);
        let output = print_schema_with_options(&schema, options);
        assert!(output.contains("scalar Int"));
        assert!(output.contains("\n    a: Int\n"));
    }

    #[test]
    fn test_print_descriptions() {
        let output = print_schema(&schema(
            r#"
            """
            The root
            of everything
            """
            type Query {
              "Say \"hi\""
              hello(
                "who to greet"
                name: String = "world"
              ): String
            }
            schema { query: Query }
            "#,
            &RuntimeWiring::new(),
        ));

        insta::assert_snapshot!(output, @r#"
        schema {
          query: Query
        }

        """
        The root
        of everything
        """
        type Query {
          "Say \"hi\""
          hello(
            "who to greet"
            name: String = "world"
          ): String
        }
        "#);
    }
}
