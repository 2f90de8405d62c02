//! Recursive descent parser for GraphQL type-system documents.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use gqlbind_core::{LineIndex, SourceLocation, Span};
use thiserror::Error;

/// A syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
#[error("Invalid syntax: {message} {location}")]
#[diagnostic(code(gqlbind::syntax))]
pub struct SyntaxError {
    pub message: String,
    #[label("here")]
    pub span: Span,
    pub location: SourceLocation,
}

type ParseResult<T> = Result<T, SyntaxError>;

/// Parses a source string into a document.
pub fn parse(source: &str) -> Result<Document, SyntaxError> {
    Parser::new(source).parse_document()
}

/// Parser for GraphQL SDL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lines: LineIndex,
    current: Token,
    prev_end: u32,
}

impl<'a> Parser<'a> {
    /// Creates a new parser.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            lines: LineIndex::new(source),
            current,
            prev_end: 0,
        }
    }

    #[inline]
    fn at(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn advance(&mut self) {
        self.prev_end = self.current.span.end;
        self.current = self.lexer.next_token();
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error_expected(&format!("'{kind}'")))
        }
    }

    fn current_text(&self) -> &'a str {
        self.lexer.span_text(self.current.span)
    }

    fn location_here(&self) -> SourceLocation {
        self.lines.span_start(self.current.span)
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            span: self.current.span,
            location: self.location_here(),
        }
    }

    fn error_expected(&self, expected: &str) -> SyntaxError {
        let found = match self.at() {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.current_text()),
        };
        self.error(format!("expected {expected}, found {found}"))
    }

    /// Parses a document.
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let start = self.current.span.start;
        let mut definitions = Vec::new();

        while !self.at_kind(TokenKind::Eof) {
            definitions.push(self.parse_definition()?);
        }

        Ok(Document {
            definitions,
            span: Span::new(start, self.current.span.end),
        })
    }

    fn parse_definition(&mut self) -> ParseResult<Definition> {
        let start = self.current.span.start;
        let location = self.location_here();
        let description = self.parse_description()?;

        let definition = match self.at() {
            TokenKind::Schema => Definition::Schema(self.parse_schema_definition(start, location)?),
            TokenKind::Type => Definition::Type(TypeDefinition::Object(
                self.parse_object_type(description, start, location)?,
            )),
            TokenKind::Interface => Definition::Type(TypeDefinition::Interface(
                self.parse_interface_type(description, start, location)?,
            )),
            TokenKind::Union => Definition::Type(TypeDefinition::Union(
                self.parse_union_type(description, start, location)?,
            )),
            TokenKind::Enum => Definition::Type(TypeDefinition::Enum(
                self.parse_enum_type(description, start, location)?,
            )),
            TokenKind::Input => Definition::Type(TypeDefinition::InputObject(
                self.parse_input_object_type(description, start, location)?,
            )),
            TokenKind::Scalar => Definition::Type(TypeDefinition::Scalar(
                self.parse_scalar_type(description, start, location)?,
            )),
            TokenKind::Extend => {
                if description.is_some() {
                    return Err(self.error("type extensions cannot have a description"));
                }
                Definition::TypeExtension(self.parse_type_extension(start, location)?)
            }
            _ => return Err(self.error_expected("definition")),
        };
        Ok(definition)
    }

    fn parse_description(&mut self) -> ParseResult<Option<Description>> {
        if !self.at().is_string() {
            return Ok(None);
        }
        let span = self.current.span;
        let value = self.parse_string_contents()?;
        Ok(Some(Description::new(value, span)))
    }

    /// Consumes the current string token and returns its processed contents.
    fn parse_string_contents(&mut self) -> ParseResult<String> {
        let text = self.current_text();
        let value = match self.at() {
            TokenKind::BlockStringLiteral => block_string_value(&text[3..text.len() - 3]),
            _ => unescape_string(&text[1..text.len() - 1]).map_err(|msg| self.error(msg))?,
        };
        self.advance();
        Ok(value)
    }

    /// Names are identifiers or keywords; `type`, `input` etc. are valid field names.
    fn parse_name(&mut self) -> ParseResult<Name> {
        if self.at().is_name() {
            let name = Name::new(self.current_text(), self.current.span);
            self.advance();
            Ok(name)
        } else {
            Err(self.error_expected("name"))
        }
    }

    fn parse_named_type(&mut self) -> ParseResult<NamedType> {
        let location = self.location_here();
        let name = self.parse_name()?;
        Ok(NamedType {
            name: name.value,
            span: name.span,
            location,
        })
    }

    fn parse_schema_definition(
        &mut self,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<SchemaDefinition> {
        self.expect(TokenKind::Schema)?;
        let directives = self.parse_directives()?;
        self.expect(TokenKind::LBrace)?;

        let mut operations = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            let op_start = self.current.span.start;
            let op_location = self.location_here();
            let Some(operation) = self.at().operation_type() else {
                return Err(self.error_expected("'query', 'mutation' or 'subscription'"));
            };
            self.advance();
            self.expect(TokenKind::Colon)?;
            let ty = Type::Named(self.parse_named_type()?);
            operations.push(OperationTypeDefinition {
                operation,
                ty,
                span: self.span_from(op_start),
                location: op_location,
            });
        }

        Ok(SchemaDefinition {
            directives,
            operations,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_object_type(
        &mut self,
        description: Option<Description>,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<ObjectTypeDefinition> {
        self.expect(TokenKind::Type)?;
        let name = self.parse_name()?;
        let implements = self.parse_implements()?;
        let directives = self.parse_directives()?;
        let fields = self.parse_field_definitions()?;

        Ok(ObjectTypeDefinition {
            description,
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_type_extension(
        &mut self,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<TypeExtensionDefinition> {
        self.expect(TokenKind::Extend)?;
        self.expect(TokenKind::Type)?;
        let name = self.parse_name()?;
        let implements = self.parse_implements()?;
        let directives = self.parse_directives()?;
        let fields = self.parse_field_definitions()?;

        Ok(TypeExtensionDefinition {
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_interface_type(
        &mut self,
        description: Option<Description>,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<InterfaceTypeDefinition> {
        self.expect(TokenKind::Interface)?;
        let name = self.parse_name()?;
        let directives = self.parse_directives()?;
        let fields = self.parse_field_definitions()?;

        Ok(InterfaceTypeDefinition {
            description,
            name,
            directives,
            fields,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_union_type(
        &mut self,
        description: Option<Description>,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<UnionTypeDefinition> {
        self.expect(TokenKind::Union)?;
        let name = self.parse_name()?;
        let directives = self.parse_directives()?;

        let mut members = Vec::new();
        if self.eat(TokenKind::Eq) {
            self.eat(TokenKind::Pipe);
            members.push(self.parse_named_type()?);
            while self.eat(TokenKind::Pipe) {
                members.push(self.parse_named_type()?);
            }
        }

        Ok(UnionTypeDefinition {
            description,
            name,
            directives,
            members,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_enum_type(
        &mut self,
        description: Option<Description>,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<EnumTypeDefinition> {
        self.expect(TokenKind::Enum)?;
        let name = self.parse_name()?;
        let directives = self.parse_directives()?;

        let mut values = Vec::new();
        if self.eat(TokenKind::LBrace) {
            while !self.eat(TokenKind::RBrace) {
                let value_start = self.current.span.start;
                let description = self.parse_description()?;
                if matches!(
                    self.at(),
                    TokenKind::True | TokenKind::False | TokenKind::Null
                ) {
                    return Err(self.error(format!(
                        "'{}' cannot be used as an enum value",
                        self.current_text()
                    )));
                }
                let name = self.parse_name()?;
                let directives = self.parse_directives()?;
                values.push(EnumValueDefinition {
                    description,
                    name,
                    directives,
                    span: self.span_from(value_start),
                });
            }
        }

        Ok(EnumTypeDefinition {
            description,
            name,
            directives,
            values,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_input_object_type(
        &mut self,
        description: Option<Description>,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<InputObjectTypeDefinition> {
        self.expect(TokenKind::Input)?;
        let name = self.parse_name()?;
        let directives = self.parse_directives()?;

        let mut fields = Vec::new();
        if self.eat(TokenKind::LBrace) {
            while !self.eat(TokenKind::RBrace) {
                fields.push(self.parse_input_value_definition()?);
            }
        }

        Ok(InputObjectTypeDefinition {
            description,
            name,
            directives,
            fields,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_scalar_type(
        &mut self,
        description: Option<Description>,
        start: u32,
        location: SourceLocation,
    ) -> ParseResult<ScalarTypeDefinition> {
        self.expect(TokenKind::Scalar)?;
        let name = self.parse_name()?;
        let directives = self.parse_directives()?;

        Ok(ScalarTypeDefinition {
            description,
            name,
            directives,
            span: self.span_from(start),
            location,
        })
    }

    /// Parses `implements A & B`; a leading `&` is allowed.
    fn parse_implements(&mut self) -> ParseResult<Vec<NamedType>> {
        let mut interfaces = Vec::new();
        if self.eat(TokenKind::Implements) {
            self.eat(TokenKind::Amp);
            interfaces.push(self.parse_named_type()?);
            while self.eat(TokenKind::Amp) || self.at_kind(TokenKind::Ident) {
                interfaces.push(self.parse_named_type()?);
            }
        }
        Ok(interfaces)
    }

    fn parse_field_definitions(&mut self) -> ParseResult<Vec<FieldDefinition>> {
        let mut fields = Vec::new();
        if self.eat(TokenKind::LBrace) {
            while !self.eat(TokenKind::RBrace) {
                fields.push(self.parse_field_definition()?);
            }
        }
        Ok(fields)
    }

    fn parse_field_definition(&mut self) -> ParseResult<FieldDefinition> {
        let start = self.current.span.start;
        let location = self.location_here();
        let description = self.parse_description()?;
        let name = self.parse_name()?;

        let mut arguments = Vec::new();
        if self.eat(TokenKind::LParen) {
            while !self.eat(TokenKind::RParen) {
                arguments.push(self.parse_input_value_definition()?);
            }
        }

        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let directives = self.parse_directives()?;

        Ok(FieldDefinition {
            description,
            name,
            arguments,
            ty,
            directives,
            span: self.span_from(start),
            location,
        })
    }

    fn parse_input_value_definition(&mut self) -> ParseResult<InputValueDefinition> {
        let start = self.current.span.start;
        let location = self.location_here();
        let description = self.parse_description()?;
        let name = self.parse_name()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        let default_value = if self.eat(TokenKind::Eq) {
            Some(self.parse_value()?)
        } else {
            None
        };
        let directives = self.parse_directives()?;

        Ok(InputValueDefinition {
            description,
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
            location,
        })
    }

    /// Parses a type usage: `Name`, `[Type]`, either optionally followed by `!`.
    fn parse_type(&mut self) -> ParseResult<Type> {
        let start = self.current.span.start;

        let ty = if self.eat(TokenKind::LBracket) {
            let inner = self.parse_type()?;
            self.expect(TokenKind::RBracket)?;
            Type::List(Box::new(inner), self.span_from(start))
        } else {
            Type::Named(self.parse_named_type()?)
        };

        if self.eat(TokenKind::Bang) {
            Ok(Type::NonNull(Box::new(ty), self.span_from(start)))
        } else {
            Ok(ty)
        }
    }

    fn parse_directives(&mut self) -> ParseResult<Vec<Directive>> {
        let mut directives = Vec::new();
        while self.at_kind(TokenKind::At) {
            directives.push(self.parse_directive()?);
        }
        Ok(directives)
    }

    fn parse_directive(&mut self) -> ParseResult<Directive> {
        let start = self.current.span.start;
        self.expect(TokenKind::At)?;
        let name = self.parse_name()?;

        let mut arguments = Vec::new();
        if self.eat(TokenKind::LParen) {
            while !self.eat(TokenKind::RParen) {
                let arg_start = self.current.span.start;
                let name = self.parse_name()?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_value()?;
                arguments.push(Argument {
                    name,
                    value,
                    span: self.span_from(arg_start),
                });
            }
        }

        Ok(Directive {
            name,
            arguments,
            span: self.span_from(start),
        })
    }

    /// Parses a constant value.
    fn parse_value(&mut self) -> ParseResult<Value> {
        let start = self.current.span.start;

        match self.at() {
            TokenKind::IntLiteral => {
                let value = self
                    .current_text()
                    .parse()
                    .map_err(|_| self.error("integer literal out of range"))?;
                self.advance();
                Ok(Value::Int(value, self.span_from(start)))
            }
            TokenKind::FloatLiteral => {
                let value = self
                    .current_text()
                    .parse()
                    .map_err(|_| self.error("invalid float literal"))?;
                self.advance();
                Ok(Value::Float(value, self.span_from(start)))
            }
            kind if kind.is_string() => {
                let value = self.parse_string_contents()?;
                Ok(Value::String(value, self.span_from(start)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Value::Boolean(true, self.span_from(start)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Value::Boolean(false, self.span_from(start)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Value::Null(self.span_from(start)))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut values = Vec::new();
                while !self.eat(TokenKind::RBracket) {
                    values.push(self.parse_value()?);
                }
                Ok(Value::List(values, self.span_from(start)))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.eat(TokenKind::RBrace) {
                    let name = self.parse_name()?;
                    self.expect(TokenKind::Colon)?;
                    let value = self.parse_value()?;
                    fields.push((name, value));
                }
                Ok(Value::Object(fields, self.span_from(start)))
            }
            kind if kind.is_name() => Ok(Value::Enum(self.parse_name()?)),
            _ => Err(self.error_expected("value")),
        }
    }
}

/// Resolves escape sequences in the body of a `"..."` string.
fn unescape_string(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape '\\u{hex}'"))?;
                out.push(code);
            }
            Some(other) => return Err(format!("invalid escape sequence '\\{other}'")),
            None => return Err("unterminated escape sequence".to_string()),
        }
    }

    Ok(out)
}

/// Computes the value of a `"""..."""` block string: strips the common
/// indentation and leading/trailing blank lines.
fn block_string_value(raw: &str) -> String {
    let raw = raw.replace("\\\"\"\"", "\"\"\"");
    let lines: Vec<&str> = raw.lines().collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            (indent < line.len()).then_some(indent)
        })
        .min()
        .unwrap_or(0);

    let mut processed: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                *line
            } else {
                line.get(common_indent..).unwrap_or("")
            }
        })
        .collect();

    while processed.first().is_some_and(|l| l.trim().is_empty()) {
        processed.remove(0);
    }
    while processed.last().is_some_and(|l| l.trim().is_empty()) {
        processed.pop();
    }

    processed.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Document {
        match parse(source) {
            Ok(doc) => doc,
            Err(err) => panic!("unexpected syntax error: {err}"),
        }
    }

    fn only_type(doc: &Document) -> &TypeDefinition {
        match &doc.definitions[..] {
            [Definition::Type(def)] => def,
            other => panic!("expected a single type definition, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_simple_type() {
        let doc = parse_ok("type Query { hello: String }");
        let TypeDefinition::Object(obj) = only_type(&doc) else {
            panic!("expected object type");
        };
        assert_eq!(obj.name.value, "Query");
        assert_eq!(obj.fields.len(), 1);
        assert_eq!(obj.fields[0].name.value, "hello");
        assert_eq!(obj.fields[0].ty.to_string(), "String");
    }

    #[test]
    fn test_parse_schema_definition() {
        let doc = parse_ok("schema { query: Query mutation: Mutation subscription: Events }");
        let [Definition::Schema(schema)] = &doc.definitions[..] else {
            panic!("expected schema definition");
        };
        assert_eq!(schema.operations.len(), 3);
        let query = schema.operation(OperationType::Query);
        assert_eq!(query.map(|op| op.ty.to_string()), Some("Query".to_string()));
        assert!(schema.operation(OperationType::Subscription).is_some());
    }

    #[test]
    fn test_parse_nested_wrapping() {
        let doc = parse_ok("type T { grid: [[Int!]]! }");
        let TypeDefinition::Object(obj) = only_type(&doc) else {
            panic!("expected object type");
        };
        assert_eq!(obj.fields[0].ty.to_string(), "[[Int!]]!");
        assert_eq!(obj.fields[0].ty.innermost().name, "Int");
    }

    #[test]
    fn test_parse_implements_and_arguments() {
        let doc = parse_ok(
            r#"
            type Dog implements Named & Pet {
              name(upper: Boolean = false, tags: [String] = ["a", "b"]): String!
            }
            "#,
        );
        let TypeDefinition::Object(obj) = only_type(&doc) else {
            panic!("expected object type");
        };
        let names: Vec<_> = obj.implements.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Named", "Pet"]);

        let args = &obj.fields[0].arguments;
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0].default_value, Some(Value::Boolean(false, _))));
        assert!(matches!(&args[1].default_value, Some(Value::List(items, _)) if items.len() == 2));
    }

    #[test]
    fn test_parse_union_enum_input_scalar() {
        let doc = parse_ok(
            r#"
            union Pet = | Dog | Cat
            enum Color { RED GREEN }
            input Filter { color: Color = RED, limit: Int = 10 }
            scalar Date @specifiedBy(url: "https://example.com")
            "#,
        );
        assert_eq!(doc.definitions.len(), 4);
        let Definition::Type(TypeDefinition::Union(union)) = &doc.definitions[0] else {
            panic!("expected union");
        };
        assert_eq!(union.members.len(), 2);
        let Definition::Type(TypeDefinition::Scalar(scalar)) = &doc.definitions[3] else {
            panic!("expected scalar");
        };
        assert_eq!(scalar.directives[0].name.value, "specifiedBy");
    }

    #[test]
    fn test_parse_extension_and_keyword_field_names() {
        let doc = parse_ok("extend type Query { type: String input: Int }");
        let [Definition::TypeExtension(ext)] = &doc.definitions[..] else {
            panic!("expected type extension");
        };
        assert_eq!(ext.name.value, "Query");
        assert_eq!(ext.fields[0].name.value, "type");
        assert_eq!(ext.fields[1].name.value, "input");
    }

    #[test]
    fn test_parse_descriptions() {
        let doc = parse_ok(
            "\"\"\"\n    A query root.\n      Indented.\n\"\"\"\ntype Query {\n  \"greets \\\"you\\\"\" hello: String\n}",
        );
        let TypeDefinition::Object(obj) = only_type(&doc) else {
            panic!("expected object type");
        };
        assert_eq!(
            obj.description.as_ref().map(|d| d.value.as_str()),
            Some("A query root.\n  Indented.")
        );
        assert_eq!(
            obj.fields[0].description.as_ref().map(|d| d.value.as_str()),
            Some("greets \"you\"")
        );
    }

    #[test]
    fn test_locations_are_one_based() {
        let doc = parse_ok("\ntype Query {\n  hello: String\n}");
        let TypeDefinition::Object(obj) = only_type(&doc) else {
            panic!("expected object type");
        };
        assert_eq!(obj.location, SourceLocation::new(2, 1));
        assert_eq!(obj.fields[0].location, SourceLocation::new(3, 3));
    }

    #[test]
    fn test_syntax_error_is_fail_fast_with_location() {
        let err = parse("type Query {\n  hello String\n}\ntype ???").unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 9));
        assert_eq!(
            err.to_string(),
            "Invalid syntax: expected ':', found 'String' [@2:9]"
        );

        let labels: Vec<_> = miette::Diagnostic::labels(&err)
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 21);
        assert_eq!(labels[0].len(), 6);
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = parse("type Query {").unwrap_err();
        assert!(err.message.contains("end of input"));
    }

    #[test]
    fn test_invalid_escape() {
        let err = parse(r#"type Q { a(x: String = "\q"): Int }"#).unwrap_err();
        assert!(err.message.contains("invalid escape"));
    }
}
