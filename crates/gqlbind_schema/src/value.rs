//! Decoding of literal values written in IDL, such as argument defaults.

use gqlbind_syntax::ast;
use serde_json::{Map, Number, Value};

/// Decodes a literal into a runtime value.
///
/// Enum values become their name as a string and input objects keep their
/// field order. A float that JSON cannot represent decodes to null.
pub fn decode_literal(value: &ast::Value) -> Value {
    match value {
        ast::Value::Int(i, _) => Value::from(*i),
        ast::Value::Float(f, _) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        ast::Value::String(s, _) => Value::String(s.clone()),
        ast::Value::Boolean(b, _) => Value::Bool(*b),
        ast::Value::Null(_) => Value::Null,
        ast::Value::Enum(name) => Value::String(name.value.clone()),
        ast::Value::List(items, _) => Value::Array(items.iter().map(decode_literal).collect()),
        ast::Value::Object(fields, _) => {
            let mut map = Map::new();
            for (name, value) in fields {
                map.insert(name.value.clone(), decode_literal(value));
            }
            Value::Object(map)
        }
    }
}
