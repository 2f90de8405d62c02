//! Scalar codecs and the built-in scalar set.

use serde_json::{Number, Value};
use std::fmt::{self, Debug};
use std::sync::Arc;
use thiserror::Error;

/// Names of the scalars every registry and wiring knows about.
pub const STANDARD_SCALARS: [&str; 11] = [
    "Int",
    "Float",
    "String",
    "Boolean",
    "ID",
    "Long",
    "BigInteger",
    "BigDecimal",
    "Short",
    "Byte",
    "Char",
];

/// Returns true if `name` is one of the built-in scalars.
pub fn is_standard_scalar(name: &str) -> bool {
    STANDARD_SCALARS.contains(&name)
}

/// Failure to coerce a value to or from a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("Expected type '{scalar}' but was '{value}'")]
    InvalidValue { scalar: String, value: String },

    #[error("Value '{value}' is out of range for type '{scalar}'")]
    OutOfRange { scalar: String, value: String },
}

impl CoercionError {
    fn invalid(scalar: &str, value: &Value) -> Self {
        Self::InvalidValue {
            scalar: scalar.to_string(),
            value: value.to_string(),
        }
    }

    fn out_of_range(scalar: &str, value: &Value) -> Self {
        Self::OutOfRange {
            scalar: scalar.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result of a scalar coercion.
pub type CoercionResult = Result<Value, CoercionError>;

/// Runtime behaviour of a scalar type.
pub trait Coercing: Send + Sync {
    /// Converts a resolved value into its response form.
    fn serialize(&self, value: &Value) -> CoercionResult;

    /// Converts a variable value into the internal form.
    fn parse_value(&self, value: &Value) -> CoercionResult;

    /// Converts a decoded query literal into the internal form.
    fn parse_literal(&self, value: &Value) -> CoercionResult;
}

/// A named scalar codec.
#[derive(Clone)]
pub struct ScalarCodec {
    name: String,
    description: Option<String>,
    coercing: Arc<dyn Coercing>,
}

impl ScalarCodec {
    /// Creates a codec for the scalar `name`.
    pub fn new(name: impl Into<String>, coercing: impl Coercing + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            coercing: Arc::new(coercing),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn serialize(&self, value: &Value) -> CoercionResult {
        self.coercing.serialize(value)
    }

    pub fn parse_value(&self, value: &Value) -> CoercionResult {
        self.coercing.parse_value(value)
    }

    pub fn parse_literal(&self, value: &Value) -> CoercionResult {
        self.coercing.parse_literal(value)
    }

    /// Returns the codec for a built-in scalar.
    pub fn standard(name: &str) -> Option<Self> {
        let codec = match name {
            "Int" => Self::new(name, IntegerCoercing::new("Int", i32::MIN.into(), i32::MAX.into()))
                .with_description("Built-in Int"),
            "Float" => Self::new(name, FloatCoercing).with_description("Built-in Float"),
            "String" => Self::new(name, StringCoercing).with_description("Built-in String"),
            "Boolean" => Self::new(name, BooleanCoercing).with_description("Built-in Boolean"),
            "ID" => Self::new(name, IdCoercing).with_description("Built-in ID"),
            "Long" => Self::new(name, IntegerCoercing::new("Long", i64::MIN, i64::MAX))
                .with_description("Long type"),
            "Short" => {
                Self::new(name, IntegerCoercing::new("Short", i16::MIN.into(), i16::MAX.into()))
                    .with_description("Built-in Short as Int")
            }
            "Byte" => Self::new(name, IntegerCoercing::new("Byte", i8::MIN.into(), i8::MAX.into()))
                .with_description("Built-in Byte as Int"),
            "BigInteger" => {
                Self::new(name, BigIntegerCoercing).with_description("Built-in java.math.BigInteger")
            }
            "BigDecimal" => {
                Self::new(name, BigDecimalCoercing).with_description("Built-in java.math.BigDecimal")
            }
            "Char" => Self::new(name, CharCoercing).with_description("Built-in Char as Character"),
            _ => return None,
        };
        Some(codec)
    }

    /// Returns codecs for all built-in scalars.
    pub fn standard_set() -> impl Iterator<Item = Self> {
        STANDARD_SCALARS.iter().filter_map(|name| Self::standard(name))
    }
}

impl Debug for ScalarCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarCodec")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Passes any JSON value through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCoercing;

impl Coercing for PassthroughCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        Ok(value.clone())
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        Ok(value.clone())
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        Ok(value.clone())
    }
}

/// Integral number within `[min, max]`.
#[derive(Debug, Clone, Copy)]
struct IntegerCoercing {
    scalar: &'static str,
    min: i64,
    max: i64,
}

impl IntegerCoercing {
    const fn new(scalar: &'static str, min: i64, max: i64) -> Self {
        Self { scalar, min, max }
    }

    fn check(&self, n: i64, original: &Value) -> CoercionResult {
        if (self.min..=self.max).contains(&n) {
            Ok(Value::from(n))
        } else {
            Err(CoercionError::out_of_range(self.scalar, original))
        }
    }

    fn lenient(&self, value: &Value) -> CoercionResult {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return self.check(i, value);
                }
                if n.is_u64() {
                    return Err(CoercionError::out_of_range(self.scalar, value));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => {
                        // i64::MAX rounds up to 2^63, which no i64 holds.
                        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                            self.check(f as i64, value)
                        } else {
                            Err(CoercionError::out_of_range(self.scalar, value))
                        }
                    }
                    _ => Err(CoercionError::invalid(self.scalar, value)),
                }
            }
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => self.check(i, value),
                Err(_) => Err(CoercionError::invalid(self.scalar, value)),
            },
            _ => Err(CoercionError::invalid(self.scalar, value)),
        }
    }
}

impl Coercing for IntegerCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        self.lenient(value)
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        self.lenient(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        match value.as_i64() {
            Some(i) => self.check(i, value),
            None if value.is_u64() => Err(CoercionError::out_of_range(self.scalar, value)),
            None => Err(CoercionError::invalid(self.scalar, value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatCoercing;

impl FloatCoercing {
    fn lenient(value: &Value) -> CoercionResult {
        let f = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        f.and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CoercionError::invalid("Float", value))
    }
}

impl Coercing for FloatCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        Self::lenient(value)
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        Self::lenient(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        match value {
            Value::Number(_) => Self::lenient(value),
            _ => Err(CoercionError::invalid("Float", value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StringCoercing;

impl Coercing for StringCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(_) | Value::Bool(_) => Ok(Value::String(value.to_string())),
            _ => Err(CoercionError::invalid("String", value)),
        }
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        self.serialize(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(CoercionError::invalid("String", value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BooleanCoercing;

impl Coercing for BooleanCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(CoercionError::invalid("Boolean", value)),
            },
            Value::Number(n) => n
                .as_f64()
                .map(|f| Value::Bool(f != 0.0))
                .ok_or_else(|| CoercionError::invalid("Boolean", value)),
            _ => Err(CoercionError::invalid("Boolean", value)),
        }
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        self.serialize(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(CoercionError::invalid("Boolean", value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IdCoercing;

impl Coercing for IdCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            _ => Err(CoercionError::invalid("ID", value)),
        }
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        self.serialize(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        self.serialize(value)
    }
}

/// Integral numbers of any size; values beyond `i64` travel as digit strings.
#[derive(Debug, Clone, Copy)]
struct BigIntegerCoercing;

impl BigIntegerCoercing {
    fn coerce(value: &Value) -> CoercionResult {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => {
                    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                        Ok(Value::from(f as i64))
                    } else {
                        Ok(Value::String(format!("{f:.0}")))
                    }
                }
                _ => Err(CoercionError::invalid("BigInteger", value)),
            },
            Value::String(s) if is_integer_str(s.trim()) => Ok(Value::String(s.trim().to_string())),
            _ => Err(CoercionError::invalid("BigInteger", value)),
        }
    }
}

impl Coercing for BigIntegerCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        Self::coerce(value)
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        Self::coerce(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            _ => Err(CoercionError::invalid("BigInteger", value)),
        }
    }
}

/// Arbitrary decimal numbers; numeric strings are kept verbatim.
#[derive(Debug, Clone, Copy)]
struct BigDecimalCoercing;

impl BigDecimalCoercing {
    fn coerce(value: &Value) -> CoercionResult {
        match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) if is_decimal_str(s.trim()) => Ok(Value::String(s.trim().to_string())),
            _ => Err(CoercionError::invalid("BigDecimal", value)),
        }
    }
}

impl Coercing for BigDecimalCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        Self::coerce(value)
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        Self::coerce(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        match value {
            Value::Number(_) => Ok(value.clone()),
            _ => Err(CoercionError::invalid("BigDecimal", value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CharCoercing;

impl Coercing for CharCoercing {
    fn serialize(&self, value: &Value) -> CoercionResult {
        match value {
            Value::String(s) if s.chars().count() == 1 => Ok(value.clone()),
            _ => Err(CoercionError::invalid("Char", value)),
        }
    }

    fn parse_value(&self, value: &Value) -> CoercionResult {
        self.serialize(value)
    }

    fn parse_literal(&self, value: &Value) -> CoercionResult {
        self.serialize(value)
    }
}

fn is_integer_str(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_str(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = (!int_part.is_empty() || !frac_part.is_empty())
        && all_digits(int_part)
        && all_digits(frac_part);
    let exponent_ok = exponent.map_or(true, is_integer_str);

    mantissa_ok && exponent_ok
}
