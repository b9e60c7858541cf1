//! Dynamic value tree.
//!
//! Codecs operate on [`Value`] rather than on concrete Rust types; the
//! [`Describe`](crate::Describe) trait converts between the two.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Ordered field values of a record, keyed by declared field name.
pub type Record = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An unset optional value
    Absent,

    /// Boolean
    Boolean(bool),

    /// Integer of any supported width
    Integer(i128),

    /// Floating point number
    Number(f64),

    /// Exact decimal number
    Decimal(Decimal),

    /// Text (also used for characters and text-encoded scalars)
    String(String),

    /// Ordered collection
    List(Vec<Value>),

    /// String-keyed map
    Map(BTreeMap<String, Value>),

    /// Product value with fields in declaration order
    Record(Record),

    /// One variant of a sum type
    Variant {
        /// Declared variant name
        name: String,
        /// Variant payload (a record)
        value: Box<Value>,
    },
}

impl Value {
    /// Short name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Variant { .. } => "variant",
        }
    }

    /// Check if this value is absent.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Numeric view used by range validators.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            Value::Decimal(d) => d.to_string().parse().ok(),
            _ => None,
        }
    }

    /// Length used by length validators (characters for text, items for lists).
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Unwrap a record, or report what was found instead.
    pub fn into_record(self, type_name: &str) -> Result<Record, ValueError> {
        match self {
            Value::Record(record) => Ok(record),
            other => Err(ValueError::unexpected(type_name, "record", &other)),
        }
    }

    /// Unwrap a list, or report what was found instead.
    pub fn into_list(self, type_name: &str) -> Result<Vec<Value>, ValueError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(ValueError::unexpected(type_name, "list", &other)),
        }
    }

    /// Unwrap a map, or report what was found instead.
    pub fn into_map(self, type_name: &str) -> Result<BTreeMap<String, Value>, ValueError> {
        match self {
            Value::Map(entries) => Ok(entries),
            other => Err(ValueError::unexpected(type_name, "map", &other)),
        }
    }

    /// Unwrap a variant, or report what was found instead.
    pub fn into_variant(self, type_name: &str) -> Result<(String, Value), ValueError> {
        match self {
            Value::Variant { name, value } => Ok((name, *value)),
            other => Err(ValueError::unexpected(type_name, "variant", &other)),
        }
    }
}

/// Remove a field from a record, yielding [`Value::Absent`] when it is missing.
pub fn take_field(record: &mut Record, name: &str) -> Value {
    record.shift_remove(name).unwrap_or(Value::Absent)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Variant { name, value } => write!(f, "{}{}", name, value),
        }
    }
}

/// A value did not have the shape a Rust type expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("expected {expected} for `{type_name}`, found {found}")]
    Unexpected {
        type_name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for `{type_name}`")]
    OutOfRange { type_name: String, value: String },

    #[error("unknown variant `{variant}` for `{type_name}`")]
    UnknownVariant { type_name: String, variant: String },

    #[error("invalid `{type_name}`: {message}")]
    Invalid { type_name: String, message: String },
}

impl ValueError {
    /// Create an "unexpected kind" error.
    pub fn unexpected(type_name: &str, expected: &'static str, found: &Value) -> Self {
        ValueError::Unexpected {
            type_name: type_name.to_string(),
            expected,
            found: found.kind(),
        }
    }

    /// Create an "out of range" error.
    pub fn out_of_range(type_name: &str, value: impl fmt::Display) -> Self {
        ValueError::OutOfRange {
            type_name: type_name.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an "unknown variant" error.
    pub fn unknown_variant(type_name: &str, variant: impl Into<String>) -> Self {
        ValueError::UnknownVariant {
            type_name: type_name.to_string(),
            variant: variant.into(),
        }
    }

    /// Create a free-form error.
    pub fn invalid(type_name: &str, message: impl fmt::Display) -> Self {
        ValueError::Invalid {
            type_name: type_name.to_string(),
            message: message.to_string(),
        }
    }
}
