//! Core traits for type description.
//!
//! This module defines the [`Describe`] trait, the bridge between a Rust type
//! and the derivation engines.
//!
//! ## Overview
//!
//! The `Describe` trait provides methods to:
//! - Describe the shape of the type ([`Describe::descriptor`])
//! - Convert a value into the dynamic [`Value`] tree ([`Describe::to_value`])
//! - Rebuild a value from a [`Value`] tree ([`Describe::from_value`])
//!
//! ## Deriving vs Manual Implementation
//!
//! Most users will derive this trait using `#[derive(Describe)]`:
//!
//! ```rust
//! use schemaform::Describe;
//!
//! #[derive(Describe)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//! ```
//!
//! Types the engine cannot look into can implement it by hand and describe
//! themselves as opaque. Such types need a schema or codec override in the
//! [`Registry`](crate::Registry):
//!
//! ```rust
//! use schemaform::{Describe, ObjectInfo, TypeDescriptor, Value, ValueError};
//!
//! struct Color(u8, u8, u8);
//!
//! impl Describe for Color {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::opaque(ObjectInfo::new("paint::Color"))
//!     }
//!
//!     fn to_value(&self) -> Value {
//!         Value::String(format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2))
//!     }
//!
//!     fn from_value(value: Value) -> Result<Self, ValueError> {
//!         let Value::String(hex) = value else {
//!             return Err(ValueError::invalid("paint::Color", "expected hex text"));
//!         };
//!         let channel = |i: usize| {
//!             hex.get(i..i + 2)
//!                 .and_then(|s| u8::from_str_radix(s, 16).ok())
//!                 .ok_or_else(|| ValueError::invalid("paint::Color", &hex))
//!         };
//!         Ok(Color(channel(1)?, channel(3)?, channel(5)?))
//!     }
//! }
//! ```
//!
//! ## Blanket Implementations
//!
//! - **Primitives**: `String`, `bool`, `char`, integers (`i8`-`i64`, `u8`-`u64`), floats (`f32`, `f64`), `rust_decimal::Decimal`
//! - **Wrappers**: `Option<T>`, `Box<T>`, `Arc<T>`
//! - **Collections**: `Vec<T>`, `VecDeque<T>`, `HashSet<T>`, `BTreeSet<T>`, `[T; N]`
//! - **Maps**: `HashMap<String, V>`, `BTreeMap<String, V>`
//! - **Feature-gated**: `Uuid` (uuid feature), `DateTime<Utc>` (chrono feature)

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::descriptor::{CollectionKind, Primitive, TypeDescriptor};
use crate::value::{Value, ValueError};

/// Trait for types that can be described to the derivation engines.
///
/// `to_value` and `from_value` must agree with `descriptor`: a product
/// converts to a [`Value::Record`] keyed by declared field names, a value
/// class converts to the value of its wrapped field, and an optional value
/// that is unset converts to [`Value::Absent`].
pub trait Describe: Sized + 'static {
    /// Returns the shape of this type.
    fn descriptor() -> TypeDescriptor;

    /// Converts a value into the dynamic value tree.
    fn to_value(&self) -> Value;

    /// Rebuilds a value from the dynamic value tree.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

// =============================================================================
// Primitive implementations
// =============================================================================

impl Describe for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Primitive::String)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ValueError::unexpected("String", "string", &other)),
        }
    }
}

impl Describe for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Primitive::Bool)
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(ValueError::unexpected("bool", "boolean", &other)),
        }
    }
}

impl Describe for char {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Primitive::Char)
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ValueError::invalid("char", "expected exactly one character")),
                }
            }
            other => Err(ValueError::unexpected("char", "string", &other)),
        }
    }
}

impl Describe for Decimal {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Primitive::Decimal)
    }

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Integer(i) => i64::try_from(i)
                .map(Decimal::from)
                .map_err(|_| ValueError::out_of_range("Decimal", i)),
            Value::String(s) => s.parse().map_err(|e| ValueError::invalid("Decimal", e)),
            other => Err(ValueError::unexpected("Decimal", "decimal", &other)),
        }
    }
}

// =============================================================================
// Integer implementations
// =============================================================================

macro_rules! impl_describe_for_int {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::primitive(Primitive::$kind)
                }

                fn to_value(&self) -> Value {
                    Value::Integer(i128::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(i)
                            .map_err(|_| ValueError::out_of_range(stringify!($ty), i)),
                        other => Err(ValueError::unexpected(stringify!($ty), "integer", &other)),
                    }
                }
            }
        )*
    };
}

impl_describe_for_int!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

// =============================================================================
// Float implementations
// =============================================================================

macro_rules! impl_describe_for_float {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::primitive(Primitive::$kind)
                }

                fn to_value(&self) -> Value {
                    Value::Number(f64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Number(n) => Ok(n as $ty),
                        Value::Integer(i) => Ok(i as $ty),
                        other => Err(ValueError::unexpected(stringify!($ty), "number", &other)),
                    }
                }
            }
        )*
    };
}

impl_describe_for_float!(
    f32 => F32,
    f64 => F64,
);

// =============================================================================
// Wrapper implementations
// =============================================================================

impl<T: Describe> Describe for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::descriptor())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Absent,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Absent => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Describe> Describe for Box<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Arc::new)
    }
}

// =============================================================================
// Collection implementations
// =============================================================================

macro_rules! impl_describe_for_collection {
    ($($ty:ident [$($bound:tt)*] => $kind:ident),* $(,)?) => {
        $(
            impl<T: Describe $($bound)*> Describe for $ty<T> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::collection(CollectionKind::$kind, T::descriptor())
                }

                fn to_value(&self) -> Value {
                    Value::List(self.iter().map(Describe::to_value).collect())
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    value
                        .into_list(stringify!($ty))?
                        .into_iter()
                        .map(T::from_value)
                        .collect()
                }
            }
        )*
    };
}

impl_describe_for_collection!(
    Vec [] => List,
    VecDeque [] => List,
    HashSet [+ Eq + Hash] => Set,
    BTreeSet [+ Ord] => Set,
);

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection(CollectionKind::Array, T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Describe::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let items = value
            .into_list("array")?
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        let len = items.len();
        <[T; N]>::try_from(items).map_err(|_| {
            ValueError::invalid("array", format!("expected {} items, found {}", N, len))
        })
    }
}

// =============================================================================
// Map implementations
// =============================================================================

impl<V: Describe> Describe for HashMap<String, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::string_map(V::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .into_map("HashMap")?
            .into_iter()
            .map(|(key, value)| V::from_value(value).map(|v| (key, v)))
            .collect()
    }
}

impl<V: Describe> Describe for BTreeMap<String, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::string_map(V::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .into_map("BTreeMap")?
            .into_iter()
            .map(|(key, value)| V::from_value(value).map(|v| (key, v)))
            .collect()
    }
}

// =============================================================================
// Feature-gated implementations
// =============================================================================

#[cfg(feature = "uuid")]
impl Describe for uuid::Uuid {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Primitive::Uuid)
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => uuid::Uuid::parse_str(&s).map_err(|e| ValueError::invalid("Uuid", e)),
            other => Err(ValueError::unexpected("Uuid", "string", &other)),
        }
    }
}

#[cfg(feature = "chrono")]
impl Describe for chrono::DateTime<chrono::Utc> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Primitive::DateTime)
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_rfc3339())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| ValueError::invalid("DateTime", e)),
            other => Err(ValueError::unexpected("DateTime", "string", &other)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ObjectInfo;

    #[test]
    fn test_integer_descriptor_and_values() {
        assert!(matches!(
            i32::descriptor(),
            TypeDescriptor::Primitive(Primitive::I32)
        ));
        assert_eq!(7i32.to_value(), Value::Integer(7));
        assert_eq!(i32::from_value(Value::Integer(-3)).unwrap(), -3);
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = u8::from_value(Value::Integer(300)).unwrap_err();
        assert_eq!(err.to_string(), "value 300 is out of range for `u8`");
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(char::from_value(Value::String("x".to_string())).unwrap(), 'x');
        assert!(char::from_value(Value::String("xy".to_string())).is_err());
        assert!(char::from_value(Value::String(String::new())).is_err());
    }

    #[test]
    fn test_option_absent() {
        assert_eq!(Option::<i32>::None.to_value(), Value::Absent);
        assert_eq!(Option::<i32>::from_value(Value::Absent).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Integer(1)).unwrap(), Some(1));
        assert!(Option::<i32>::descriptor().is_optional());
    }

    #[test]
    fn test_box_is_transparent() {
        assert!(matches!(
            Box::<String>::descriptor(),
            TypeDescriptor::Primitive(Primitive::String)
        ));
    }

    #[test]
    fn test_collections_round_trip_through_values() {
        let list = vec![1u16, 2, 3];
        assert_eq!(Vec::<u16>::from_value(list.to_value()).unwrap(), list);

        let set: BTreeSet<String> = ["a".to_string(), "b".to_string()].into();
        assert_eq!(BTreeSet::<String>::from_value(set.to_value()).unwrap(), set);

        assert!(matches!(
            HashSet::<i64>::descriptor(),
            TypeDescriptor::Collection {
                kind: CollectionKind::Set,
                ..
            }
        ));
    }

    #[test]
    fn test_array_length_is_checked() {
        let value = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(<[u8; 2]>::from_value(value.clone()).unwrap(), [1, 2]);
        let err = <[u8; 3]>::from_value(value).unwrap_err();
        assert_eq!(err.to_string(), "invalid `array`: expected 3 items, found 2");
    }

    #[test]
    fn test_map_descriptor_identity() {
        assert_eq!(
            HashMap::<String, f64>::descriptor().identity(),
            ObjectInfo::new("Map").with_type_parameters(["f64"])
        );

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), true);
        assert_eq!(BTreeMap::<String, bool>::from_value(map.to_value()).unwrap(), map);
    }

    #[test]
    fn test_decimal_keeps_digits() {
        let d: Decimal = "12345678901234567890.123456789".parse().unwrap();
        assert_eq!(Decimal::from_value(d.to_value()).unwrap(), d);
    }
}
