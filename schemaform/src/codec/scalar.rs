//! Scalar codecs.
//!
//! A scalar codec converts one field value to and from the text of a single
//! `key=value` pair. Percent encoding is handled by the form codec.

use rust_decimal::Decimal;

use crate::descriptor::Primitive;
use crate::value::Value;

/// Converts a single scalar value to and from wire text.
///
/// Implement this for types the engine cannot inspect and register it with
/// [`Registry::with_codec_override`](crate::Registry::with_codec_override).
pub trait ScalarCodec: Send + Sync {
    /// Render a value. Must not fail for any value the type can produce.
    fn encode(&self, value: &Value) -> String;

    /// Parse wire text, returning a description of the problem on failure.
    fn decode(&self, raw: &str) -> Result<Value, String>;
}

/// Codec for the built-in primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveCodec(pub Primitive);

impl PrimitiveCodec {
    fn integer_bounds(&self) -> (i128, i128) {
        match self.0 {
            Primitive::I8 => (i8::MIN.into(), i8::MAX.into()),
            Primitive::I16 => (i16::MIN.into(), i16::MAX.into()),
            Primitive::I32 => (i32::MIN.into(), i32::MAX.into()),
            Primitive::I64 => (i64::MIN.into(), i64::MAX.into()),
            Primitive::U8 => (0, u8::MAX.into()),
            Primitive::U16 => (0, u16::MAX.into()),
            Primitive::U32 => (0, u32::MAX.into()),
            _ => (0, u64::MAX.into()),
        }
    }

    fn decode_integer(&self, raw: &str) -> Result<Value, String> {
        let parsed: i128 = raw
            .parse()
            .map_err(|_| format!("expected an integer, found `{}`", raw))?;
        let (min, max) = self.integer_bounds();
        if parsed < min || parsed > max {
            return Err(format!("{} is out of range for {}", parsed, self.0.name()));
        }
        Ok(Value::Integer(parsed))
    }
}

impl ScalarCodec for PrimitiveCodec {
    fn encode(&self, value: &Value) -> String {
        match (self.0, value) {
            (Primitive::F32, Value::Number(n)) => (*n as f32).to_string(),
            _ => value.to_string(),
        }
    }

    fn decode(&self, raw: &str) -> Result<Value, String> {
        match self.0 {
            p if p.is_integer() => self.decode_integer(raw),
            Primitive::F32 => raw
                .parse::<f32>()
                .map(|n| Value::Number(f64::from(n)))
                .map_err(|_| format!("expected a number, found `{}`", raw)),
            Primitive::F64 => raw
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| format!("expected a number, found `{}`", raw)),
            Primitive::Bool => raw
                .parse::<bool>()
                .map(Value::Boolean)
                .map_err(|_| format!("expected `true` or `false`, found `{}`", raw)),
            Primitive::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(_), None) => Ok(Value::String(raw.to_string())),
                    _ => Err(format!("expected a single character, found `{}`", raw)),
                }
            }
            Primitive::Decimal => raw
                .parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|e| e.to_string()),
            #[cfg(feature = "uuid")]
            Primitive::Uuid => uuid::Uuid::parse_str(raw)
                .map(|id| Value::String(id.to_string()))
                .map_err(|e| e.to_string()),
            #[cfg(feature = "chrono")]
            Primitive::DateTime => chrono::DateTime::parse_from_rfc3339(raw)
                .map(|_| Value::String(raw.to_string()))
                .map_err(|e| e.to_string()),
            _ => Ok(Value::String(raw.to_string())),
        }
    }
}
