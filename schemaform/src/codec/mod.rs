//! Flat form codec derivation.
//!
//! A form codec encodes a product value as `key=value` pairs joined by `&`,
//! percent-encoded the way HTML forms are (space as `+`), and decodes the same
//! format back with typed failures.
//!
//! # Wire format
//!
//! - Keys are the encoded field names produced by the active
//!   [`NamingStrategy`](crate::NamingStrategy).
//! - An absent optional field contributes no pair.
//! - A list field contributes one pair per element, in order, all under the
//!   same key. An empty list contributes no pair.
//! - Every other field contributes exactly one pair.
//! - Pairs follow field declaration order. A value with every field absent or
//!   empty encodes to the empty string.
//!
//! # Decoding
//!
//! Decoding returns a [`DecodeResult`]. Failures are ordinary values that
//! name the field involved:
//!
//! - [`DecodeError::Missing`]: a required key is not present.
//! - [`DecodeError::Malformed`]: the raw text does not parse as the field type.
//! - [`DecodeError::InvalidValue`]: the parsed value fails a bound validator.
//! - [`DecodeError::Multiple`]: a non-list key appears more than once.
//! - [`DecodeError::Mismatch`]: the decoded fields were rejected by the type.
//!
//! Keys that match no field are ignored. Raw text carried by an error (`raw`
//! of `Malformed`, `values` of `Multiple`) is already percent-decoded.

mod form;
mod scalar;

pub use form::{CodecDeriver, FormCodec, TypedCodec};
pub use scalar::{PrimitiveCodec, ScalarCodec};

use thiserror::Error;

/// Outcome of decoding a wire string.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A decode-time failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A required field has no pair.
    #[error("missing field `{field}`")]
    Missing { field: String },

    /// The raw text could not be parsed.
    #[error("malformed value `{raw}` for field `{field}`: {cause}")]
    Malformed {
        field: String,
        raw: String,
        cause: String,
    },

    /// The parsed value violates a validator.
    #[error("invalid value {value} for field `{field}`: expected {constraint}")]
    InvalidValue {
        field: String,
        value: String,
        constraint: String,
    },

    /// A non-list field was given more than once.
    #[error("field `{field}` given {} times, expected once", .values.len())]
    Multiple { field: String, values: Vec<String> },

    /// The decoded fields did not convert into the target type.
    #[error("cannot construct `{type_name}`: {cause}")]
    Mismatch { type_name: String, cause: String },
}

impl DecodeError {
    /// Wire name of the field involved, if the failure concerns one field.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::Missing { field }
            | DecodeError::Malformed { field, .. }
            | DecodeError::InvalidValue { field, .. }
            | DecodeError::Multiple { field, .. } => Some(field),
            DecodeError::Mismatch { .. } => None,
        }
    }

    /// Short name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Missing { .. } => "missing",
            DecodeError::Malformed { .. } => "malformed",
            DecodeError::InvalidValue { .. } => "invalid_value",
            DecodeError::Multiple { .. } => "multiple",
            DecodeError::Mismatch { .. } => "mismatch",
        }
    }
}
