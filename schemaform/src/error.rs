//! Derivation-time errors.
//!
//! These are setup failures: they occur once, when a schema or codec is first
//! requested for a type, and always name the offending type so the caller can
//! register an override. Per-value decode failures live in
//! [`codec::DecodeError`](crate::codec::DecodeError).

use thiserror::Error;

use crate::schema::ObjectInfo;

/// Errors raised while deriving a schema or a codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    /// No dispatch rule applies to the type.
    #[error("no derivation available for type `{type_name}`")]
    NoDerivation { type_name: String },

    /// A coproduct variant did not derive to a product.
    #[error("variant `{variant}` of `{type_name}` is not a product type")]
    InvalidVariant { type_name: String, variant: String },

    /// A value class wraps itself, directly or through other value classes.
    #[error("value class `{type_name}` wraps itself and has no finite schema")]
    RecursiveValueClass { type_name: String },

    /// A product field has no flat form representation.
    #[error("no form codec available for field `{field}` of `{type_name}`")]
    NoFieldCodec { type_name: String, field: String },
}

impl DeriveError {
    /// Create a [`DeriveError::NoDerivation`] for the given identity.
    pub fn no_derivation(info: &ObjectInfo) -> Self {
        DeriveError::NoDerivation {
            type_name: info.to_string(),
        }
    }

    /// Name of the type the error is about.
    pub fn type_name(&self) -> &str {
        match self {
            DeriveError::NoDerivation { type_name }
            | DeriveError::InvalidVariant { type_name, .. }
            | DeriveError::RecursiveValueClass { type_name }
            | DeriveError::NoFieldCodec { type_name, .. } => type_name,
        }
    }
}
