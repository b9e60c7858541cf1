//! Error types for the macro crate.

use proc_macro2::Span;

/// Shapes and attribute combinations the derive rejects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveErrorKind {
    #[error("tuple structs with more than one field cannot derive Describe; use named fields")]
    TupleStruct,

    #[error("tuple variant `{0}` cannot derive Describe; use named fields")]
    TupleVariant(String),

    #[error("lifetime parameters are not supported by Describe")]
    Lifetime,

    #[error("validation attributes on a value class field are not supported; bind a validator to the wrapped type instead")]
    WrapperValidators,

    #[error("the only field of a value class cannot be skipped")]
    SkippedWrapperField,
}

/// A [`DeriveErrorKind`] located in the input.
#[derive(Debug, Clone)]
pub struct DeriveError {
    pub kind: DeriveErrorKind,
    pub span: Span,
}

impl DeriveError {
    pub fn new(kind: DeriveErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Convert to a syn::Error for proc-macro error reporting.
    pub fn into_syn_error(self) -> syn::Error {
        syn::Error::new(self.span, self.kind.to_string())
    }
}
