//! # schemaform-macros
//!
//! Procedural macros for describing Rust types to `schemaform`.
//!
//! This crate provides the `#[derive(Describe)]` macro. Use it through the
//! re-export in the `schemaform` crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemaform::Describe;
//!
//! #[derive(Describe)]
//! struct Signup {
//!     #[form(rename = "user", min_length = 3)]
//!     user_name: String,
//!
//!     #[form(min = 13, max = 130)]
//!     age: u8,
//!
//!     #[form(skip)]
//!     session: Option<String>,
//! }
//!
//! #[derive(Describe)]
//! #[form(tag = "kind")]
//! enum Payment {
//!     Card { number: String },
//!     Cash,
//! }
//! ```
//!
//! ## Attributes
//!
//! ### Container Attributes
//!
//! - `#[form(tag = "type")]` - Discriminator field of an enum's coproduct
//!
//! ### Field Attributes
//!
//! - `#[form(rename = "name")]` - Wire name of this field
//! - `#[form(skip)]` - Skip this field; it is rebuilt with `Default::default()`
//! - `#[form(description = "...")]` - Field description, carried into the schema
//!
//! ### Validation Attributes
//!
//! - `#[form(min = N)]` - Minimum value for numbers
//! - `#[form(max = N)]` - Maximum value for numbers
//! - `#[form(min_length = N)]` - Minimum length for strings and lists
//! - `#[form(max_length = N)]` - Maximum length for strings and lists
//!
//! ## Shapes
//!
//! - Structs with named fields, unit structs: products
//! - Tuple structs with exactly one field: value classes
//! - Enums with unit or named-field variants: coproducts
//!
//! Tuple structs with several fields, tuple variants, and lifetime parameters
//! are rejected at compile time.

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use syn::DeriveInput;

mod attributes;
mod codegen;
mod error;

use attributes::ContainerAttrs;
use codegen::ImplGenerator;

/// Derive macro implementing `schemaform::Describe`.
///
/// # Example
///
/// ```rust,ignore
/// use schemaform::Describe;
///
/// #[derive(Describe)]
/// struct User {
///     name: String,
///     age: u32,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(form))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    let attrs = match ContainerAttrs::from_derive_input(&input) {
        Ok(attrs) => attrs,
        Err(err) => return err.write_errors().into(),
    };

    match ImplGenerator::new(&attrs).generate() {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_syn_error().into_compile_error().into(),
    }
}
