//! # schemaform
//!
//! Derive structural schemas and flat form codecs from Rust types.
//!
//! Given the shape of a type, `schemaform` produces two artifacts that always
//! agree with each other:
//!
//! - a [`Schema`]: an immutable tree describing the type for documentation and
//!   validation generators, and
//! - a [`FormCodec`]: an encoder/decoder between values of the type and the
//!   `key=value&key=value` form format, with typed decode failures.
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaform::{DecodeError, Describe, Registry, SchemaNode};
//!
//! #[derive(Debug, PartialEq, Describe)]
//! struct Signup {
//!     #[form(min_length = 3)]
//!     user_name: String,
//!     #[form(min = 13)]
//!     age: u8,
//!     referrer: Option<String>,
//!     interests: Vec<String>,
//! }
//!
//! let registry = Registry::default();
//!
//! let schema = registry.schema_for::<Signup>().unwrap();
//! let product = schema.node.as_product().unwrap();
//! assert_eq!(product.required, vec!["user_name", "age", "interests"]);
//! assert_eq!(product.fields[3].schema, SchemaNode::array(SchemaNode::String));
//!
//! let codec = registry.codec_for::<Signup>().unwrap();
//! let signup = Signup {
//!     user_name: "ada".into(),
//!     age: 36,
//!     referrer: None,
//!     interests: vec!["math".into(), "looms".into()],
//! };
//! let wire = codec.encode(&signup);
//! assert_eq!(wire, "user_name=ada&age=36&interests=math&interests=looms");
//! assert_eq!(codec.decode(&wire).unwrap(), signup);
//!
//! assert!(matches!(
//!     codec.decode("user_name=ada&age=7"),
//!     Err(DecodeError::InvalidValue { .. })
//! ));
//! ```
//!
//! ## Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `derive` | `#[derive(Describe)]` macro | ✅ |
//! | `chrono` | Support for `chrono::DateTime<Utc>` | ❌ |
//! | `uuid` | Support for `uuid::Uuid` | ❌ |
//!
//! ## Type Mappings
//!
//! | Rust Type | Schema |
//! |-----------|--------|
//! | `i8`-`i64`, `u8`-`u64` | `Integer` |
//! | `f32`, `f64` | `Number` |
//! | `bool` | `Boolean` |
//! | `String`, `char`, `Decimal` | `String` |
//! | `Uuid`, `DateTime<Utc>` (with feature) | `String` |
//! | `Option<T>` | schema of `T`, marked optional |
//! | `Vec<T>`, `VecDeque<T>`, `HashSet<T>`, `BTreeSet<T>`, `[T; N]` | `Array` |
//! | `HashMap<String, V>`, `BTreeMap<String, V>` | `OpenProduct` |
//! | `Box<T>`, `Arc<T>` | schema of `T` |
//! | `struct S(T)` | schema of `T` (value class) |
//! | `struct S { .. }` | `Product` |
//! | `enum E { .. }` | `Coproduct` of one product per variant |
//!
//! Decimals are text in both schema and wire form so that no digit is lost.
//!
//! ## Container Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[form(tag = "type")]` | Discriminator field of an enum's coproduct |
//!
//! ## Field Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[form(rename = "name")]` | Wire name of the field, bypassing the naming strategy |
//! | `#[form(skip)]` | Leave the field out; it is rebuilt with `Default::default()` |
//! | `#[form(min = N)]` / `#[form(max = N)]` | Numeric bounds checked on decode |
//! | `#[form(min_length = N)]` / `#[form(max_length = N)]` | Length bounds checked on decode |
//! | `#[form(description = "...")]` | Field description, carried into the schema |
//!
//! ## Recursive Types
//!
//! A type that refers to itself derives to a finite tree. The nested
//! occurrence becomes a [`SchemaNode::Ref`] naming the type:
//!
//! ```rust
//! use schemaform::{Describe, ObjectInfo, Registry, SchemaNode};
//!
//! #[derive(Describe)]
//! struct Category {
//!     name: String,
//!     children: Vec<Category>,
//! }
//!
//! let schema = Registry::default().schema_for::<Category>().unwrap();
//! let product = schema.node.as_product().unwrap();
//! assert_eq!(
//!     product.fields[1].schema,
//!     SchemaNode::array(SchemaNode::Ref(product.info.clone()))
//! );
//! ```
//!
//! ## Overrides
//!
//! Types the engine cannot look into describe themselves as opaque and need an
//! override, keyed by their [`ObjectInfo`]. See [`Registry`].

extern crate self as schemaform;

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod naming;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod validation;
pub mod value;

pub use codec::{
    CodecDeriver, DecodeError, DecodeResult, FormCodec, PrimitiveCodec, ScalarCodec, TypedCodec,
};
pub use config::{ConfigError, DeriveConfig};
pub use descriptor::{
    CollectionKind, CoproductShape, Deferred, FieldDescriptor, Primitive, ProductShape,
    TypeDescriptor, TypeKey, WrapperShape,
};
pub use engine::SchemaDeriver;
pub use error::DeriveError;
pub use naming::NamingStrategy;
pub use registry::Registry;
pub use schema::{
    CoproductSchema, FieldName, ObjectInfo, OpenProductSchema, ProductField, ProductSchema,
    Schema, SchemaNode,
};
pub use traits::Describe;
pub use validation::{Validator, Violation};
pub use value::{Record, Value, ValueError};

// Re-export derive macro when available
#[cfg(feature = "derive")]
pub use schemaform_macros::Describe;
