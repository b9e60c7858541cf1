//! Field naming transforms.
//!
//! The active [`NamingStrategy`] maps a declared field name to the name used in
//! product schemas and as the wire key of form codecs. Schema and codec
//! derivation read the strategy from the same [`DeriveConfig`](crate::DeriveConfig).

use std::fmt;
use std::sync::Arc;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

/// Rename rule applied to every field name.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Keep the declared name
    #[default]
    Identity,

    /// snake_case
    SnakeCase,

    /// kebab-case
    KebabCase,

    /// camelCase
    CamelCase,

    /// PascalCase
    PascalCase,

    /// SCREAMING_SNAKE_CASE
    ScreamingSnakeCase,

    /// User supplied transform
    #[serde(skip)]
    Custom(CustomNaming),
}

impl NamingStrategy {
    /// Create a strategy from a closure.
    pub fn custom(transform: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        NamingStrategy::Custom(CustomNaming(Arc::new(transform)))
    }

    /// Apply the strategy to a declared name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingStrategy::Identity => name.to_string(),
            NamingStrategy::SnakeCase => name.to_case(Case::Snake),
            NamingStrategy::KebabCase => name.to_case(Case::Kebab),
            NamingStrategy::CamelCase => name.to_case(Case::Camel),
            NamingStrategy::PascalCase => name.to_case(Case::Pascal),
            NamingStrategy::ScreamingSnakeCase => name.to_case(Case::UpperSnake),
            NamingStrategy::Custom(custom) => (custom.0)(name),
        }
    }
}

impl fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Identity => f.write_str("Identity"),
            NamingStrategy::SnakeCase => f.write_str("SnakeCase"),
            NamingStrategy::KebabCase => f.write_str("KebabCase"),
            NamingStrategy::CamelCase => f.write_str("CamelCase"),
            NamingStrategy::PascalCase => f.write_str("PascalCase"),
            NamingStrategy::ScreamingSnakeCase => f.write_str("ScreamingSnakeCase"),
            NamingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Shared user-supplied naming function.
#[derive(Clone)]
pub struct CustomNaming(Arc<dyn Fn(&str) -> String + Send + Sync>);
