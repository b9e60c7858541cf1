//! Derivation configuration.
//!
//! [`DeriveConfig`] is the single configuration surface of the derivation
//! engines. The same snapshot is shared by schema and codec derivation, so the
//! field names in a schema always match the keys a codec reads and writes.
//!
//! # Example
//! ```rust
//! use schemaform::{DeriveConfig, NamingStrategy};
//!
//! let config = DeriveConfig::new()
//!     .with_naming(NamingStrategy::SnakeCase)
//!     .with_discriminator("type");
//!
//! let from_json: DeriveConfig =
//!     serde_json::from_str(r#"{ "naming": "snake_case", "discriminator": "type" }"#).unwrap();
//! assert_eq!(from_json.discriminator.as_deref(), Some("type"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::FieldDescriptor;
use crate::naming::NamingStrategy;
use crate::schema::FieldName;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The discriminator field name is empty
    #[error("discriminator must not be empty")]
    EmptyDiscriminator,
}

/// Configuration shared by schema and codec derivation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    /// Naming transform applied to every field name
    pub naming: NamingStrategy,

    /// Discriminator field for coproducts that do not declare their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
}

impl DeriveConfig {
    /// Create a configuration with identity naming and no discriminator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming strategy.
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// Set the default coproduct discriminator.
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    /// Declared and encoded name of a field.
    ///
    /// An explicit rename wins over the naming strategy.
    pub fn field_name(&self, field: &FieldDescriptor) -> FieldName {
        let encoded = match &field.rename {
            Some(rename) => rename.clone(),
            None => self.naming.apply(&field.name),
        };
        FieldName::new(field.name.as_str()).with_encoded_name(encoded)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.discriminator.as_deref(), Some(d) if d.trim().is_empty()) {
            return Err(ConfigError::EmptyDiscriminator);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeriveConfig::default();
        assert!(matches!(config.naming, NamingStrategy::Identity));
        assert!(config.discriminator.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: DeriveConfig = serde_json::from_str(r#"{ "naming": "kebab_case" }"#).unwrap();
        assert_eq!(config.naming.apply("someFieldName"), "some-field-name");
        assert!(config.discriminator.is_none());
    }

    #[test]
    fn test_field_name_prefers_rename() {
        use crate::descriptor::{Primitive, TypeDescriptor};

        let config = DeriveConfig::new().with_naming(NamingStrategy::SnakeCase);
        let plain = FieldDescriptor::new("someField", TypeDescriptor::primitive(Primitive::I32));
        assert_eq!(config.field_name(&plain).encoded_name, "some_field");

        let renamed = plain.with_rename("sf");
        let name = config.field_name(&renamed);
        assert_eq!(name.name, "someField");
        assert_eq!(name.encoded_name, "sf");
    }

    #[test]
    fn test_empty_discriminator_is_rejected() {
        let config = DeriveConfig::new().with_discriminator(" ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyDiscriminator));
    }
}
