//! Schema and codec registry.
//!
//! A [`Registry`] answers "the schema for `T`" and "the codec for `T`" by an
//! explicit lookup-or-derive-and-cache call. Overrides registered up front
//! take precedence over derivation for the identities they name.
//!
//! Only completed results of nominal types are cached, keyed by their complete
//! [`TypeKey`], so every generic instantiation has its own entry. In-progress
//! recursion state lives in the per-call derivation session and is never
//! shared, so a registry can serve many threads at once.
//!
//! # Example
//!
//! ```rust
//! use schemaform::{Describe, DeriveConfig, NamingStrategy, Registry};
//!
//! #[derive(Debug, PartialEq, Describe)]
//! struct Search {
//!     query: String,
//!     page: Option<u32>,
//! }
//!
//! let registry = Registry::new(DeriveConfig::new().with_naming(NamingStrategy::SnakeCase))?;
//! let codec = registry.codec_for::<Search>().unwrap();
//!
//! let wire = codec.encode(&Search { query: "rust lang".into(), page: None });
//! assert_eq!(wire, "query=rust+lang");
//! assert_eq!(
//!     codec.decode("query=rust&page=2").unwrap(),
//!     Search { query: "rust".into(), page: Some(2) }
//! );
//! # Ok::<(), schemaform::ConfigError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::codec::{CodecDeriver, FormCodec, ScalarCodec, TypedCodec};
use crate::config::{ConfigError, DeriveConfig};
use crate::descriptor::{TypeDescriptor, TypeKey};
use crate::engine::SchemaDeriver;
use crate::error::DeriveError;
use crate::schema::{ObjectInfo, Schema, SchemaNode};
use crate::traits::Describe;
use crate::validation::Validator;

/// Lookup-or-derive-and-cache registry for schemas and form codecs.
pub struct Registry {
    config: DeriveConfig,
    schema_overrides: HashMap<ObjectInfo, SchemaNode>,
    codec_overrides: HashMap<ObjectInfo, Arc<dyn ScalarCodec>>,
    validators: HashMap<ObjectInfo, Vec<Validator>>,
    schemas: DashMap<TypeKey, Schema>,
    codecs: DashMap<TypeKey, Arc<FormCodec>>,
}

impl Registry {
    /// Create an empty registry, rejecting an invalid configuration.
    pub fn new(config: DeriveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: DeriveConfig) -> Self {
        Self {
            config,
            schema_overrides: HashMap::new(),
            codec_overrides: HashMap::new(),
            validators: HashMap::new(),
            schemas: DashMap::new(),
            codecs: DashMap::new(),
        }
    }

    /// Use `node` as the schema of the type with the given identity.
    pub fn with_schema_override(mut self, info: ObjectInfo, node: SchemaNode) -> Self {
        self.schema_overrides.insert(info, node);
        self
    }

    /// Use `codec` for fields of the type with the given identity.
    pub fn with_codec_override(
        mut self,
        info: ObjectInfo,
        codec: impl ScalarCodec + 'static,
    ) -> Self {
        self.codec_overrides.insert(info, Arc::new(codec));
        self
    }

    /// Check every decoded value of the type with the given identity.
    pub fn with_validator(mut self, info: ObjectInfo, validator: Validator) -> Self {
        self.validators.entry(info).or_default().push(validator);
        self
    }

    /// The configuration shared by schema and codec derivation.
    pub fn config(&self) -> &DeriveConfig {
        &self.config
    }

    fn schema_deriver(&self) -> SchemaDeriver<'_> {
        SchemaDeriver::new(&self.config).with_overrides(&self.schema_overrides)
    }

    fn codec_deriver(&self) -> CodecDeriver<'_> {
        CodecDeriver::new(self.schema_deriver())
            .with_scalar_codecs(&self.codec_overrides)
            .with_validators(&self.validators)
    }

    /// Schema of `T`.
    pub fn schema_for<T: Describe>(&self) -> Result<Schema, DeriveError> {
        self.schema(&T::descriptor())
    }

    /// Schema of the described type.
    pub fn schema(&self, descriptor: &TypeDescriptor) -> Result<Schema, DeriveError> {
        let key = cache_key(descriptor);

        if let Some(key) = &key {
            if let Some(cached) = self.schemas.get(key) {
                trace!(type_name = %key, "Schema cache hit");
                return Ok(cached.value().clone());
            }
        }

        let schema = self.schema_deriver().derive(descriptor)?;

        if let Some(key) = key {
            debug!(type_name = %key, "Caching schema");
            self.schemas.insert(key, schema.clone());
        }
        Ok(schema)
    }

    /// Form codec of `T`.
    pub fn codec_for<T: Describe>(&self) -> Result<TypedCodec<T>, DeriveError> {
        self.codec(&T::descriptor()).map(TypedCodec::new)
    }

    /// Form codec of the described product type.
    pub fn codec(&self, descriptor: &TypeDescriptor) -> Result<Arc<FormCodec>, DeriveError> {
        let key = cache_key(descriptor);

        if let Some(key) = &key {
            if let Some(cached) = self.codecs.get(key) {
                trace!(type_name = %key, "Codec cache hit");
                return Ok(Arc::clone(cached.value()));
            }
        }

        let codec = Arc::new(self.codec_deriver().derive(descriptor)?);

        if let Some(key) = key {
            debug!(type_name = %key, "Caching codec");
            self.codecs.insert(key, Arc::clone(&codec));
        }
        Ok(codec)
    }

    /// Keys of the cached schemas, sorted.
    pub fn cached_schemas(&self) -> Vec<TypeKey> {
        let mut keys: Vec<TypeKey> = self.schemas.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Drop every cached schema and codec. Overrides are kept.
    pub fn clear_cache(&self) {
        self.schemas.clear();
        self.codecs.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_valid_config(DeriveConfig::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("schema_overrides", &self.schema_overrides.len())
            .field("codec_overrides", &self.codec_overrides.len())
            .field("validators", &self.validators.len())
            .field("cached_schemas", &self.schemas.len())
            .field("cached_codecs", &self.codecs.len())
            .finish()
    }
}

/// Cache key of a descriptor. Only nominal kinds are cached.
fn cache_key(descriptor: &TypeDescriptor) -> Option<TypeKey> {
    match descriptor {
        TypeDescriptor::Wrapper(_) | TypeDescriptor::Product(_) | TypeDescriptor::Coproduct(_) => {
            Some(descriptor.key())
        }
        _ => None,
    }
}
