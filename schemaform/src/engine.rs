//! Schema derivation engine.
//!
//! [`SchemaDeriver`] walks a [`TypeDescriptor`] and builds the matching
//! [`SchemaNode`] tree. Dispatch follows a fixed priority:
//!
//! 1. An override registered for the type's identity is returned verbatim.
//! 2. Primitives map to fixed leaves (decimals are text, not numbers).
//! 3. Value classes are transparent.
//! 4. Optional types derive their inner type; optionality is reported
//!    out-of-band on [`Schema::is_optional`] and drops the field from
//!    `required`.
//! 5. Collections become [`SchemaNode::Array`].
//! 6. String-keyed maps become [`SchemaNode::OpenProduct`].
//! 7. Records become [`SchemaNode::Product`].
//! 8. Closed sums become [`SchemaNode::Coproduct`].
//! 9. Anything else fails with [`DeriveError::NoDerivation`].
//!
//! Every call to [`SchemaDeriver::derive`] runs in a private session. Before a
//! product or coproduct body is expanded its [`TypeKey`] is marked in
//! progress; meeting that key again during the expansion yields
//! [`SchemaNode::Ref`] instead of recursing. The session never leaves the
//! calling thread, so concurrent derivations of the same type cannot observe
//! each other's partial state.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::config::DeriveConfig;
use crate::descriptor::{CoproductShape, Primitive, ProductShape, TypeDescriptor, TypeKey};
use crate::error::DeriveError;
use crate::schema::{
    CoproductSchema, ObjectInfo, OpenProductSchema, ProductField, ProductSchema, Schema,
    SchemaNode,
};

/// Leaf schema of a primitive.
pub fn primitive_schema(primitive: Primitive) -> SchemaNode {
    match primitive {
        Primitive::I8
        | Primitive::I16
        | Primitive::I32
        | Primitive::I64
        | Primitive::U8
        | Primitive::U16
        | Primitive::U32
        | Primitive::U64 => SchemaNode::Integer,
        Primitive::F32 | Primitive::F64 => SchemaNode::Number,
        Primitive::Bool => SchemaNode::Boolean,
        Primitive::Char | Primitive::String | Primitive::Decimal => SchemaNode::String,
        #[cfg(feature = "uuid")]
        Primitive::Uuid => SchemaNode::String,
        #[cfg(feature = "chrono")]
        Primitive::DateTime => SchemaNode::String,
    }
}

/// Derives schemas from type descriptors.
///
/// A deriver only borrows its configuration and override table, so it is
/// cheap to build per request.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDeriver<'a> {
    config: &'a DeriveConfig,
    overrides: Option<&'a HashMap<ObjectInfo, SchemaNode>>,
}

impl<'a> SchemaDeriver<'a> {
    /// Create a deriver without overrides.
    pub fn new(config: &'a DeriveConfig) -> Self {
        Self {
            config,
            overrides: None,
        }
    }

    /// Use the given override table (rule 1).
    pub fn with_overrides(mut self, overrides: &'a HashMap<ObjectInfo, SchemaNode>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// The configuration snapshot used by this deriver.
    pub fn config(&self) -> &'a DeriveConfig {
        self.config
    }

    /// Derive the schema of a type.
    pub fn derive(&self, descriptor: &TypeDescriptor) -> Result<Schema, DeriveError> {
        let identity = descriptor.identity();
        debug!(type_name = %identity, "Deriving schema");

        let mut session = Session::new(*self);
        let node = session.node(descriptor).map_err(|err| {
            debug!(type_name = %identity, error = %err, "Schema derivation failed");
            err
        })?;

        trace!(
            type_name = %identity,
            expanded = session.slots.len(),
            "Schema derivation completed"
        );

        Ok(Schema {
            node,
            is_optional: descriptor.is_optional(),
        })
    }
}

/// State of a nominal type within one derivation.
#[derive(Debug)]
enum Slot {
    InProgress,
    Completed(SchemaNode),
}

/// Per-call derivation state.
struct Session<'a> {
    deriver: SchemaDeriver<'a>,
    slots: HashMap<TypeKey, Slot>,

    /// Value classes being looked through since the last nominal boundary
    wrappers: Vec<TypeKey>,
}

impl<'a> Session<'a> {
    fn new(deriver: SchemaDeriver<'a>) -> Self {
        Self {
            deriver,
            slots: HashMap::new(),
            wrappers: Vec::new(),
        }
    }

    fn node(&mut self, descriptor: &TypeDescriptor) -> Result<SchemaNode, DeriveError> {
        if let Some(overrides) = self.deriver.overrides {
            let identity = descriptor.identity();
            if let Some(node) = overrides.get(&identity) {
                trace!(type_name = %identity, "Using schema override");
                return Ok(node.clone());
            }
        }

        match descriptor {
            TypeDescriptor::Primitive(primitive) => Ok(primitive_schema(*primitive)),

            TypeDescriptor::Wrapper(shape) => {
                let key = shape.key();
                if self.wrappers.contains(&key) {
                    return Err(DeriveError::RecursiveValueClass {
                        type_name: shape.info.to_string(),
                    });
                }
                self.wrappers.push(key);
                let inner = self.node(&shape.inner.get());
                self.wrappers.pop();
                inner
            }

            TypeDescriptor::Optional(inner) => self.node(inner),

            TypeDescriptor::Collection { element, .. } => Ok(SchemaNode::array(self.node(element)?)),

            TypeDescriptor::Map { info, key, value } => {
                if !matches!(key.as_ref(), TypeDescriptor::Primitive(Primitive::String)) {
                    let map = ObjectInfo::new("Map")
                        .with_type_parameters([key.display_name(), value.display_name()]);
                    return Err(DeriveError::no_derivation(&map));
                }
                let value = self.node(value)?;
                Ok(SchemaNode::OpenProduct(OpenProductSchema::new(info.clone(), value)))
            }

            TypeDescriptor::Product(shape) => {
                self.nominal(shape.key(), &shape.info, |session| session.product(shape))
            }

            TypeDescriptor::Coproduct(shape) => {
                self.nominal(shape.key(), &shape.info, |session| session.coproduct(shape))
            }

            TypeDescriptor::Opaque(info) => Err(DeriveError::no_derivation(info)),
        }
    }

    /// Expand a nominal body under the recursion guard.
    fn nominal(
        &mut self,
        key: TypeKey,
        info: &ObjectInfo,
        expand: impl FnOnce(&mut Self) -> Result<SchemaNode, DeriveError>,
    ) -> Result<SchemaNode, DeriveError> {
        match self.slots.get(&key) {
            Some(Slot::InProgress) => {
                trace!(type_name = %key, "Recursive reference, emitting placeholder");
                return Ok(SchemaNode::reference(info.clone()));
            }
            Some(Slot::Completed(node)) => return Ok(node.clone()),
            None => {}
        }

        self.slots.insert(key.clone(), Slot::InProgress);
        let outer_wrappers = std::mem::take(&mut self.wrappers);

        let result = expand(self);

        self.wrappers = outer_wrappers;
        match &result {
            // A node holding placeholders is only valid below the types that
            // were in progress when it was built.
            Ok(node) if !node.contains_ref() => {
                self.slots.insert(key, Slot::Completed(node.clone()));
            }
            _ => {
                self.slots.remove(&key);
            }
        }
        result
    }

    fn product(&mut self, shape: &ProductShape) -> Result<SchemaNode, DeriveError> {
        let config = self.deriver.config;
        let mut product = ProductSchema::new(shape.info.clone());

        for field in shape.fields.get() {
            let node = self.node(&field.ty)?;
            let mut entry = ProductField::new(config.field_name(&field), node);
            if let Some(description) = &field.description {
                entry = entry.with_description(description.as_str());
            }
            product = product.with_product_field(entry, field.is_optional());
        }

        Ok(SchemaNode::Product(product))
    }

    fn coproduct(&mut self, shape: &CoproductShape) -> Result<SchemaNode, DeriveError> {
        let mut variants = BTreeSet::new();

        for variant in shape.variants.get() {
            match self.node(&variant)? {
                node @ (SchemaNode::Product(_) | SchemaNode::Ref(_)) => {
                    variants.insert(node);
                }
                _ => {
                    return Err(DeriveError::InvalidVariant {
                        type_name: shape.info.to_string(),
                        variant: variant.identity().to_string(),
                    })
                }
            }
        }

        let discriminator = shape
            .discriminator
            .clone()
            .or_else(|| self.deriver.config.discriminator.clone());

        Ok(SchemaNode::Coproduct(CoproductSchema {
            info: shape.info.clone(),
            variants,
            discriminator,
        }))
    }
}
