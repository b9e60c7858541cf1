//! Form codec derivation and the derived codecs.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use super::scalar::{PrimitiveCodec, ScalarCodec};
use super::{DecodeError, DecodeResult};
use crate::descriptor::{ProductShape, TypeDescriptor, TypeKey, WrapperShape};
use crate::engine::SchemaDeriver;
use crate::error::DeriveError;
use crate::schema::{ObjectInfo, Schema};
use crate::traits::Describe;
use crate::validation::{validate_all, Validator};
use crate::value::{Record, Value};

/// How a field maps onto pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldMode {
    /// Exactly one pair
    Required,
    /// Zero or one pair
    Optional,
    /// One pair per list element
    Repeated,
}

/// Per-field codec of a form codec.
struct FieldCodec {
    /// Declared name, used as the record key
    name: String,
    /// Wire key
    key: String,
    mode: FieldMode,
    scalar: Arc<dyn ScalarCodec>,
    validators: Vec<Validator>,
}

impl FieldCodec {
    fn decode_one(&self, raw: &str) -> DecodeResult<Value> {
        let value = self
            .scalar
            .decode(raw)
            .map_err(|cause| DecodeError::Malformed {
                field: self.key.clone(),
                raw: raw.to_string(),
                cause,
            })?;

        validate_all(&self.validators, &value).map_err(|violation| DecodeError::InvalidValue {
            field: self.key.clone(),
            value: violation.value,
            constraint: violation.constraint,
        })?;

        Ok(value)
    }

    fn decode(&self, mut raws: Vec<String>) -> DecodeResult<Value> {
        match self.mode {
            FieldMode::Repeated => raws
                .iter()
                .map(|raw| self.decode_one(raw))
                .collect::<DecodeResult<Vec<_>>>()
                .map(Value::List),
            _ if raws.len() > 1 => Err(DecodeError::Multiple {
                field: self.key.clone(),
                values: raws,
            }),
            FieldMode::Optional => match raws.pop() {
                Some(raw) => self.decode_one(&raw),
                None => Ok(Value::Absent),
            },
            FieldMode::Required => match raws.pop() {
                Some(raw) => self.decode_one(&raw),
                None => Err(DecodeError::Missing {
                    field: self.key.clone(),
                }),
            },
        }
    }
}

/// A derived codec between product values and the flat form format.
///
/// Codecs are immutable and can be shared across threads.
pub struct FormCodec {
    info: ObjectInfo,
    schema: Schema,
    fields: Vec<FieldCodec>,
}

impl FormCodec {
    /// Identity of the product this codec handles.
    pub fn info(&self) -> &ObjectInfo {
        &self.info
    }

    /// Schema of the product, derived with the same configuration.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Wire keys in field declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// Encode a product value.
    ///
    /// Fields missing from the record are treated as absent.
    pub fn encode(&self, value: &Value) -> String {
        let record = match value {
            Value::Record(record) => Some(record),
            _ => None,
        };
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        for field in &self.fields {
            let Some(value) = record.and_then(|r| r.get(&field.name)) else {
                continue;
            };
            match value {
                Value::Absent => {}
                Value::List(items) if field.mode == FieldMode::Repeated => {
                    for item in items {
                        serializer.append_pair(&field.key, &field.scalar.encode(item));
                    }
                }
                other => {
                    serializer.append_pair(&field.key, &field.scalar.encode(other));
                }
            }
        }

        serializer.finish()
    }

    /// Decode a wire string into a product value.
    pub fn decode(&self, input: &str) -> DecodeResult<Value> {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in form_urlencoded::parse(input.as_bytes()) {
            groups
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        let mut record = Record::with_capacity(self.fields.len());
        for field in &self.fields {
            let raws = groups.remove(&field.key).unwrap_or_default();
            let value = field.decode(raws).map_err(|err| {
                debug!(
                    type_name = %self.info,
                    field = %field.key,
                    kind = err.kind(),
                    "Form decode failed"
                );
                err
            })?;
            record.insert(field.name.clone(), value);
        }

        if !groups.is_empty() {
            let unknown: Vec<&String> = groups.keys().collect();
            trace!(type_name = %self.info, keys = ?unknown, "Ignoring unknown form keys");
        }

        Ok(Value::Record(record))
    }
}

impl fmt::Debug for FormCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCodec")
            .field("info", &self.info)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A form codec bound to a Rust type.
pub struct TypedCodec<T> {
    codec: Arc<FormCodec>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Describe> TypedCodec<T> {
    /// Bind a form codec derived from `T::descriptor()`.
    pub fn new(codec: Arc<FormCodec>) -> Self {
        Self {
            codec,
            marker: PhantomData,
        }
    }

    /// Encode a value.
    pub fn encode(&self, value: &T) -> String {
        self.codec.encode(&value.to_value())
    }

    /// Decode a wire string.
    pub fn decode(&self, input: &str) -> DecodeResult<T> {
        let value = self.codec.decode(input)?;
        T::from_value(value).map_err(|err| DecodeError::Mismatch {
            type_name: self.codec.info().to_string(),
            cause: err.to_string(),
        })
    }

    /// Schema of the product.
    pub fn schema(&self) -> &Schema {
        self.codec.schema()
    }

    /// The untyped codec.
    pub fn form_codec(&self) -> &Arc<FormCodec> {
        &self.codec
    }
}

impl<T> Clone for TypedCodec<T> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedCodec").field(&self.codec).finish()
    }
}

/// Derives form codecs from type descriptors.
///
/// Field names come from the same configuration as the embedded
/// [`SchemaDeriver`], so codec keys always match schema field names.
#[derive(Clone, Copy)]
pub struct CodecDeriver<'a> {
    schemas: SchemaDeriver<'a>,
    scalars: Option<&'a HashMap<ObjectInfo, Arc<dyn ScalarCodec>>>,
    validators: Option<&'a HashMap<ObjectInfo, Vec<Validator>>>,
}

impl<'a> CodecDeriver<'a> {
    /// Create a deriver on top of a schema deriver.
    pub fn new(schemas: SchemaDeriver<'a>) -> Self {
        Self {
            schemas,
            scalars: None,
            validators: None,
        }
    }

    /// Use custom scalar codecs keyed by type identity.
    pub fn with_scalar_codecs(
        mut self,
        scalars: &'a HashMap<ObjectInfo, Arc<dyn ScalarCodec>>,
    ) -> Self {
        self.scalars = Some(scalars);
        self
    }

    /// Use validators bound to type identities.
    pub fn with_validators(mut self, validators: &'a HashMap<ObjectInfo, Vec<Validator>>) -> Self {
        self.validators = Some(validators);
        self
    }

    /// Derive the form codec of a product type.
    pub fn derive(&self, descriptor: &TypeDescriptor) -> Result<FormCodec, DeriveError> {
        let schema = self.schemas.derive(descriptor)?;
        let shape = product_shape(descriptor)?;
        let config = self.schemas.config();

        let mut fields = Vec::new();
        for field in shape.fields.get() {
            let mut validators = field.validators.clone();
            let plan = self.field_plan(&field.ty, &mut validators, &mut Vec::new())?;
            let Some((mode, scalar)) = plan else {
                return Err(DeriveError::NoFieldCodec {
                    type_name: shape.info.to_string(),
                    field: field.name.clone(),
                });
            };
            let name = config.field_name(&field);
            fields.push(FieldCodec {
                name: name.name,
                key: name.encoded_name,
                mode,
                scalar,
                validators,
            });
        }

        debug!(
            type_name = %shape.info,
            fields = fields.len(),
            "Derived form codec"
        );

        Ok(FormCodec {
            info: shape.info,
            schema,
            fields,
        })
    }

    fn field_plan(
        &self,
        ty: &TypeDescriptor,
        validators: &mut Vec<Validator>,
        seen: &mut Vec<TypeKey>,
    ) -> Result<Option<(FieldMode, Arc<dyn ScalarCodec>)>, DeriveError> {
        if let Some(codec) = self.scalar_override(ty, validators) {
            return Ok(Some((FieldMode::Required, codec)));
        }

        let plan = match ty {
            TypeDescriptor::Optional(inner) => self
                .scalar(inner, validators, seen)?
                .map(|codec| (FieldMode::Optional, codec)),
            TypeDescriptor::Collection { element, .. } => self
                .scalar(element, validators, seen)?
                .map(|codec| (FieldMode::Repeated, codec)),
            TypeDescriptor::Wrapper(shape) => {
                self.enter(shape, validators, seen)?;
                return self.field_plan(&shape.inner.get(), validators, seen);
            }
            other => self
                .scalar(other, validators, seen)?
                .map(|codec| (FieldMode::Required, codec)),
        };
        Ok(plan)
    }

    fn scalar(
        &self,
        ty: &TypeDescriptor,
        validators: &mut Vec<Validator>,
        seen: &mut Vec<TypeKey>,
    ) -> Result<Option<Arc<dyn ScalarCodec>>, DeriveError> {
        if let Some(codec) = self.scalar_override(ty, validators) {
            return Ok(Some(codec));
        }

        match ty {
            TypeDescriptor::Primitive(primitive) => {
                self.bind(&ty.identity(), validators);
                Ok(Some(Arc::new(PrimitiveCodec(*primitive))))
            }
            TypeDescriptor::Wrapper(shape) => {
                self.enter(shape, validators, seen)?;
                self.scalar(&shape.inner.get(), validators, seen)
            }
            _ => Ok(None),
        }
    }

    fn scalar_override(
        &self,
        ty: &TypeDescriptor,
        validators: &mut Vec<Validator>,
    ) -> Option<Arc<dyn ScalarCodec>> {
        let identity = ty.identity();
        let codec = self.scalars?.get(&identity)?.clone();
        trace!(type_name = %identity, "Using codec override");
        self.bind(&identity, validators);
        Some(codec)
    }

    fn enter(
        &self,
        shape: &WrapperShape,
        validators: &mut Vec<Validator>,
        seen: &mut Vec<TypeKey>,
    ) -> Result<(), DeriveError> {
        let key = shape.key();
        if seen.contains(&key) {
            return Err(DeriveError::RecursiveValueClass {
                type_name: shape.info.to_string(),
            });
        }
        seen.push(key);
        self.bind(&shape.info, validators);
        Ok(())
    }

    fn bind(&self, info: &ObjectInfo, validators: &mut Vec<Validator>) {
        if let Some(bound) = self.validators.and_then(|v| v.get(info)) {
            validators.extend(bound.iter().cloned());
        }
    }
}

impl fmt::Debug for CodecDeriver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecDeriver")
            .field("schemas", &self.schemas)
            .finish_non_exhaustive()
    }
}

/// Find the product body of a type, looking through value classes.
fn product_shape(descriptor: &TypeDescriptor) -> Result<ProductShape, DeriveError> {
    let mut current = descriptor.clone();
    let mut seen = Vec::new();
    loop {
        match current {
            TypeDescriptor::Product(shape) => return Ok(shape),
            TypeDescriptor::Wrapper(shape) => {
                let key = shape.key();
                if seen.contains(&key) {
                    return Err(DeriveError::RecursiveValueClass {
                        type_name: shape.info.to_string(),
                    });
                }
                current = shape.inner.get();
                seen.push(key);
            }
            other => return Err(DeriveError::no_derivation(&other.identity())),
        }
    }
}
