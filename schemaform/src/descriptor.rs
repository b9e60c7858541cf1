//! Type descriptors.
//!
//! A [`TypeDescriptor`] is the data the derivation engines consume: the shape of
//! a type as reported by an introspector (the derive macro, the blanket impls in
//! [`traits`](crate::traits), or hand-written registration).
//!
//! Nominal types resolve their bodies lazily through [`Deferred`] thunks, so a
//! self-referential type graph has a finite description.
//!
//! Every descriptor has two identities. [`TypeDescriptor::identity`] is the
//! [`ObjectInfo`] rendered into schemas, whose type parameters are short
//! display names. [`TypeDescriptor::key`] nests the complete keys of every
//! type argument, so `Page<a::Item>` and `Page<b::Item>` never share one;
//! recursion guards and caches use it.

use std::fmt;
use std::sync::Arc;

use crate::schema::ObjectInfo;
use crate::validation::Validator;

/// Primitive scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Char,
    String,
    /// Exact decimal number, carried as text to keep every digit
    Decimal,
    #[cfg(feature = "uuid")]
    Uuid,
    #[cfg(feature = "chrono")]
    DateTime,
}

impl Primitive {
    /// Rust-facing name of the primitive.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::String => "String",
            Primitive::Decimal => "Decimal",
            #[cfg(feature = "uuid")]
            Primitive::Uuid => "Uuid",
            #[cfg(feature = "chrono")]
            Primitive::DateTime => "DateTime",
        }
    }

    /// Check if this is an integer kind.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Primitive::I8
                | Primitive::I16
                | Primitive::I32
                | Primitive::I64
                | Primitive::U8
                | Primitive::U16
                | Primitive::U32
                | Primitive::U64
        )
    }
}

/// Kind of homogeneous collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered list (`Vec`, `VecDeque`)
    List,
    /// Set (`HashSet`, `BTreeSet`)
    Set,
    /// Fixed-size array
    Array,
}

impl CollectionKind {
    fn name(&self) -> &'static str {
        match self {
            CollectionKind::List => "Vec",
            CollectionKind::Set => "Set",
            CollectionKind::Array => "Array",
        }
    }
}

/// Complete identity of a type, including the complete identities of its
/// type arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(String);

impl TypeKey {
    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn nominal(info: &ObjectInfo, arguments: &[TypeKey]) -> Self {
        if arguments.is_empty() {
            return TypeKey(info.to_string());
        }
        let arguments: Vec<&str> = arguments.iter().map(TypeKey::as_str).collect();
        TypeKey(format!("{}<{}>", info.full_name, arguments.join(", ")))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lazily computed, shareable value.
pub struct Deferred<T>(Arc<dyn Fn() -> T + Send + Sync>);

impl<T> Deferred<T> {
    /// Wrap a thunk.
    pub fn new(thunk: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Deferred(Arc::new(thunk))
    }

    /// Evaluate the thunk.
    pub fn get(&self) -> T {
        (self.0)()
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Deferred(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// Description of a type's shape.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// Primitive scalar
    Primitive(Primitive),

    /// Value that may be absent
    Optional(Box<TypeDescriptor>),

    /// Homogeneous collection
    Collection {
        kind: CollectionKind,
        element: Box<TypeDescriptor>,
    },

    /// Associative container
    Map {
        info: ObjectInfo,
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },

    /// Single-field value class, transparent to derivation
    Wrapper(WrapperShape),

    /// Nominal record
    Product(ProductShape),

    /// Nominal closed sum
    Coproduct(CoproductShape),

    /// A type the introspector cannot look into
    Opaque(ObjectInfo),
}

impl TypeDescriptor {
    /// Describe a primitive.
    pub fn primitive(primitive: Primitive) -> Self {
        TypeDescriptor::Primitive(primitive)
    }

    /// Describe an optional value.
    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    /// Describe an ordered list.
    pub fn list(element: TypeDescriptor) -> Self {
        Self::collection(CollectionKind::List, element)
    }

    /// Describe a collection of the given kind.
    pub fn collection(kind: CollectionKind, element: TypeDescriptor) -> Self {
        TypeDescriptor::Collection {
            kind,
            element: Box::new(element),
        }
    }

    /// Describe a map with string keys.
    ///
    /// The identity is `Map` parametrized by the value type's short name
    /// followed by the value type's own type parameters.
    pub fn string_map(value: TypeDescriptor) -> Self {
        let mut parameters = vec![value.display_name()];
        if let Some(info) = value.nominal_info() {
            parameters.extend(info.type_parameters.iter().cloned());
        }
        TypeDescriptor::Map {
            info: ObjectInfo::new("Map").with_type_parameters(parameters),
            key: Box::new(TypeDescriptor::Primitive(Primitive::String)),
            value: Box::new(value),
        }
    }

    /// Describe a value class wrapping the type produced by `inner`.
    pub fn wrapper(
        info: ObjectInfo,
        inner: impl Fn() -> TypeDescriptor + Send + Sync + 'static,
    ) -> Self {
        TypeDescriptor::Wrapper(WrapperShape {
            info,
            arguments: Vec::new(),
            inner: Deferred::new(inner),
        })
    }

    /// Describe a record whose fields are produced by `fields`.
    pub fn product(
        info: ObjectInfo,
        fields: impl Fn() -> Vec<FieldDescriptor> + Send + Sync + 'static,
    ) -> Self {
        TypeDescriptor::Product(ProductShape {
            info,
            arguments: Vec::new(),
            fields: Deferred::new(fields),
        })
    }

    /// Describe a closed sum whose variants are produced by `variants`.
    pub fn coproduct(
        info: ObjectInfo,
        variants: impl Fn() -> Vec<TypeDescriptor> + Send + Sync + 'static,
    ) -> Self {
        TypeDescriptor::Coproduct(CoproductShape {
            info,
            arguments: Vec::new(),
            variants: Deferred::new(variants),
            discriminator: None,
        })
    }

    /// Describe a type that cannot be inspected.
    pub fn opaque(info: ObjectInfo) -> Self {
        TypeDescriptor::Opaque(info)
    }

    /// Set the discriminator of a coproduct. Other kinds are returned unchanged.
    pub fn with_discriminator(self, discriminator: impl Into<String>) -> Self {
        match self {
            TypeDescriptor::Coproduct(mut shape) => {
                shape.discriminator = Some(discriminator.into());
                TypeDescriptor::Coproduct(shape)
            }
            other => other,
        }
    }

    /// Record the actual type arguments of a generic nominal type.
    ///
    /// Their display names become the identity's type parameters and their
    /// keys extend [`TypeDescriptor::key`]. Other kinds are returned unchanged.
    pub fn with_type_arguments(self, arguments: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let arguments: Vec<TypeDescriptor> = arguments.into_iter().collect();
        let names = arguments.iter().map(TypeDescriptor::display_name);
        let keys = arguments.iter().map(TypeDescriptor::key).collect();

        match self {
            TypeDescriptor::Wrapper(mut shape) => {
                shape.info = shape.info.with_type_parameters(names);
                shape.arguments = keys;
                TypeDescriptor::Wrapper(shape)
            }
            TypeDescriptor::Product(mut shape) => {
                shape.info = shape.info.with_type_parameters(names);
                shape.arguments = keys;
                TypeDescriptor::Product(shape)
            }
            TypeDescriptor::Coproduct(mut shape) => {
                shape.info = shape.info.with_type_parameters(names);
                shape.arguments = keys;
                TypeDescriptor::Coproduct(shape)
            }
            other => other,
        }
    }

    /// Complete identity of the described type.
    ///
    /// Nominal kinds never evaluate their bodies, so this is finite for
    /// recursive types.
    pub fn key(&self) -> TypeKey {
        match self {
            TypeDescriptor::Primitive(p) => TypeKey(p.name().to_string()),
            TypeDescriptor::Optional(inner) => TypeKey(format!("Option<{}>", inner.key())),
            TypeDescriptor::Collection { kind, element } => {
                TypeKey(format!("{}<{}>", kind.name(), element.key()))
            }
            TypeDescriptor::Map { key, value, .. } => {
                TypeKey(format!("Map<{}, {}>", key.key(), value.key()))
            }
            TypeDescriptor::Wrapper(w) => w.key(),
            TypeDescriptor::Product(p) => p.key(),
            TypeDescriptor::Coproduct(c) => c.key(),
            TypeDescriptor::Opaque(info) => TypeKey(info.to_string()),
        }
    }

    /// Identity of the described type.
    ///
    /// Nominal kinds return their own info; structural kinds synthesize one
    /// from the container name and the element's display name.
    pub fn identity(&self) -> ObjectInfo {
        match self {
            TypeDescriptor::Primitive(p) => ObjectInfo::new(p.name()),
            TypeDescriptor::Optional(inner) => {
                ObjectInfo::new("Option").with_type_parameters([inner.display_name()])
            }
            TypeDescriptor::Collection { kind, element } => {
                ObjectInfo::new(kind.name()).with_type_parameters([element.display_name()])
            }
            TypeDescriptor::Map { info, .. } => info.clone(),
            TypeDescriptor::Wrapper(w) => w.info.clone(),
            TypeDescriptor::Product(p) => p.info.clone(),
            TypeDescriptor::Coproduct(c) => c.info.clone(),
            TypeDescriptor::Opaque(info) => info.clone(),
        }
    }

    /// Identity of nominal kinds only (wrappers, products, coproducts, opaque).
    pub fn nominal_info(&self) -> Option<&ObjectInfo> {
        match self {
            TypeDescriptor::Wrapper(w) => Some(&w.info),
            TypeDescriptor::Product(p) => Some(&p.info),
            TypeDescriptor::Coproduct(c) => Some(&c.info),
            TypeDescriptor::Opaque(info) => Some(info),
            _ => None,
        }
    }

    /// Short name used when this type appears as a type argument.
    pub fn display_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(p) => p.name().to_string(),
            TypeDescriptor::Optional(_) => "Option".to_string(),
            TypeDescriptor::Collection { kind, .. } => kind.name().to_string(),
            TypeDescriptor::Map { .. } => "Map".to_string(),
            TypeDescriptor::Wrapper(w) => w.info.short_name().to_string(),
            TypeDescriptor::Product(p) => p.info.short_name().to_string(),
            TypeDescriptor::Coproduct(c) => c.info.short_name().to_string(),
            TypeDescriptor::Opaque(info) => info.short_name().to_string(),
        }
    }

    /// Check if values of this type may be absent, looking through value classes.
    pub fn is_optional(&self) -> bool {
        match self {
            TypeDescriptor::Optional(_) => true,
            TypeDescriptor::Wrapper(w) => w.inner.get().is_optional(),
            _ => false,
        }
    }
}

/// Body of a value class.
#[derive(Debug, Clone)]
pub struct WrapperShape {
    /// Identity of the wrapper type
    pub info: ObjectInfo,

    /// Complete keys of the actual type arguments
    pub arguments: Vec<TypeKey>,

    /// The wrapped type
    pub inner: Deferred<TypeDescriptor>,
}

impl WrapperShape {
    /// Complete identity of the wrapper type.
    pub fn key(&self) -> TypeKey {
        TypeKey::nominal(&self.info, &self.arguments)
    }
}

/// Body of a nominal record.
#[derive(Debug, Clone)]
pub struct ProductShape {
    /// Identity of the record type
    pub info: ObjectInfo,

    /// Complete keys of the actual type arguments
    pub arguments: Vec<TypeKey>,

    /// Fields in declaration order
    pub fields: Deferred<Vec<FieldDescriptor>>,
}

impl ProductShape {
    /// Complete identity of the record type.
    pub fn key(&self) -> TypeKey {
        TypeKey::nominal(&self.info, &self.arguments)
    }
}

/// Body of a nominal closed sum.
#[derive(Debug, Clone)]
pub struct CoproductShape {
    /// Identity of the sum type
    pub info: ObjectInfo,

    /// Complete keys of the actual type arguments
    pub arguments: Vec<TypeKey>,

    /// Direct variants, each describing a product
    pub variants: Deferred<Vec<TypeDescriptor>>,

    /// Discriminator declared on the type itself
    pub discriminator: Option<String>,
}

impl CoproductShape {
    /// Complete identity of the sum type.
    pub fn key(&self) -> TypeKey {
        TypeKey::nominal(&self.info, &self.arguments)
    }
}

/// A field of a nominal record.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Declared field name
    pub name: String,

    /// Explicit wire name, bypassing the naming strategy
    pub rename: Option<String>,

    /// Field type
    pub ty: TypeDescriptor,

    /// Validators checked when decoding this field
    pub validators: Vec<Validator>,

    /// Field description
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Create a new field.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            rename: None,
            ty,
            validators: Vec::new(),
            description: None,
        }
    }

    /// Set an explicit wire name.
    pub fn with_rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }

    /// Add a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this field may be absent.
    pub fn is_optional(&self) -> bool {
        self.ty.is_optional()
    }
}
