//! Schema model definitions.
//!
//! This module defines the immutable schema tree produced by derivation.
//! A [`SchemaNode`] describes the shape of a type independently of any wire
//! format; [`ObjectInfo`] names the nominal types that appear in the tree.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a nominal type.
///
/// Two values are equal when both the full name and the type parameter names
/// match element-wise. Type parameters are short display names, so
/// `Page<a::Item>` and `Page<b::Item>` render alike; the complete identity of
/// a type is its [`TypeKey`](crate::descriptor::TypeKey).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Fully qualified type name (e.g., "shop::model::Order")
    pub full_name: String,

    /// Names of the actual type arguments, in argument order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
}

impl ObjectInfo {
    /// Create an identity without type parameters.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            type_parameters: Vec::new(),
        }
    }

    /// Set the type parameter names.
    pub fn with_type_parameters(
        mut self,
        parameters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.type_parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// The last path segment of the full name.
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit("::")
            .next()
            .unwrap_or(self.full_name.as_str())
    }

    /// Check if this identity carries type parameters.
    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)?;
        if !self.type_parameters.is_empty() {
            write!(f, "<{}>", self.type_parameters.join(", "))?;
        }
        Ok(())
    }
}

/// Name of a product field, before and after the naming transform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldName {
    /// Field name as declared
    pub name: String,

    /// Field name as emitted in schemas and on the wire
    pub encoded_name: String,
}

impl FieldName {
    /// Create a field name whose encoded form equals the declared one.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            encoded_name: name.clone(),
            name,
        }
    }

    /// Set the encoded name.
    pub fn with_encoded_name(mut self, encoded_name: impl Into<String>) -> Self {
        self.encoded_name = encoded_name.into();
        self
    }
}

/// A node of the schema tree.
///
/// Nodes have no identity beyond structural equality. A tree derived for a
/// non-recursive type never contains [`SchemaNode::Ref`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SchemaNode {
    // ==========================================================================
    // Primitives
    // ==========================================================================
    /// Text
    String,

    /// Signed or unsigned integer of any width
    Integer,

    /// Floating point number
    Number,

    /// Boolean
    Boolean,

    // ==========================================================================
    // Structural
    // ==========================================================================
    /// Ordered homogeneous collection
    Array(Box<SchemaNode>),

    /// Closed record with named fields
    Product(ProductSchema),

    /// Record with dynamic string keys sharing one value schema
    OpenProduct(OpenProductSchema),

    /// Closed sum of product shapes
    Coproduct(CoproductSchema),

    /// Placeholder for a type already being expanded in the same derivation
    Ref(ObjectInfo),
}

impl SchemaNode {
    /// Create an array node.
    pub fn array(element: SchemaNode) -> Self {
        SchemaNode::Array(Box::new(element))
    }

    /// Create a reference placeholder.
    pub fn reference(info: ObjectInfo) -> Self {
        SchemaNode::Ref(info)
    }

    /// The identity carried by structural nodes.
    pub fn info(&self) -> Option<&ObjectInfo> {
        match self {
            SchemaNode::Product(p) => Some(&p.info),
            SchemaNode::OpenProduct(o) => Some(&o.info),
            SchemaNode::Coproduct(c) => Some(&c.info),
            SchemaNode::Ref(info) => Some(info),
            _ => None,
        }
    }

    /// Check if this is a primitive leaf.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            SchemaNode::String | SchemaNode::Integer | SchemaNode::Number | SchemaNode::Boolean
        )
    }

    /// Check if a reference placeholder occurs anywhere in this tree.
    pub fn contains_ref(&self) -> bool {
        match self {
            SchemaNode::Ref(_) => true,
            SchemaNode::Array(element) => element.contains_ref(),
            SchemaNode::Product(p) => p.fields.iter().any(|f| f.schema.contains_ref()),
            SchemaNode::OpenProduct(o) => o.value.contains_ref(),
            SchemaNode::Coproduct(c) => c.variants.iter().any(SchemaNode::contains_ref),
            _ => false,
        }
    }

    /// Borrow the product body, if this is a product.
    pub fn as_product(&self) -> Option<&ProductSchema> {
        match self {
            SchemaNode::Product(p) => Some(p),
            _ => None,
        }
    }

    /// Borrow the coproduct body, if this is a coproduct.
    pub fn as_coproduct(&self) -> Option<&CoproductSchema> {
        match self {
            SchemaNode::Coproduct(c) => Some(c),
            _ => None,
        }
    }
}

/// A single field of a product schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductField {
    /// Declared and encoded name
    pub name: FieldName,

    /// Field schema (optionality is recorded in `ProductSchema::required`)
    pub schema: SchemaNode,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductField {
    /// Create a new product field.
    pub fn new(name: FieldName, schema: SchemaNode) -> Self {
        Self {
            name,
            schema,
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Product schema definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductSchema {
    /// Identity of the record type
    pub info: ObjectInfo,

    /// Fields in declaration order
    pub fields: Vec<ProductField>,

    /// Encoded names of the fields that must be present
    pub required: Vec<String>,
}

impl ProductSchema {
    /// Create an empty product schema.
    pub fn new(info: ObjectInfo) -> Self {
        Self {
            info,
            fields: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Append a field, recording it as required unless `optional`.
    pub fn with_field(self, name: FieldName, schema: SchemaNode, optional: bool) -> Self {
        self.with_product_field(ProductField::new(name, schema), optional)
    }

    /// Append a prepared field, recording it as required unless `optional`.
    pub fn with_product_field(mut self, field: ProductField, optional: bool) -> Self {
        if !optional {
            self.required.push(field.name.encoded_name.clone());
        }
        self.fields.push(field);
        self
    }

    /// Look up a field by its encoded name.
    pub fn field(&self, encoded_name: &str) -> Option<&ProductField> {
        self.fields
            .iter()
            .find(|f| f.name.encoded_name == encoded_name)
    }

    /// Check if a field (by encoded name) is required.
    pub fn is_required(&self, encoded_name: &str) -> bool {
        self.required.iter().any(|r| r == encoded_name)
    }
}

/// Open product (map) schema definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpenProductSchema {
    /// Identity of the container type
    pub info: ObjectInfo,

    /// Schema shared by every value
    pub value: Box<SchemaNode>,
}

impl OpenProductSchema {
    /// Create a new open product schema.
    pub fn new(info: ObjectInfo, value: SchemaNode) -> Self {
        Self {
            info,
            value: Box::new(value),
        }
    }
}

/// Coproduct schema definition.
///
/// Variants form a set: two coproducts are equal when they hold the same
/// variant schemas regardless of declaration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoproductSchema {
    /// Identity of the sum type
    pub info: ObjectInfo,

    /// Variant schemas (products, or refs standing in for them)
    pub variants: BTreeSet<SchemaNode>,

    /// Name of the discriminator field, if a strategy is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
}

impl CoproductSchema {
    /// Create a coproduct schema without a discriminator.
    pub fn new(info: ObjectInfo, variants: impl IntoIterator<Item = SchemaNode>) -> Self {
        Self {
            info,
            variants: variants.into_iter().collect(),
            discriminator: None,
        }
    }

    /// Set the discriminator field name.
    pub fn with_discriminator(mut self, discriminator: Option<String>) -> Self {
        self.discriminator = discriminator;
        self
    }

    /// Find the variant product with the given identity.
    pub fn variant(&self, info: &ObjectInfo) -> Option<&SchemaNode> {
        self.variants.iter().find(|v| v.info() == Some(info))
    }
}

/// Result of a schema derivation.
///
/// Optionality is tracked here rather than inside the node: an optional type
/// has the same node as the type it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    /// The schema tree
    pub node: SchemaNode,

    /// Whether the described type may be absent
    #[serde(default)]
    pub is_optional: bool,
}

impl Schema {
    /// Create a required schema.
    pub fn new(node: SchemaNode) -> Self {
        Self {
            node,
            is_optional: false,
        }
    }

    /// Mark this schema as optional.
    pub fn into_optional(mut self) -> Self {
        self.is_optional = true;
        self
    }
}

impl From<SchemaNode> for Schema {
    fn from(node: SchemaNode) -> Self {
        Schema::new(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> ObjectInfo {
        ObjectInfo::new(name)
    }

    #[test]
    fn test_object_info_equality_includes_type_parameters() {
        let a = info("app::Page").with_type_parameters(["User"]);
        let b = info("app::Page").with_type_parameters(["Order"]);
        assert_ne!(a, b);
        assert_eq!(a, info("app::Page").with_type_parameters(["User"]));
    }

    #[test]
    fn test_object_info_short_name() {
        assert_eq!(info("app::model::User").short_name(), "User");
        assert_eq!(info("Map").short_name(), "Map");
    }

    #[test]
    fn test_object_info_display() {
        let generic = info("app::Page").with_type_parameters(["User", "i32"]);
        assert_eq!(generic.to_string(), "app::Page<User, i32>");
        assert_eq!(info("app::User").to_string(), "app::User");
    }

    #[test]
    fn test_product_required_tracks_optional_flag() {
        let product = ProductSchema::new(info("app::User"))
            .with_field(FieldName::new("name"), SchemaNode::String, false)
            .with_field(FieldName::new("nickname"), SchemaNode::String, true);

        assert_eq!(product.fields.len(), 2);
        assert_eq!(product.required, vec!["name".to_string()]);
        assert!(product.is_required("name"));
        assert!(!product.is_required("nickname"));
        assert!(product.field("nickname").is_some());
    }

    #[test]
    fn test_coproduct_variants_are_order_insensitive() {
        let a = SchemaNode::Product(ProductSchema::new(info("app::A")));
        let b = SchemaNode::Product(ProductSchema::new(info("app::B")));

        let left = CoproductSchema::new(info("app::E"), [a.clone(), b.clone()]);
        let right = CoproductSchema::new(info("app::E"), [b, a]);
        assert_eq!(left, right);
    }

    #[test]
    fn test_contains_ref() {
        let recursive = SchemaNode::Product(ProductSchema::new(info("app::F")).with_field(
            FieldName::new("children"),
            SchemaNode::array(SchemaNode::reference(info("app::F"))),
            false,
        ));
        assert!(recursive.contains_ref());
        assert!(!SchemaNode::array(SchemaNode::Integer).contains_ref());
    }

    #[test]
    fn test_field_description_is_serialized_only_when_set() {
        let plain = ProductField::new(FieldName::new("name"), SchemaNode::String);
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("description").is_none());

        let described = plain.with_description("Display name");
        let json = serde_json::to_value(&described).unwrap();
        assert_eq!(json["description"], "Display name");
    }

    #[test]
    fn test_schema_serializes_with_type_tag() {
        let node = SchemaNode::array(SchemaNode::Integer);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "Array", "value": { "type": "Integer" } })
        );
    }
}
