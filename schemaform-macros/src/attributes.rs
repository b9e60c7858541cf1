//! Attribute parsing using darling for `#[form(...)]` attributes.
//!
//! This module defines the attribute structures for containers (structs and
//! enums), their variants, and their fields.

use darling::ast::{Data, Fields};
use darling::{FromDeriveInput, FromField, FromVariant};
use syn::{Expr, Generics, Ident, Type};

/// Container-level attributes for structs and enums.
/// Parsed from `#[form(...)]` on the type definition.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(form), supports(struct_any, enum_any))]
pub struct ContainerAttrs {
    /// The identifier of the type
    pub ident: Ident,

    /// Generic parameters of the type
    pub generics: Generics,

    /// Variants or fields
    pub data: Data<VariantAttrs, FieldAttrs>,

    /// Discriminator field name for enums
    #[darling(default)]
    pub tag: Option<String>,
}

/// Variant-level data of an enum.
#[derive(Debug, FromVariant)]
#[darling(attributes(form))]
pub struct VariantAttrs {
    /// Variant identifier
    pub ident: Ident,

    /// Variant fields
    pub fields: Fields<FieldAttrs>,
}

/// Field-level attributes parsed from `#[form(...)]` on fields.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(form))]
pub struct FieldAttrs {
    /// Field identifier (None for tuple struct fields)
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Wire name of this field
    #[darling(default)]
    pub rename: Option<String>,

    /// Leave this field out of the description
    #[darling(default)]
    pub skip: bool,

    /// Field description
    #[darling(default)]
    pub description: Option<String>,

    /// Validation: minimum value for numbers
    #[darling(default)]
    pub min: Option<Expr>,

    /// Validation: maximum value for numbers
    #[darling(default)]
    pub max: Option<Expr>,

    /// Validation: minimum length for strings/lists
    #[darling(default)]
    pub min_length: Option<usize>,

    /// Validation: maximum length for strings/lists
    #[darling(default)]
    pub max_length: Option<usize>,
}

impl FieldAttrs {
    /// Declared name of a named field.
    pub fn name(&self) -> String {
        self.ident
            .as_ref()
            .map(|ident| ident.to_string())
            .unwrap_or_default()
    }

    /// Check if this field has any validation rules.
    pub fn has_validation(&self) -> bool {
        self.min.is_some()
            || self.max.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_container_tag() {
        let input: syn::DeriveInput = parse_quote! {
            #[form(tag = "kind")]
            enum Shape {
                Circle { radius: f64 },
                Empty,
            }
        };
        let attrs = ContainerAttrs::from_derive_input(&input).unwrap();
        assert_eq!(attrs.tag.as_deref(), Some("kind"));

        let Data::Enum(variants) = attrs.data else {
            panic!("expected enum");
        };
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].ident, "Circle");
        assert_eq!(variants[0].fields.fields[0].name(), "radius");
        assert!(variants[1].fields.fields.is_empty());
    }

    #[test]
    fn test_parse_field_attrs() {
        let input: syn::DeriveInput = parse_quote! {
            struct Signup {
                #[form(rename = "user", min_length = 3, max_length = 20)]
                user_name: String,
                #[form(min = 13, max = 130.5)]
                age: u8,
                #[form(skip)]
                session: String,
            }
        };
        let attrs = ContainerAttrs::from_derive_input(&input).unwrap();
        let Data::Struct(fields) = attrs.data else {
            panic!("expected struct");
        };

        let user = &fields.fields[0];
        assert_eq!(user.rename.as_deref(), Some("user"));
        assert_eq!(user.min_length, Some(3));
        assert_eq!(user.max_length, Some(20));
        assert!(user.has_validation());

        let age = &fields.fields[1];
        assert!(age.min.is_some());
        assert!(age.max.is_some());

        let session = &fields.fields[2];
        assert!(session.skip);
        assert!(!session.has_validation());
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let input: syn::DeriveInput = parse_quote! {
            struct S {
                #[form(bogus)]
                a: i32,
            }
        };
        assert!(ContainerAttrs::from_derive_input(&input).is_err());
    }
}
