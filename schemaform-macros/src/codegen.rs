//! Impl block generation for the Describe trait.
//!
//! Named structs become products, single-field tuple structs become value
//! classes, and enums become coproducts with one product per variant.

use darling::ast::{Data, Style};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{GenericParam, Generics, Ident, parse_quote};

use crate::attributes::{ContainerAttrs, FieldAttrs, VariantAttrs};
use crate::error::{DeriveError, DeriveErrorKind};

/// Generates `impl Describe for Type` from parsed container attributes.
pub struct ImplGenerator<'a> {
    attrs: &'a ContainerAttrs,
}

impl<'a> ImplGenerator<'a> {
    pub fn new(attrs: &'a ContainerAttrs) -> Self {
        Self { attrs }
    }

    /// Generate the complete impl block.
    pub fn generate(&self) -> Result<TokenStream, DeriveError> {
        let generics = self.generics()?;
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let ident = &self.attrs.ident;

        let body = match &self.attrs.data {
            Data::Struct(fields) => match fields.style {
                Style::Struct => self.product(&fields.fields),
                Style::Unit => self.product(&[]),
                Style::Tuple => match fields.fields.as_slice() {
                    [] => self.product(&[]),
                    [inner] => self.wrapper(inner)?,
                    _ => {
                        return Err(DeriveError::new(DeriveErrorKind::TupleStruct, ident.span()));
                    }
                },
            },
            Data::Enum(variants) => self.coproduct(variants)?,
        };

        Ok(quote! {
            impl #impl_generics ::schemaform::Describe for #ident #ty_generics #where_clause {
                #body
            }
        })
    }

    /// Copy of the type's generics with a `Describe` bound on every type parameter.
    fn generics(&self) -> Result<Generics, DeriveError> {
        let mut generics = self.attrs.generics.clone();
        if let Some(lifetime) = generics.lifetimes().next() {
            return Err(DeriveError::new(DeriveErrorKind::Lifetime, lifetime.span()));
        }

        let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
        let where_clause = generics.make_where_clause();
        for param in params {
            where_clause
                .predicates
                .push(parse_quote! { #param: ::schemaform::Describe });
        }
        Ok(generics)
    }

    /// Fully qualified name of the type, optionally extended by a variant name.
    fn type_name(&self, variant: Option<&Ident>) -> TokenStream {
        let name = self.attrs.ident.to_string();
        match variant {
            Some(variant) => {
                let variant = variant.to_string();
                quote! { ::core::concat!(::core::module_path!(), "::", #name, "::", #variant) }
            }
            None => quote! { ::core::concat!(::core::module_path!(), "::", #name) },
        }
    }

    /// `ObjectInfo` expression naming the type or one of its variants.
    fn object_info(&self, variant: Option<&Ident>) -> TokenStream {
        let type_name = self.type_name(variant);
        quote! { ::schemaform::ObjectInfo::new(#type_name) }
    }

    /// `.with_type_arguments(..)` call recording the actual type arguments,
    /// empty for non-generic types.
    fn type_arguments(&self) -> Option<TokenStream> {
        let params: Vec<&Ident> = self
            .attrs
            .generics
            .params
            .iter()
            .filter_map(|p| match p {
                GenericParam::Type(t) => Some(&t.ident),
                _ => None,
            })
            .collect();

        if params.is_empty() {
            return None;
        }
        Some(quote! {
            .with_type_arguments([
                #( <#params as ::schemaform::Describe>::descriptor() ),*
            ])
        })
    }

    fn product(&self, fields: &[FieldAttrs]) -> TokenStream {
        let info = self.object_info(None);
        let arguments = self.type_arguments();
        let type_name = self.type_name(None);
        let descriptors = field_descriptors(fields);
        let record = record_from_fields(fields, |name| quote! { &self.#name });
        let construct = construct_fields(fields);

        quote! {
            fn descriptor() -> ::schemaform::TypeDescriptor {
                ::schemaform::TypeDescriptor::product(#info, || ::std::vec![#(#descriptors),*])
                    #arguments
            }

            fn to_value(&self) -> ::schemaform::Value {
                #record
            }

            fn from_value(
                value: ::schemaform::Value,
            ) -> ::core::result::Result<Self, ::schemaform::ValueError> {
                #[allow(unused_mut, unused_variables)]
                let mut __record = value.into_record(#type_name)?;
                ::core::result::Result::Ok(Self { #(#construct),* })
            }
        }
    }

    fn wrapper(&self, inner: &FieldAttrs) -> Result<TokenStream, DeriveError> {
        if inner.skip {
            return Err(DeriveError::new(
                DeriveErrorKind::SkippedWrapperField,
                inner.ty.span(),
            ));
        }
        if inner.has_validation() {
            return Err(DeriveError::new(
                DeriveErrorKind::WrapperValidators,
                inner.ty.span(),
            ));
        }

        let info = self.object_info(None);
        let arguments = self.type_arguments();
        let ty = &inner.ty;

        Ok(quote! {
            fn descriptor() -> ::schemaform::TypeDescriptor {
                ::schemaform::TypeDescriptor::wrapper(#info, || {
                    <#ty as ::schemaform::Describe>::descriptor()
                })
                #arguments
            }

            fn to_value(&self) -> ::schemaform::Value {
                ::schemaform::Describe::to_value(&self.0)
            }

            fn from_value(
                value: ::schemaform::Value,
            ) -> ::core::result::Result<Self, ::schemaform::ValueError> {
                ::core::result::Result::Ok(Self(
                    <#ty as ::schemaform::Describe>::from_value(value)?,
                ))
            }
        })
    }

    fn coproduct(&self, variants: &[VariantAttrs]) -> Result<TokenStream, DeriveError> {
        for variant in variants {
            if matches!(variant.fields.style, Style::Tuple) {
                return Err(DeriveError::new(
                    DeriveErrorKind::TupleVariant(variant.ident.to_string()),
                    variant.ident.span(),
                ));
            }
        }

        let info = self.object_info(None);
        let arguments = self.type_arguments();
        let type_name = self.type_name(None);
        let discriminator = self
            .attrs
            .tag
            .as_ref()
            .map(|tag| quote! { .with_discriminator(#tag) });

        let variant_descriptors = variants.iter().map(|variant| {
            let info = self.object_info(Some(&variant.ident));
            let fields = field_descriptors(&variant.fields.fields);
            quote! {
                ::schemaform::TypeDescriptor::product(#info, || ::std::vec![#(#fields),*])
                    #arguments
            }
        });

        let to_value_arms = variants.iter().map(|variant| {
            let ident = &variant.ident;
            let name = ident.to_string();
            let record = record_from_fields(&variant.fields.fields, |field| {
                let binding = binding(field);
                quote! { #binding }
            });
            let pattern = if matches!(variant.fields.style, Style::Unit) {
                quote! { Self::#ident }
            } else {
                let bindings = variant
                    .fields
                    .fields
                    .iter()
                    .filter(|f| !f.skip)
                    .filter_map(|f| f.ident.as_ref())
                    .map(|field| {
                        let binding = binding(field);
                        quote! { #field: #binding }
                    });
                quote! { Self::#ident { #(#bindings,)* .. } }
            };
            quote! {
                #pattern => ::schemaform::Value::Variant {
                    name: ::std::string::String::from(#name),
                    value: ::std::boxed::Box::new(#record),
                }
            }
        });

        let from_value_arms = variants.iter().map(|variant| {
            let ident = &variant.ident;
            let name = ident.to_string();
            let variant_type_name = self.type_name(Some(ident));
            let construct = construct_fields(&variant.fields.fields);
            let built = if matches!(variant.fields.style, Style::Unit) {
                quote! { Self::#ident }
            } else {
                quote! { Self::#ident { #(#construct),* } }
            };
            quote! {
                #name => {
                    #[allow(unused_mut, unused_variables)]
                    let mut __record = __payload.into_record(#variant_type_name)?;
                    ::core::result::Result::Ok(#built)
                }
            }
        });

        let to_value_body = if variants.is_empty() {
            quote! { match *self {} }
        } else {
            quote! { match self { #(#to_value_arms),* } }
        };

        Ok(quote! {
            fn descriptor() -> ::schemaform::TypeDescriptor {
                ::schemaform::TypeDescriptor::coproduct(#info, || {
                    ::std::vec![#(#variant_descriptors),*]
                })
                #arguments
                #discriminator
            }

            fn to_value(&self) -> ::schemaform::Value {
                #to_value_body
            }

            fn from_value(
                value: ::schemaform::Value,
            ) -> ::core::result::Result<Self, ::schemaform::ValueError> {
                #[allow(unused_variables)]
                let (__name, __payload) = value.into_variant(#type_name)?;
                match __name.as_str() {
                    #(#from_value_arms,)*
                    _ => ::core::result::Result::Err(
                        ::schemaform::ValueError::unknown_variant(#type_name, __name.as_str()),
                    ),
                }
            }
        })
    }
}

/// Local binding of a variant field in generated match arms.
fn binding(field: &Ident) -> Ident {
    quote::format_ident!("__field_{}", field)
}

/// `FieldDescriptor` expressions for the fields that are not skipped.
fn field_descriptors(fields: &[FieldAttrs]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter(|f| !f.skip)
        .map(|field| {
            let name = field.name();
            let ty = &field.ty;

            let rename = field
                .rename
                .as_ref()
                .map(|rename| quote! { .with_rename(#rename) });
            let description = field
                .description
                .as_ref()
                .map(|description| quote! { .with_description(#description) });

            let mut validators = Vec::new();
            if let Some(min) = &field.min {
                validators.push(quote! { ::schemaform::Validator::min((#min) as f64) });
            }
            if let Some(max) = &field.max {
                validators.push(quote! { ::schemaform::Validator::max((#max) as f64) });
            }
            if let Some(min_length) = field.min_length {
                validators.push(quote! { ::schemaform::Validator::min_length(#min_length) });
            }
            if let Some(max_length) = field.max_length {
                validators.push(quote! { ::schemaform::Validator::max_length(#max_length) });
            }

            quote! {
                ::schemaform::FieldDescriptor::new(
                    #name,
                    <#ty as ::schemaform::Describe>::descriptor(),
                )
                #rename
                #description
                #(.with_validator(#validators))*
            }
        })
        .collect()
}

/// Expression building a `Value::Record` from the fields that are not skipped.
fn record_from_fields(
    fields: &[FieldAttrs],
    access: impl Fn(&Ident) -> TokenStream,
) -> TokenStream {
    let inserts = fields
        .iter()
        .filter(|f| !f.skip)
        .filter_map(|f| f.ident.as_ref())
        .map(|ident| {
            let name = ident.to_string();
            let value = access(ident);
            quote! {
                __record.insert(
                    ::std::string::String::from(#name),
                    ::schemaform::Describe::to_value(#value),
                );
            }
        });

    quote! {{
        #[allow(unused_mut)]
        let mut __record = ::schemaform::Record::default();
        #(#inserts)*
        ::schemaform::Value::Record(__record)
    }}
}

/// `field: expr` initializers reading from a local `__record`.
fn construct_fields(fields: &[FieldAttrs]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            let ty = &field.ty;
            let name = ident.to_string();
            Some(if field.skip {
                quote! { #ident: ::core::default::Default::default() }
            } else {
                quote! {
                    #ident: <#ty as ::schemaform::Describe>::from_value(
                        ::schemaform::value::take_field(&mut __record, #name),
                    )?
                }
            })
        })
        .collect()
}
