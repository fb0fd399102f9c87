//! Code generation for `#[derive(Configure)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use super::crate_path;
use super::parse::{ParsedField, ParsedInput};

/// Generate the `Configure` and `ConfigValue` impls for `input`.
///
/// `describe` declares one field per loaded struct field, in declaration
/// order; `ConfigValue` exposes the struct as a nested struct type so it can
/// be used as a field of other records.
pub(crate) fn configure_impl(input: &DeriveInput, parsed: &ParsedInput) -> TokenStream {
    let krate = crate_path::resolve(parsed.struct_attrs.crate_path.as_ref());
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let declarations = parsed
        .fields
        .iter()
        .map(|field| field_declaration(&krate, field));
    let fields_param = if parsed.fields.is_empty() {
        quote! { _fields }
    } else {
        quote! { fields }
    };
    let env_prefix = parsed.struct_attrs.prefix.as_ref().map(|prefix| {
        quote! {
            fn env_prefix() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#prefix)
            }
        }
    });

    quote! {
        impl #impl_generics #krate::Configure for #ident #ty_generics #where_clause {
            fn describe(#fields_param: &mut #krate::FieldSet) {
                #( #declarations )*
            }

            #env_prefix
        }

        impl #impl_generics #krate::ConfigValue for #ident #ty_generics #where_clause {
            fn value_type() -> #krate::ValueType {
                #krate::ValueType::Struct(<Self as #krate::Configure>::describe)
            }
        }
    }
}

fn field_declaration(krate: &TokenStream, field: &ParsedField) -> TokenStream {
    let ty = &field.ty;
    let key = &field.key;
    let mut options = quote! { #krate::FieldOptions::new() };
    if let Some(default) = &field.attrs.default {
        options = quote! { #options.with_default(#default) };
    }
    if field.attrs.required {
        options = quote! { #options.required() };
    }
    if let Some(env) = &field.attrs.env {
        options = quote! { #options.env(#env) };
    }
    if field.anonymous {
        options = quote! { #options.anonymous() };
    }
    quote! {
        fields.field::<#ty>(#key, #options);
    }
}
