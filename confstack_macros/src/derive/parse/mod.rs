//! Attribute and field parsing for `#[derive(Configure)]`.

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::parenthesized;
use syn::{Attribute, Data, DeriveInput, Fields, Token, Type};

mod literals;
mod serde_attrs;

use literals::{default_literal, lit_str};
use serde_attrs::{SerdeFieldFlags, SerdeRenameAll, serde_field_flags, serde_rename_all};

/// Container-level `#[config(...)]` settings.
#[derive(Default, Clone)]
pub(crate) struct StructAttrs {
    pub prefix: Option<String>,
    pub crate_path: Option<syn::Path>,
}

/// Field-level `#[config(...)]` settings.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldAttrs {
    pub default: Option<String>,
    pub required: bool,
    pub env: Option<String>,
    pub skip: bool,
}

/// A field that takes part in loading.
#[derive(Clone)]
pub(crate) struct ParsedField {
    /// Key serde reads the field from.
    pub key: String,
    pub ty: Type,
    pub attrs: FieldAttrs,
    /// `#[serde(flatten)]`: children are promoted to the parent level.
    pub anonymous: bool,
}

pub(crate) struct ParsedInput {
    pub struct_attrs: StructAttrs,
    pub fields: Vec<ParsedField>,
}

/// Collect the container settings and every loaded field of `input`.
///
/// Skipped fields are dropped here; enums, unions and tuple structs are
/// rejected.
pub(crate) fn parse_input(input: &DeriveInput) -> syn::Result<ParsedInput> {
    let struct_attrs = parse_struct_attrs(&input.attrs)?;
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unnamed(_) | Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    data.struct_token,
                    "Configure requires named fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Configure can only be derived for structs",
            ));
        }
    };

    let rename_all = serde_rename_all(&input.attrs)?;
    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        if let Some(parsed) = parse_field(field, rename_all)? {
            fields.push(parsed);
        }
    }
    Ok(ParsedInput {
        struct_attrs,
        fields,
    })
}

fn parse_field(
    field: &syn::Field,
    rename_all: Option<SerdeRenameAll>,
) -> syn::Result<Option<ParsedField>> {
    let attrs = parse_field_attrs(&field.attrs)?;
    let SerdeFieldFlags {
        rename,
        flatten,
        skip,
    } = serde_field_flags(&field.attrs)?;
    if attrs.skip || skip {
        return Ok(None);
    }
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "unnamed fields are not supported"));
    };
    let key = rename.unwrap_or_else(|| {
        let name = ident.unraw().to_string();
        rename_all.map(|rule| rule.apply(&name)).unwrap_or(name)
    });
    Ok(Some(ParsedField {
        key,
        ty: field.ty.clone(),
        attrs,
        anonymous: flatten,
    }))
}

/// Visit every `#[config(...)]` entry in `attrs`.
fn parse_config<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("config")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

/// Consumes an unrecognised key-value or list without recording it.
fn discard_unknown(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        // One expression only; the rest of the list belongs to other keys.
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

fn unknown_key(meta: &ParseNestedMeta, expected: &str) -> syn::Error {
    let key = meta
        .path
        .get_ident()
        .map_or_else(|| "attribute".to_owned(), ToString::to_string);
    meta.error(format!("unknown config key `{key}`; expected {expected}"))
}

pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_config(attrs, |meta| {
        if meta.path.is_ident("prefix") {
            out.prefix = Some(lit_str(meta, "prefix")?.value());
        } else if meta.path.is_ident("crate") {
            out.crate_path = Some(lit_str(meta, "crate")?.parse()?);
        } else {
            return Err(unknown_key(meta, "`prefix` or `crate`"));
        }
        Ok(())
    })?;
    Ok(out)
}

/// Parses field-level `#[config(...)]` attributes.
///
/// `skip` cannot be combined with any other key; `env` must name a variable.
pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_config(attrs, |meta| {
        if meta.path.is_ident("default") {
            out.default = Some(default_literal(&meta.value()?.parse()?)?);
        } else if meta.path.is_ident("required") {
            out.required = true;
        } else if meta.path.is_ident("env") {
            let name = lit_str(meta, "env")?;
            if name.value().is_empty() {
                return Err(syn::Error::new(name.span(), "env must not be empty"));
            }
            out.env = Some(name.value());
        } else if meta.path.is_ident("skip") {
            out.skip = true;
        } else {
            return Err(unknown_key(meta, "`default`, `required`, `env` or `skip`"));
        }
        Ok(())
    })?;
    if out.skip && (out.default.is_some() || out.required || out.env.is_some()) {
        let span = attrs
            .iter()
            .find(|attr| attr.path().is_ident("config"))
            .map_or_else(proc_macro2::Span::call_site, |attr| {
                syn::spanned::Spanned::span(attr)
            });
        return Err(syn::Error::new(
            span,
            "`skip` cannot be combined with other config keys",
        ));
    }
    Ok(out)
}
