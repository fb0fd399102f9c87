//! Serde attribute parsing helpers.
//!
//! Field keys must match what serde reads, since the merged record is
//! deserialised into the target. The helpers therefore honour
//! `#[serde(rename = "...")]`, `#[serde(rename_all = "...")]` and the
//! `deserialize` halves of their split forms, and report `flatten` and
//! deserialisation skips.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Token};

use super::discard_unknown;

/// Supported `#[serde(rename_all = "...")]` rules for struct fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SerdeRenameAll {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl SerdeRenameAll {
    fn parse(value: &LitStr) -> syn::Result<Self> {
        match value.value().as_str() {
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "kebab-case" => Ok(Self::Kebab),
            "SCREAMING-KEBAB-CASE" => Ok(Self::ScreamingKebab),
            other => Err(syn::Error::new(
                value.span(),
                format!("unsupported serde rename_all value '{other}'"),
            )),
        }
    }

    pub(crate) fn apply(self, field_name: &str) -> String {
        match self {
            Self::Lower => field_name.to_ascii_lowercase(),
            Self::Upper => field_name.to_ascii_uppercase(),
            Self::Pascal => field_name.to_upper_camel_case(),
            Self::Camel => field_name.to_lower_camel_case(),
            Self::Snake => field_name.to_snake_case(),
            Self::ScreamingSnake => field_name.to_shouty_snake_case(),
            Self::Kebab => field_name.to_kebab_case(),
            Self::ScreamingKebab => field_name.to_shouty_kebab_case(),
        }
    }
}

/// Serde settings of one field that affect loading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SerdeFieldFlags {
    pub rename: Option<String>,
    pub flatten: bool,
    pub skip: bool,
}

fn serde_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("serde"))
}

/// Read `rename = "x"` or `rename(deserialize = "x")`.
fn deserialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse::<LitStr>()?.value()));
    }
    if !meta.input.peek(syn::token::Paren) {
        return Ok(None);
    }
    let mut out = None;
    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("deserialize") {
            out = Some(nested.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else {
            discard_unknown(&nested)
        }
    })?;
    Ok(out)
}

/// Parse `#[serde(rename_all = "...")]` from struct attributes.
pub(crate) fn serde_rename_all(attrs: &[Attribute]) -> syn::Result<Option<SerdeRenameAll>> {
    let mut out = None;
    for attr in serde_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(rule) = rename_all_rule(&meta)? {
                    out = Some(rule);
                }
            } else {
                discard_unknown(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(out)
}

fn rename_all_rule(meta: &ParseNestedMeta) -> syn::Result<Option<SerdeRenameAll>> {
    if meta.input.peek(Token![=]) {
        return SerdeRenameAll::parse(&meta.value()?.parse::<LitStr>()?).map(Some);
    }
    let mut out = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| {
            if nested.path.is_ident("deserialize") {
                out = Some(SerdeRenameAll::parse(&nested.value()?.parse::<LitStr>()?)?);
                Ok(())
            } else {
                discard_unknown(&nested)
            }
        })?;
    }
    Ok(out)
}

/// Parse the serde settings of a field.
pub(crate) fn serde_field_flags(attrs: &[Attribute]) -> syn::Result<SerdeFieldFlags> {
    let mut out = SerdeFieldFlags::default();
    for attr in serde_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(name) = deserialize_name(&meta)? {
                    out.rename = Some(name);
                }
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                out.skip = true;
            } else {
                discard_unknown(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(out)
}
