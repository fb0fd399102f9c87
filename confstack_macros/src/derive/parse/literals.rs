//! Literal parsing helpers for `#[config(...)]` attributes.

use syn::meta::ParseNestedMeta;
use syn::{Expr, ExprLit, ExprUnary, Lit, LitStr, UnOp};

/// Parses a string literal value for `key`.
pub(crate) fn lit_str(meta: &ParseNestedMeta, key: &str) -> syn::Result<LitStr> {
    match meta.value()?.parse::<Lit>()? {
        Lit::Str(value) => Ok(value),
        other => Err(syn::Error::new(other.span(), format!("{key} must be a string"))),
    }
}

/// Text of a `default = ...` literal as the runtime converter reads it.
///
/// Strings give their contents; numbers keep their base-10 digits without
/// suffix; a leading minus is kept.
pub(crate) fn default_literal(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => literal_text(lit),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: lit @ (Lit::Int(_) | Lit::Float(_)),
                ..
            }) => Ok(format!("-{}", literal_text(lit)?)),
            other => Err(not_a_literal(other)),
        },
        other => Err(not_a_literal(other)),
    }
}

fn literal_text(lit: &Lit) -> syn::Result<String> {
    match lit {
        Lit::Str(value) => Ok(value.value()),
        Lit::Int(value) => Ok(value.base10_digits().to_owned()),
        Lit::Float(value) => Ok(value.base10_digits().to_owned()),
        Lit::Bool(value) => Ok(value.value.to_string()),
        Lit::Char(value) => Ok(value.value().to_string()),
        other => Err(syn::Error::new(
            other.span(),
            "default must be a string, number, boolean or char literal",
        )),
    }
}

fn not_a_literal(expr: &Expr) -> syn::Error {
    syn::Error::new_spanned(expr, "default must be a literal")
}
