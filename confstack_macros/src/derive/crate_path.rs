//! Runtime crate path used by generated code.
//!
//! `#[config(crate = "...")]` lets callers that rename the `confstack`
//! dependency point the generated impls at their alias.

use proc_macro2::TokenStream;
use quote::quote;

/// Tokens naming the runtime crate, `::confstack` unless overridden.
pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> TokenStream {
    crate_path.map_or_else(|| quote! { ::confstack }, |path| quote! { #path })
}
