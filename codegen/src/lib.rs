//! Derive macros for `graphql-mold`. Use them through the `graphql_mold` re-exports.

use proc_macro::TokenStream;
use syn::DeriveInput;

mod attributes;
mod input_type;
mod selectable;

/// Describes a struct as a GraphQL selection set and decodes response objects into it.
///
/// Field attributes:
///
/// - `#[graphql("name(arguments)")]` or `#[graphql(name = "...")]`: the rendered field text,
///   including aliases (`first: user(login: "a")`) and inline fragments (`... on User`).
/// - `#[graphql("-")]` or `#[graphql(skip)]`: left out of the document and of decoding.
/// - `#[graphql(scalar)]`: selected as a leaf and decoded through serde.
/// - `#[graphql(flatten)]`: the member's fields are selected and decoded as if they were
///   declared on the enclosing struct.
///
/// `#[graphql(scalar)]` on the type itself makes a serde type a custom leaf scalar.
#[proc_macro_derive(Selectable, attributes(graphql))]
pub fn derive_selectable(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);
    expand(selectable::expand(ast))
}

/// Names the GraphQL input type of an enum, scalar or input object used as a variable.
#[proc_macro_derive(InputType, attributes(graphql))]
pub fn derive_input_type(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);
    expand(input_type::expand(ast))
}

fn expand(result: syn::Result<proc_macro2::TokenStream>) -> TokenStream {
    result.unwrap_or_else(syn::Error::into_compile_error).into()
}
