use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::attributes::Options;

/// Input types are named after the Rust type unless `#[graphql(name = "..")]` says otherwise.
pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let options = Options::from_attributes(&input.attrs)?;
    let graphql_name = options.annotation_text()?.unwrap_or_else(|| input.ident.to_string());

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[allow(clippy::all, clippy::pedantic)]
        impl #impl_generics ::graphql_mold::__private::InputType for #name #ty_generics #where_clause {
            fn type_ref() -> ::graphql_mold::__private::TypeRef {
                ::graphql_mold::__private::TypeRef::named(#graphql_name)
            }
        }
    })
}
