use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Generics, Type};

use crate::attributes::Options;

struct Member<'a> {
    ident: &'a syn::Ident,
    ty: &'a Type,
    options: Options,
}

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let options = Options::from_attributes(&input.attrs)?;
    if options.scalar {
        return Ok(expand_scalar(&input));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new(
                    data.fields.span(),
                    "Selectable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Selectable can only be derived for structs; mark leaf types with #[graphql(scalar)]",
            ))
        }
    };

    let mut members = Vec::new();
    for field in fields {
        let options = Options::from_attributes(&field.attrs)?;
        if options.excluded()? {
            continue;
        }
        if options.scalar && options.flatten {
            return Err(syn::Error::new(field.span(), "a flattened member cannot be a scalar"));
        }
        if let Some(ident) = &field.ident {
            members.push(Member { ident, ty: &field.ty, options });
        }
    }

    let mut annotations = Vec::new();
    for member in &members {
        let ident = member.ident.to_string();
        let tag = match member.options.annotation_text()? {
            Some(text) => quote!(::std::option::Option::Some(#text)),
            None => quote!(::std::option::Option::None),
        };
        let scalar = member.options.scalar;
        let flatten = member.options.flatten;
        annotations.push(quote! {
            ::graphql_mold::__private::Annotation::for_member(#ident, #tag, #scalar, #flatten)
        });
    }

    let selections = members.iter().enumerate().map(|(index, member)| {
        let ident = member.ident;
        let ty = member.ty;
        if member.options.scalar {
            quote! {
                ::graphql_mold::__private::select_opaque(&annotations[#index], &mut fields);
            }
        } else {
            quote! {
                ::graphql_mold::__private::select_member::<#ty>(
                    &annotations[#index],
                    value.map(|value| &value.#ident),
                    &mut fields,
                );
            }
        }
    });

    let decoders = members.iter().enumerate().map(|(index, member)| {
        let ident = member.ident;
        let decode = if member.options.scalar {
            quote!(decode_opaque)
        } else {
            quote!(decode_member)
        };
        quote! {
            ::graphql_mold::__private::#decode(&annotations[#index], &mut self.#ident, value, cx);
        }
    });

    let shapes = members.iter().filter(|member| !member.options.scalar).map(|member| {
        let ident = member.ident;
        quote! {
            ::graphql_mold::__private::Selectable::copy_shape(&self.#ident, &mut fresh.#ident);
        }
    });

    let name = &input.ident;
    let generics = with_member_bounds(&input.generics, &members);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let count = members.len();

    Ok(quote! {
        #[allow(clippy::all, clippy::pedantic)]
        const _: () = {
            fn annotations() -> &'static [::graphql_mold::__private::Annotation] {
                static ANNOTATIONS: ::graphql_mold::__private::OnceLock<
                    ::std::vec::Vec<::graphql_mold::__private::Annotation>,
                > = ::graphql_mold::__private::OnceLock::new();
                ANNOTATIONS.get_or_init(|| ::std::vec![#(#annotations),*])
            }

            impl #impl_generics ::graphql_mold::__private::Selectable for #name #ty_generics #where_clause {
                #[allow(unused_variables, unused_mut)]
                fn selections(
                    value: ::std::option::Option<&Self>,
                ) -> ::std::vec::Vec<::graphql_mold::__private::Field> {
                    let annotations = annotations();
                    let mut fields = ::std::vec::Vec::with_capacity(#count);
                    #(#selections)*
                    fields
                }

                #[allow(unused_variables)]
                fn decode(
                    &mut self,
                    value: &::graphql_mold::__private::Value,
                    cx: &mut ::graphql_mold::__private::DecodeContext,
                ) {
                    if !cx.expect_object(value) {
                        return;
                    }
                    let annotations = annotations();
                    #(#decoders)*
                }

                #[allow(unused_variables)]
                fn copy_shape(&self, fresh: &mut Self) {
                    #(#shapes)*
                }
            }
        };
    })
}

/// A leaf type decoded through its serde implementation.
fn expand_scalar(input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #[allow(clippy::all, clippy::pedantic)]
        impl #impl_generics ::graphql_mold::__private::Selectable for #name #ty_generics #where_clause {
            fn selections(
                _: ::std::option::Option<&Self>,
            ) -> ::std::vec::Vec<::graphql_mold::__private::Field> {
                ::std::vec::Vec::new()
            }

            fn decode(
                &mut self,
                value: &::graphql_mold::__private::Value,
                cx: &mut ::graphql_mold::__private::DecodeContext,
            ) {
                ::graphql_mold::__private::decode_scalar(self, value, cx)
            }
        }
    }
}

/// Generic structs get a bound per member type, so `Page<T>` is selectable whenever `T` is.
fn with_member_bounds(generics: &Generics, members: &[Member]) -> Generics {
    let mut generics = generics.clone();
    if generics.type_params().next().is_none() {
        return generics;
    }
    let where_clause = generics.make_where_clause();
    for member in members {
        let ty = member.ty;
        if member.options.scalar {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::graphql_mold::__private::DeserializeOwned));
        } else {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::graphql_mold::__private::Selectable));
        }
    }
    generics
}
