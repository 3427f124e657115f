mod decode_field;

use decode_field::decode_field;
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{ItemStruct, parse_macro_input};

/// Implements `Params` for a struct with named fields, turning it into a labeled record: every
/// field becomes the named parameter of the same name.
///
/// `#[param_name("other")]` binds a field under a different name, `#[param_skip]` leaves it out.
/// Fields are cloned into values, they must implement `Clone` and `AsValue`.
#[proc_macro_derive(Params, attributes(param_name, param_skip))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let fields = item
        .fields
        .iter()
        .map(decode_field)
        .filter(|v| !v.skip)
        .collect::<Vec<_>>();
    let mut names = HashSet::new();
    for field in &fields {
        if !names.insert(field.name.as_str()) {
            panic!(
                "Parameter `{}` is declared more than once in `{}`",
                field.name, name
            );
        }
    }
    let labeled = fields.iter().map(|field| {
        let ident = &field.ident;
        let label = &field.name;
        quote! {
            (
                ::std::borrow::Cow::Borrowed(#label),
                ::verbatim::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)),
            )
        }
    });
    quote! {
        impl #impl_generics ::verbatim::Params for #name #ty_generics #where_clause {
            fn labeled(&self) -> ::std::vec::Vec<(::std::borrow::Cow<'static, str>, ::verbatim::Value)> {
                ::std::vec![#(#labeled),*]
            }
        }
        impl #impl_generics ::verbatim::IntoParam for #name #ty_generics #where_clause {
            fn into_param(self) -> ::verbatim::Param {
                ::verbatim::Param::record(&self)
            }
        }
        impl #impl_generics ::verbatim::IntoParam for &#name #ty_generics #where_clause {
            fn into_param(self) -> ::verbatim::Param {
                ::verbatim::Param::record(self)
            }
        }
    }
    .into()
}
