mod decode_model;

use decode_model::{CastKind, ModelMetadata, decode_model};
use keel_core::Cast;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

fn cast_tokens(kind: &CastKind) -> TokenStream2 {
    match kind {
        CastKind::Tag(cast) => match cast {
            Cast::Array => quote!(::keel::Cast::Array),
            Cast::Json => quote!(::keel::Cast::Json),
            Cast::Bool => quote!(::keel::Cast::Bool),
            Cast::Int => quote!(::keel::Cast::Int),
            Cast::Float => quote!(::keel::Cast::Float),
            Cast::String => quote!(::keel::Cast::String),
            Cast::Datetime => quote!(::keel::Cast::Datetime),
            // Tags never parse to an enum cast
            Cast::Enum(..) => quote!(compile_error!("unexpected enum tag")),
        },
        CastKind::Enum(path) => quote!(::keel::Cast::Enum(::keel::EnumCast::of::<#path>())),
    }
}

fn model_impl(item: &ItemStruct, metadata: &ModelMetadata) -> TokenStream2 {
    let ident = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let name = &metadata.name;
    let alias = &metadata.alias;
    let primary_key = &metadata.primary_key;
    let casts = metadata.casts.iter().map(|(attribute, kind)| {
        let cast = cast_tokens(kind);
        quote!((#attribute, #cast))
    });
    let hooks = if metadata.hooks {
        TokenStream2::new()
    } else {
        quote! {
            impl #impl_generics ::keel::Hooks for #ident #ty_generics #where_clause {}
        }
    };
    quote! {
        impl #impl_generics ::keel::Model for #ident #ty_generics #where_clause {
            fn table() -> &'static ::keel::TableRef {
                static TABLE: ::keel::TableRef = ::keel::TableRef::aliased(#name, #alias);
                &TABLE
            }
            fn primary_key() -> &'static str {
                #primary_key
            }
            fn casts() -> &'static [(&'static str, ::keel::Cast)] {
                const CASTS: &[(&str, ::keel::Cast)] = &[#(#casts),*];
                CASTS
            }
        }
        #hooks
    }
}

/// Implements `Model` for a marker struct, and an empty `Hooks` unless `hooks` is given.
///
/// ```ignore
/// #[derive(Model)]
/// #[keel(name = "posts", alias = "p", cast(tags = array, status = Status))]
/// struct Post;
/// ```
#[proc_macro_derive(Model, attributes(keel))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    match decode_model(&item) {
        Ok(metadata) => model_impl(&item, &metadata).into(),
        Err(e) => e.to_compile_error().into(),
    }
}
