use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // Get the type name we are annotating along with any generics it carries
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // Use ::orbit_engine::ecs::Component which works both inside and outside the crate.
    // Inside the crate, this works because of `extern crate self as orbit_engine;` in lib.rs
    // Outside the crate, this naturally resolves to the orbit_engine dependency.
    //
    // The lifecycle hooks keep their default (empty) bodies. Implement the trait by hand to
    // hook attach/detach.
    TokenStream::from(quote! {
        impl #impl_generics ::orbit_engine::ecs::Component for #name #ty_generics #where_clause {
        }
    })
}
