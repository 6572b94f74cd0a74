//! Derive macros for `tree-redact`.
//!
//! This crate generates the `TemplateShape` implementation behind
//! `#[derive(Template)]`. It:
//! - reads `#[template(...)]` container and field attributes
//! - emits a `Template` builder chain with one rule per field
//! - checks reference targets while expanding, so a dangling reference is a
//!   compile error rather than a configuration error
//!
//! It does **not** redact anything. Templates are applied at runtime by the
//! `tree-redact` walker.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_struct;
mod generics;
mod rule;
use container::{parse_container_options, ContainerOptions};
use derive_struct::derive_struct;
use generics::add_shape_bounds;

/// Derives `tree_redact::TemplateShape` for structs with named fields.
///
/// The generated template has one key per field, in declaration order.
///
/// # Container Attributes
///
/// - `#[template(default = "level")]` - Rule for fields without their own
///   attribute. One of `ignore`, `pass`, `shallow`, `deep`, `full`. Defaults
///   to `pass`.
///
/// # Field Attributes
///
/// - **No annotation**: the container default.
/// - `#[template(ignore)]`, `#[template(pass)]`, `#[template(shallow)]`,
///   `#[template(deep)]`, `#[template(full)]`: a fixed match level.
/// - `#[template(nested)]`: the field's own type must implement
///   `TemplateShape`; its template is embedded as a nested rule.
///   `Option<T>` and `Box<T>` forward to `T`.
/// - `#[template(reference = "other")]`: redact this field when the value of
///   field `other` is a secret key name. `other` must be a key of the same
///   struct.
/// - `#[template(rename = "key")]`: use `key` instead of the field name.
/// - `#[template(skip)]`: leave the field out of the template.
///
/// Enums, unions, tuple structs and unit structs are rejected at compile
/// time.
#[proc_macro_derive(Template, attributes(template))]
pub fn derive_template(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the tree-redact crate root.
///
/// Handles crate renaming (e.g., `redact = { package = "tree-redact", ... }`)
/// and internal usage (when the derive is used inside tree-redact itself).
fn crate_root() -> TokenStream {
    match crate_name("tree-redact") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::tree_redact },
    }
}

fn crate_path(item: &str) -> TokenStream {
    let root = crate_root();
    let item_ident = format_ident!("{}", item);
    quote! { #root::#item_ident }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions { default } = parse_container_options(&attrs)?;

    let output = match data {
        Data::Struct(data) => derive_struct(&ident, data, &generics, default)?,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "`Template` cannot be derived for enums; a template describes one object shape",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`Template` cannot be derived for unions",
            ));
        }
    };

    let shape_generics = add_shape_bounds(generics, &output.used_generics);
    let (impl_generics, ty_generics, where_clause) = shape_generics.split_for_impl();
    let shape_path = crate_path("TemplateShape");
    let template_path = crate_path("Template");
    let template_body = &output.template_body;

    Ok(quote! {
        impl #impl_generics #shape_path for #ident #ty_generics #where_clause {
            fn template() -> #template_path {
                #template_body
            }
        }
    })
}
