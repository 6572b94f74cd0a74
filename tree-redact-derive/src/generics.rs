//! Generic type parameter handling and trait bound management.
//!
//! Only generics that appear in `#[template(nested)]` fields get a
//! `TemplateShape` bound; every other field contributes nothing but its name.
//!
//! `PhantomData<T>` is skipped when collecting generics, so a marker field
//! never forces `T: TemplateShape`.

use syn::{parse_quote, Ident};

use crate::crate_path;

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    if let syn::Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "PhantomData" {
                return;
            }

            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner_ty) = arg {
                        collect_generics_from_type(inner_ty, generics, result);
                    }
                }
            }

            for param in generics.type_params() {
                if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                    result.push(param.ident.clone());
                }
            }
        }
    }
}

/// Adds `TemplateShape` bounds to generic parameters used in nested fields.
pub(crate) fn add_shape_bounds(mut generics: syn::Generics, used_generics: &[Ident]) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            let shape_path = crate_path("TemplateShape");
            param.bounds.push(parse_quote!(#shape_path));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use syn::{parse_quote, Generics, Type};

    use super::*;

    #[test]
    fn finds_generic_inside_wrappers() {
        let generics: Generics = parse_quote!(<T, U>);
        let ty: Type = parse_quote!(Option<Box<T>>);
        let mut used = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut used);
        assert_eq!(used, vec![Ident::new("T", proc_macro2::Span::call_site())]);
    }

    #[test]
    fn phantom_data_is_skipped() {
        let generics: Generics = parse_quote!(<T>);
        let ty: Type = parse_quote!(::core::marker::PhantomData<T>);
        let mut used = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut used);
        assert!(used.is_empty());
    }

    #[test]
    fn bounds_only_added_to_used_params() {
        let generics: Generics = parse_quote!(<T, U>);
        let bounded = add_shape_bounds(generics, &[Ident::new("U", proc_macro2::Span::call_site())]);
        let params: Vec<_> = bounded.type_params().collect();
        assert!(params[0].bounds.is_empty());
        assert_eq!(params[1].bounds.len(), 1);
    }
}
