//! Struct-specific `TemplateShape` derivation.
//!
//! This module turns named struct fields into a `Template` builder chain and
//! collects generic parameters that require trait bounds.

use std::collections::BTreeSet;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::{spanned::Spanned, DataStruct, Fields, Result};

use crate::{
    crate_path,
    generics::collect_generics_from_type,
    rule::{parse_field_options, FieldRule, Level},
};

pub(crate) struct StructDeriveOutput {
    pub(crate) template_body: TokenStream,
    pub(crate) used_generics: Vec<Ident>,
}

struct FieldEntry {
    key: String,
    span: proc_macro2::Span,
    rule: TokenStream,
    reference: Option<syn::LitStr>,
}

fn level_tokens(level: Level) -> TokenStream {
    let rule = crate_path("Rule");
    let kind = crate_path("MatchKind");
    let variant = format_ident!("{}", level.variant_name());
    quote! { #rule::Match(#kind::#variant) }
}

pub(crate) fn derive_struct(
    name: &Ident,
    data: DataStruct,
    generics: &syn::Generics,
    default: Level,
) -> Result<StructDeriveOutput> {
    let fields = match data.fields {
        Fields::Named(fields) => fields,
        Fields::Unnamed(fields) => {
            return Err(syn::Error::new(
                fields.span(),
                "`Template` requires named fields; tuple structs have no keys",
            ));
        }
        Fields::Unit => {
            return Err(syn::Error::new(
                name.span(),
                "`Template` cannot be derived for unit structs",
            ));
        }
    };

    let rule_path = crate_path("Rule");
    let shape_path = crate_path("TemplateShape");
    let mut used_generics = Vec::new();
    let mut entries: Vec<FieldEntry> = Vec::new();

    for field in fields.named {
        let span = field.span();
        let options = parse_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(span, "named field should have an identifier"))?;
        let key = options.rename.as_ref().map_or_else(
            || ident.to_string().trim_start_matches("r#").to_string(),
            syn::LitStr::value,
        );
        if entries.iter().any(|entry| entry.key == key) {
            return Err(syn::Error::new(
                span,
                format!("duplicate template key `{key}`"),
            ));
        }

        let ty = &field.ty;
        let (rule, reference) = match options.rule {
            FieldRule::Default => (level_tokens(default), None),
            FieldRule::Level(level) => (level_tokens(level), None),
            FieldRule::Nested => {
                collect_generics_from_type(ty, generics, &mut used_generics);
                (
                    quote_spanned! { span =>
                        #rule_path::Nested(<#ty as #shape_path>::template())
                    },
                    None,
                )
            }
            FieldRule::Reference(target) => (
                quote! {
                    #rule_path::Reference(::std::string::String::from(#target))
                },
                Some(target),
            ),
        };
        entries.push(FieldEntry {
            key,
            span,
            rule,
            reference,
        });
    }

    let keys: BTreeSet<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();
    for entry in &entries {
        if let Some(target) = &entry.reference {
            if !keys.contains(target.value().as_str()) {
                return Err(syn::Error::new(
                    target.span(),
                    format!(
                        "field `{}` references `{}`, which is not a key of `{name}`",
                        entry.key,
                        target.value()
                    ),
                ));
            }
        }
    }

    let template_path = crate_path("Template");
    let calls = entries.iter().map(|entry| {
        let FieldEntry { key, span, rule, .. } = entry;
        quote_spanned! { *span => .field(#key, #rule) }
    });

    Ok(StructDeriveOutput {
        template_body: quote! {
            #template_path::new() #(#calls)*
        },
        used_generics,
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::{Data, DeriveInput};

    use super::*;

    fn derive(tokens: TokenStream) -> Result<StructDeriveOutput> {
        let input: DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        let Data::Struct(data) = input.data else {
            panic!("expected a struct");
        };
        derive_struct(&input.ident, data, &input.generics, Level::Pass)
    }

    #[test]
    fn emits_one_call_per_field() {
        let output = derive(quote! {
            struct Pair {
                name: String,
                #[template(deep)]
                value: String,
            }
        })
        .unwrap();
        let body = output.template_body.to_string();
        assert!(body.contains("\"name\""));
        assert!(body.contains("Pass"));
        assert!(body.contains("\"value\""));
        assert!(body.contains("Deep"));
        assert!(output.used_generics.is_empty());
    }

    #[test]
    fn skip_and_rename_change_keys() {
        let output = derive(quote! {
            struct Row {
                #[template(skip)]
                internal: u8,
                #[template(rename = "userId")]
                user_id: u64,
            }
        })
        .unwrap();
        let body = output.template_body.to_string();
        assert!(!body.contains("internal"));
        assert!(body.contains("\"userId\""));
    }

    #[test]
    fn raw_identifiers_lose_prefix() {
        let output = derive(quote! {
            struct Raw {
                r#type: String,
            }
        })
        .unwrap();
        assert!(output.template_body.to_string().contains("\"type\""));
    }

    #[test]
    fn nested_generic_is_collected() {
        let output = derive(quote! {
            struct Wrapper<T> {
                #[template(nested)]
                inner: Option<T>,
            }
        })
        .unwrap();
        assert_eq!(output.used_generics.len(), 1);
        assert!(output.template_body.to_string().contains("Nested"));
    }

    #[test]
    fn reference_to_missing_key_errors() {
        let result = derive(quote! {
            struct Pair {
                name: String,
                #[template(reference = "label")]
                value: String,
            }
        });
        assert!(result
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default()
            .contains("not a key of `Pair`"));
    }

    #[test]
    fn reference_to_skipped_key_errors() {
        let result = derive(quote! {
            struct Pair {
                #[template(skip)]
                name: String,
                #[template(reference = "name")]
                value: String,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_keys_error() {
        let result = derive(quote! {
            struct Clash {
                a: String,
                #[template(rename = "a")]
                b: String,
            }
        });
        assert!(result
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default()
            .contains("duplicate template key"));
    }

    #[test]
    fn tuple_struct_errors() {
        let result = derive(quote! { struct Tuple(String); });
        assert!(result.is_err());
    }

    #[test]
    fn unit_struct_errors() {
        let result = derive(quote! { struct Unit; });
        assert!(result.is_err());
    }
}
