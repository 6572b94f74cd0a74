//! Parsing of `#[template(...)]` field attributes.
//!
//! This module maps attribute syntax to template rules and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{meta::ParseNestedMeta, spanned::Spanned, Attribute, LitStr, Meta, Result};

/// Match levels accepted in attributes, mirroring `tree_redact::MatchKind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Level {
    Ignore,
    Pass,
    Shallow,
    Deep,
    Full,
}

impl Level {
    pub(crate) fn from_ident(name: &str) -> Option<Self> {
        match name {
            "ignore" => Some(Self::Ignore),
            "pass" => Some(Self::Pass),
            "shallow" => Some(Self::Shallow),
            "deep" => Some(Self::Deep),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    pub(crate) fn variant_name(self) -> &'static str {
        match self {
            Self::Ignore => "Ignore",
            Self::Pass => "Pass",
            Self::Shallow => "Shallow",
            Self::Deep => "Deep",
            Self::Full => "Full",
        }
    }
}

/// Field rule declared by `#[template(...)]`.
///
/// | Attribute | Rule |
/// |-----------|------|
/// | None | container default (`pass` unless overridden) |
/// | `#[template(shallow)]` etc. | `Rule::Match(level)` |
/// | `#[template(nested)]` | `Rule::Nested(<Field as TemplateShape>::template())` |
/// | `#[template(reference = "other")]` | `Rule::Reference("other")` |
#[derive(Clone, Debug)]
pub(crate) enum FieldRule {
    Default,
    Level(Level),
    Nested,
    Reference(LitStr),
}

/// Everything `#[template(...)]` may say about one field.
#[derive(Clone, Debug)]
pub(crate) struct FieldOptions {
    pub(crate) rule: FieldRule,
    pub(crate) rename: Option<LitStr>,
    pub(crate) skip: bool,
}

fn set_rule(target: &mut Option<FieldRule>, next: FieldRule, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "multiple template rules specified on the same field",
        ));
    }
    *target = Some(next);
    Ok(())
}

fn unknown_option(meta: &ParseNestedMeta<'_>) -> syn::Error {
    meta.error(format!(
        "unknown field option `{}`; expected one of `ignore`, `pass`, `shallow`, `deep`, `full`, \
         `nested`, `reference = \"..\"`, `rename = \"..\"`, `skip`",
        meta.path
            .get_ident()
            .map_or_else(|| "?".to_string(), ToString::to_string)
    ))
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut rule: Option<FieldRule> = None;
    let mut rename = None;
    let mut skip = false;

    for attr in attrs {
        if !attr.path().is_ident("template") {
            continue;
        }

        match &attr.meta {
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    let span = meta.path.span();
                    let Some(ident) = meta.path.get_ident().map(ToString::to_string) else {
                        return Err(unknown_option(&meta));
                    };
                    if let Some(level) = Level::from_ident(&ident) {
                        return set_rule(&mut rule, FieldRule::Level(level), span);
                    }
                    match ident.as_str() {
                        "nested" => set_rule(&mut rule, FieldRule::Nested, span),
                        "reference" => {
                            let target: LitStr = meta.value()?.parse()?;
                            set_rule(&mut rule, FieldRule::Reference(target), span)
                        }
                        "rename" => {
                            rename = Some(meta.value()?.parse::<LitStr>()?);
                            Ok(())
                        }
                        "skip" => {
                            skip = true;
                            Ok(())
                        }
                        _ => Err(unknown_option(&meta)),
                    }
                })?;
            }
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected a rule, e.g. #[template(shallow)]",
                ));
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[template]",
                ));
            }
        }
    }

    if skip && rule.is_some() {
        return Err(syn::Error::new(
            Span::call_site(),
            "`skip` cannot be combined with a template rule",
        ));
    }

    Ok(FieldOptions {
        rule: rule.unwrap_or(FieldRule::Default),
        rename,
        skip,
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_returns_default() {
        let options = parse_field_options(&parse_attrs(quote! {})).unwrap();
        assert!(matches!(options.rule, FieldRule::Default));
        assert!(options.rename.is_none());
        assert!(!options.skip);
    }

    #[test]
    fn levels_are_parsed() {
        let options = parse_field_options(&parse_attrs(quote! { #[template(deep)] })).unwrap();
        assert!(matches!(options.rule, FieldRule::Level(Level::Deep)));
    }

    #[test]
    fn reference_and_rename_combine() {
        let options = parse_field_options(&parse_attrs(
            quote! { #[template(reference = "name", rename = "Value")] },
        ))
        .unwrap();
        match options.rule {
            FieldRule::Reference(target) => assert_eq!(target.value(), "name"),
            other => panic!("expected Reference, got {other:?}"),
        }
        assert_eq!(options.rename.unwrap().value(), "Value");
    }

    #[test]
    fn rules_may_span_attributes() {
        let options = parse_field_options(&parse_attrs(quote! {
            #[template(rename = "x")]
            #[template(nested)]
        }))
        .unwrap();
        assert!(matches!(options.rule, FieldRule::Nested));
    }

    #[test]
    fn multiple_rules_error() {
        let result = parse_field_options(&parse_attrs(quote! { #[template(shallow, deep)] }));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("multiple template rules"));
    }

    #[test]
    fn skip_with_rule_errors() {
        let result = parse_field_options(&parse_attrs(quote! { #[template(skip, full)] }));
        assert!(result.unwrap_err().to_string().contains("`skip` cannot be combined"));
    }

    #[test]
    fn unknown_option_errors() {
        let result = parse_field_options(&parse_attrs(quote! { #[template(secret)] }));
        assert!(result.unwrap_err().to_string().contains("unknown field option"));
    }

    #[test]
    fn bare_attribute_errors() {
        let result = parse_field_options(&parse_attrs(quote! { #[template] }));
        assert!(result.unwrap_err().to_string().contains("expected a rule"));
    }

    #[test]
    fn name_value_syntax_error() {
        let result = parse_field_options(&parse_attrs(quote! { #[template = "deep"] }));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name-value syntax is not supported"));
    }

    #[test]
    fn other_attributes_ignored() {
        let options = parse_field_options(&parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(skip)]
        }))
        .unwrap();
        assert!(matches!(options.rule, FieldRule::Default));
    }
}
