//! Container-level attribute parsing for `#[derive(Template)]`.
//!
//! This module handles attributes on the struct itself, not on fields.

use syn::{Attribute, LitStr, Meta, Result};

use crate::rule::Level;

/// Options parsed from container-level `#[template(...)]` attributes.
#[derive(Clone, Debug)]
pub(crate) struct ContainerOptions {
    /// Level applied to fields without their own rule.
    pub(crate) default: Level,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            default: Level::Pass,
        }
    }
}

/// Parses container-level `#[template(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("template") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {}
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("default") {
                        let value: LitStr = meta.value()?.parse()?;
                        options.default = Level::from_ident(&value.value()).ok_or_else(|| {
                            syn::Error::new(
                                value.span(),
                                format!(
                                    "unknown default level `{}`; expected one of `ignore`, \
                                     `pass`, `shallow`, `deep`, `full`",
                                    value.value()
                                ),
                            )
                        })?;
                        Ok(())
                    } else {
                        Err(meta.error(format!(
                            "unknown container option `{}`; expected `default = \"..\"`",
                            meta.path
                                .get_ident()
                                .map_or_else(|| "?".to_string(), ToString::to_string)
                        )))
                    }
                })?;
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[template]",
                ));
            }
        }
    }

    Ok(options)
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
    fn no_attribute_defaults_to_pass() {
        let options = parse_container_options(&parse_attrs(quote! {})).unwrap();
        assert_eq!(options.default, Level::Pass);
    }

    #[test]
    fn default_level_is_parsed() {
        let options =
            parse_container_options(&parse_attrs(quote! { #[template(default = "shallow")] }))
                .unwrap();
        assert_eq!(options.default, Level::Shallow);
    }

    #[test]
    fn unknown_level_errors() {
        let result =
            parse_container_options(&parse_attrs(quote! { #[template(default = "secret")] }));
        assert!(result.unwrap_err().to_string().contains("unknown default level"));
    }

    #[test]
    fn unknown_option_errors() {
        let result = parse_container_options(&parse_attrs(quote! { #[template(skip_debug)] }));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown container option"));
    }

    #[test]
    fn bare_template_on_container_is_ignored() {
        let options = parse_container_options(&parse_attrs(quote! { #[template] })).unwrap();
        assert_eq!(options.default, Level::Pass);
    }
}
