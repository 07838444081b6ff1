//! Reading the serde attributes that decide a field's wire name.
//!
//! Only `rename` and `rename_all` matter here; everything else inside
//! `#[serde(...)]` is consumed and ignored so that any attribute serde
//! accepts also passes through this derive.

use syn::{Attribute, LitStr, Result, Token, meta::ParseNestedMeta};

use crate::support::case::RenameRule;
use crate::support::utils;

/// `#[serde(rename = "...")]` or `#[serde(rename(deserialize = "..."))]` on a field.
pub fn field_rename(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut rename = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(name) = deserialize_name(&meta)? {
                    rename = Some(name.value());
                }
                return Ok(());
            }
            skip_meta(&meta)
        })?;
    }
    Ok(rename)
}

/// `#[serde(rename_all = "...")]` on the container.
pub fn container_rename_all(attrs: &[Attribute]) -> Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(lit) = deserialize_name(&meta)? {
                    rule = Some(RenameRule::parse(&lit.value()).ok_or_else(|| {
                        utils::error_spanned(&lit, "unknown rename_all convention")
                    })?);
                }
                return Ok(());
            }
            skip_meta(&meta)
        })?;
    }
    Ok(rule)
}

fn deserialize_name(meta: &ParseNestedMeta<'_>) -> Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }

    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("deserialize") {
            name = Some(lit);
        }
        Ok(())
    })?;
    Ok(name)
}

fn skip_meta(meta: &ParseNestedMeta<'_>) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn reads_plain_rename() {
        let field: syn::Field = parse_quote! {
            #[serde(default, rename = "required_param", skip_serializing_if = "String::is_empty")]
            required: String
        };

        assert_eq!(
            field_rename(&field.attrs).unwrap().as_deref(),
            Some("required_param")
        );
    }

    #[test]
    fn reads_deserialize_half_of_split_rename() {
        let field: syn::Field = parse_quote! {
            #[serde(rename(serialize = "out", deserialize = "in"))]
            value: String
        };

        assert_eq!(field_rename(&field.attrs).unwrap().as_deref(), Some("in"));
    }

    #[test]
    fn ignores_unrelated_nested_lists() {
        let input: syn::DeriveInput = parse_quote! {
            #[serde(bound(deserialize = "T: Default"), rename_all = "camelCase")]
            struct Payload { user_name: String }
        };

        assert_eq!(
            container_rename_all(&input.attrs).unwrap(),
            Some(RenameRule::Camel)
        );
    }
}
