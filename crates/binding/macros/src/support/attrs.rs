use proc_macro2::TokenStream as TokenStream2;
use syn::{
    Attribute, Ident, Lit, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

use crate::support::utils;

/// Parsed attribute arguments, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single attribute item.
#[derive(Debug, Clone)]
pub enum AttrItem {
    /// A flag like `required` or `dive`
    Flag(Ident),
    /// Key-value pair like `min = 3`
    KeyValue { key: Ident, value: AttrValue },
    /// Nested list like `oneof("a", "b")`
    List { key: Ident, values: Vec<AttrValue> },
}

/// Value on the right-hand side of a key or inside a list.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Ident(Ident),
    Lit(Lit),
    Tokens(TokenStream2),
}

impl AttrItem {
    /// The key of the item, whatever its form.
    pub fn key(&self) -> &Ident {
        match self {
            Self::Flag(key) | Self::KeyValue { key, .. } | Self::List { key, .. } => key,
        }
    }
}

impl AttrValue {
    /// Renders the value as the textual parameter the engine receives.
    ///
    /// String literals lose their quotes, numbers keep their written digits
    /// and arbitrary tokens (`-1`) are concatenated without spacing.
    pub fn to_param(&self) -> Result<String> {
        match self {
            Self::Lit(Lit::Str(s)) => Ok(s.value()),
            Self::Lit(Lit::Int(i)) => Ok(i.base10_digits().to_string()),
            Self::Lit(Lit::Float(f)) => Ok(f.base10_digits().to_string()),
            Self::Lit(Lit::Bool(b)) => Ok(b.value.to_string()),
            Self::Lit(other) => Err(utils::error_spanned(
                other,
                "unsupported literal in rule parameter",
            )),
            Self::Ident(ident) => Ok(ident.to_string()),
            Self::Tokens(tokens) => Ok(tokens
                .to_string()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect()),
        }
    }

    /// Returns the string literal, or an error naming `key`.
    pub fn require_str(&self, key: &Ident) -> Result<String> {
        match self {
            Self::Lit(Lit::Str(s)) => Ok(s.value()),
            Self::Lit(other) => Err(utils::error_spanned(
                other,
                format!("`{key}` expects a string literal"),
            )),
            Self::Ident(other) => Err(utils::error_spanned(
                other,
                format!("`{key}` expects a string literal"),
            )),
            Self::Tokens(other) => Err(utils::error_spanned(
                other,
                format!("`{key}` expects a string literal"),
            )),
        }
    }
}

impl AttrArgs {
    /// Check if a flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, AttrItem::Flag(f) if f == flag))
    }
}

/// Parse attribute like `#[validate(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute, expected: &str) -> Result<Option<AttrArgs>> {
    if !attr.path().is_ident(expected) {
        return Ok(None);
    }

    match &attr.meta {
        Meta::Path(_) => Ok(Some(AttrArgs::default())),
        Meta::List(list) => {
            let args = syn::parse2::<AttrArgsParser>(list.tokens.clone())?;
            Ok(Some(args.0))
        }
        Meta::NameValue(nv) => Err(utils::error_spanned(
            nv,
            format!("#[{expected}] must be #[{expected}(...)] or #[{expected}] (not name-value)"),
        )),
    }
}

/// Parse all attributes of a given name and merge them in order.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<AttrArgs> {
    let mut result = AttrArgs::default();

    for attr in attrs {
        if let Some(args) = parse_attr(attr, name)? {
            result.items.extend(args.items);
        }
    }

    Ok(result)
}

struct AttrArgsParser(AttrArgs);

impl Parse for AttrArgsParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = if input.is_empty() {
            vec![]
        } else {
            Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
                .into_iter()
                .map(|x| x.0)
                .collect()
        };
        Ok(Self(AttrArgs { items }))
    }
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;

        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let value: AttrValue = input.parse::<AttrValueParser>()?.0;
            return Ok(Self(AttrItem::KeyValue { key, value }));
        }

        if input.peek(syn::token::Paren) {
            let content;
            syn::parenthesized!(content in input);

            let values = if content.is_empty() {
                vec![]
            } else {
                Punctuated::<AttrValueParser, Token![,]>::parse_terminated(&content)?
                    .into_iter()
                    .map(|x| x.0)
                    .collect()
            };

            return Ok(Self(AttrItem::List { key, values }));
        }

        Ok(Self(AttrItem::Flag(key)))
    }
}

struct AttrValueParser(AttrValue);

impl Parse for AttrValueParser {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(Lit) {
            return Ok(Self(AttrValue::Lit(input.parse()?)));
        }
        if input.peek(Ident) && (input.peek2(Token![,]) || is_last_token(input)) {
            return Ok(Self(AttrValue::Ident(input.parse()?)));
        }

        let mut tokens = TokenStream2::new();
        while !input.is_empty() && !input.peek(Token![,]) {
            let tt: proc_macro2::TokenTree = input.parse()?;
            tokens.extend(std::iter::once(tt));
        }
        Ok(Self(AttrValue::Tokens(tokens)))
    }
}

fn is_last_token(input: ParseStream) -> bool {
    let fork = input.fork();
    fork.parse::<proc_macro2::TokenTree>().is_ok() && fork.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse(tokens: TokenStream2) -> AttrArgs {
        syn::parse2::<AttrArgsParser>(tokens).unwrap().0
    }

    #[test]
    fn keeps_declaration_order() {
        let args = parse(quote!(required, min = 3, dive, email));
        let keys: Vec<String> = args.items.iter().map(|i| i.key().to_string()).collect();

        assert_eq!(keys, vec!["required", "min", "dive", "email"]);
        assert!(args.has_flag("dive"));
        assert!(!args.has_flag("min"));
    }

    #[test]
    fn renders_params_as_written() {
        let args = parse(quote!(min = 3, max = 2.5, eq = "abc", ne = -1, oneof = red));
        let params: Vec<String> = args
            .items
            .iter()
            .map(|item| match item {
                AttrItem::KeyValue { value, .. } => value.to_param().unwrap(),
                _ => panic!("expected key-value"),
            })
            .collect();

        assert_eq!(params, vec!["3", "2.5", "abc", "-1", "red"]);
    }

    #[test]
    fn parses_list_values() {
        let args = parse(quote!(oneof("a", "b", c)));

        match &args.items[0] {
            AttrItem::List { key, values } => {
                assert_eq!(key, "oneof");
                assert_eq!(values.len(), 3);
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }
}
