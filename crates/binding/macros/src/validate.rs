use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{DeriveInput, Field, parse_macro_input};

use crate::support::{attrs, serde, utils};

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Everything the derive needs to know about one field.
struct FieldSpec {
    ident: syn::Ident,
    internal: String,
    primary: String,
    alternate: Option<String>,
    skip: bool,
    rules: Vec<(String, Option<String>)>,
    ty: syn::Type,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    utils::reject_generics(input)?;

    let struct_name = &input.ident;
    let type_name = utils::ident_name(struct_name);
    let rename_all = serde::container_rename_all(&input.attrs)?;

    let fields = utils::named_fields(input)?;
    let specs = fields
        .named
        .iter()
        .map(|field| field_spec(field, rename_all))
        .collect::<syn::Result<Vec<_>>>()?;

    let field_count = specs.len();
    let field_shapes = specs.iter().map(field_shape);
    let walks = specs.iter().filter(|spec| !spec.skip).map(field_walk);

    Ok(quote! {
        impl ::nebula_binding::shape::Describe for #struct_name {
            fn shape() -> ::nebula_binding::shape::Shape {
                static FIELDS: [::nebula_binding::shape::FieldShape; #field_count] = [
                    #(#field_shapes),*
                ];
                static SHAPE: ::nebula_binding::shape::StructShape =
                    ::nebula_binding::shape::StructShape::new(#type_name, &FIELDS);
                ::nebula_binding::shape::Shape::Struct(&SHAPE)
            }
        }

        impl ::nebula_binding::engine::Inspect for #struct_name {
            fn inspect(&self) -> ::nebula_binding::engine::Value<'_> {
                ::nebula_binding::engine::Value::Struct(self)
            }
        }

        impl ::nebula_binding::engine::Validate for #struct_name {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            #[allow(unused_variables)]
            fn walk(&self, walker: &mut ::nebula_binding::engine::Walker<'_>) {
                #(#walks)*
            }
        }
    })
}

fn field_spec(
    field: &Field,
    rename_all: Option<crate::support::case::RenameRule>,
) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
    let internal = utils::ident_name(&ident);

    let primary = match serde::field_rename(&field.attrs)? {
        Some(name) => name,
        None => match rename_all {
            Some(rule) => rule.apply_to_field(&internal),
            None => internal.clone(),
        },
    };

    let args = attrs::parse_attrs(&field.attrs, "validate")?;
    let mut alternate = None;
    let mut rules = Vec::new();

    for item in &args.items {
        let key = item.key();
        if key == "form" && !matches!(item, attrs::AttrItem::KeyValue { .. }) {
            return Err(utils::error_spanned(key, "expected `form = \"name\"`"));
        }

        match item {
            attrs::AttrItem::Flag(flag) if flag == "skip" => {}
            attrs::AttrItem::Flag(flag) => rules.push((flag.to_string(), None)),
            attrs::AttrItem::KeyValue { key, value } if key == "form" => {
                alternate = Some(value.require_str(key)?);
            }
            attrs::AttrItem::KeyValue { key, value } => {
                rules.push((key.to_string(), Some(value.to_param()?)));
            }
            attrs::AttrItem::List { key, values } => {
                let params = values
                    .iter()
                    .map(attrs::AttrValue::to_param)
                    .collect::<syn::Result<Vec<_>>>()?;
                rules.push((key.to_string(), Some(params.join(" "))));
            }
        }
    }

    let skip = args.has_flag("skip");
    if skip && !rules.is_empty() {
        return Err(utils::error_spanned(
            &ident,
            "`skip` cannot be combined with validation rules",
        ));
    }

    Ok(FieldSpec {
        ident,
        internal,
        primary,
        alternate,
        skip,
        rules,
        ty: field.ty.clone(),
    })
}

fn field_shape(spec: &FieldSpec) -> TokenStream2 {
    let internal = &spec.internal;
    let primary = &spec.primary;
    let alternate = match &spec.alternate {
        Some(name) => quote!(::core::option::Option::Some(#name)),
        None => quote!(::core::option::Option::None),
    };
    let ty = &spec.ty;
    let shape = if spec.skip {
        quote!(::nebula_binding::shape::Shape::opaque)
    } else {
        quote!(<#ty as ::nebula_binding::shape::Describe>::shape)
    };

    quote! {
        ::nebula_binding::shape::FieldShape::new(#internal, #primary, #alternate, #shape)
    }
}

fn field_walk(spec: &FieldSpec) -> TokenStream2 {
    let ident = &spec.ident;
    let internal = &spec.internal;
    let rules = spec.rules.iter().map(|(tag, param)| {
        let param = match param {
            Some(param) => quote!(::core::option::Option::Some(#param)),
            None => quote!(::core::option::Option::None),
        };
        quote!(::nebula_binding::engine::RuleSpec::new(#tag, #param))
    });

    quote! {
        walker.field(#internal, &self.#ident, {
            const RULES: &[::nebula_binding::engine::RuleSpec] = &[#(#rules),*];
            RULES
        });
    }
}
