use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, FieldsNamed, Ident};

/// An error pointing at `tokens`.
pub fn error_spanned<T: quote::ToTokens>(tokens: &T, msg: impl Into<String>) -> syn::Error {
    syn::Error::new_spanned(tokens, msg.into())
}

/// The named fields of a struct; enums, unions, tuple and unit structs are rejected.
pub fn named_fields(input: &DeriveInput) -> syn::Result<&FieldsNamed> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "`Validate` can only be derived for structs",
        ));
    };

    match &data.fields {
        Fields::Named(named) => Ok(named),
        other => Err(syn::Error::new(
            other.span(),
            "`Validate` requires named fields; tuple and unit structs have no field names to report",
        )),
    }
}

/// Field metadata lives in statics, which cannot name generic parameters.
pub fn reject_generics(input: &DeriveInput) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new(
            input.generics.span(),
            "`Validate` does not support generic or lifetime parameters",
        ))
    }
}

/// Identifier text without the `r#` prefix of raw identifiers.
pub fn ident_name(ident: &Ident) -> String {
    ident.unraw().to_string()
}
