//! # Nebula Binding Macros
//!
//! `#[derive(Validate)]` for request targets of `nebula-binding`.
//!
//! The derive describes a struct's fields once, at compile time: the Rust
//! identifier the rule engine reports, the serde (JSON) name, the optional
//! form/query name, and the rules to run.
//!
//! ## Examples
//!
//! ```ignore
//! use nebula_binding::Validate;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Validate)]
//! #[serde(rename_all = "camelCase")]
//! pub struct CreateOrder {
//!     #[validate(required, form = "customer")]
//!     customer_id: String,
//!
//!     #[validate(required, min = 1, dive, required)]
//!     line_items: Vec<LineItem>,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod support;
mod validate;

/// Derive macro implementing `Describe`, `Inspect` and `Validate`.
///
/// # Attributes
///
/// ## Field attributes (`#[validate(...)]`)
///
/// - `form = "..."` - Name used for form and query decoding; also preferred
///   over the serde name when reporting errors
/// - `skip` - Field takes no part in validation or form decoding
/// - any other flag (`required`, `email`) - Rule without a parameter
/// - `rule = value` (`min = 3`, `oneof = "a b"`) - Rule with a parameter
/// - `rule(a, b)` - Rule whose parameter is the values joined by spaces
/// - `dive` - Rules after it apply to each element of a sequence
/// - `omitempty` - Remaining rules are skipped for empty values
///
/// Rules run in declaration order. The serde name is taken from
/// `#[serde(rename = "...")]` or the container's `#[serde(rename_all = "...")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// pub struct Search {
///     #[serde(rename = "q")]
///     #[validate(required, max = 120)]
///     query: String,
///
///     #[serde(default)]
///     #[validate(form = "tag", dive, oneof("new", "used"))]
///     tags: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    validate::derive(input)
}
