//! # nebula-binding
//!
//! Binds HTTP request payloads onto typed targets, validates them against
//! declarative field rules, and reports failures keyed by the names callers
//! actually sent.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebula_binding::{Binder, Validate};
//!
//! #[derive(serde::Deserialize, Validate)]
//! #[serde(rename_all = "camelCase")]
//! struct CreateOrder {
//!     #[validate(required, form = "customer")]
//!     customer_id: String,
//!     #[validate(required, dive)]
//!     line_items: Vec<LineItem>,
//! }
//!
//! let order: CreateOrder = Binder::new().bind_and_validate(request).await?;
//! ```
//!
//! A failing bind returns [`BindError::Invalid`] holding a
//! [`ValidationError`] such as `customer=required;lineItems.1.sku=required`.
//!
//! ## Decoding
//!
//! `GET` requests are read from the query string. Multipart and URL-encoded
//! bodies are read together with the query string; every other body is JSON.
//! See [`decode::Strategy`].
//!
//! ## Field keys
//!
//! Rules report Rust field paths. Each path is translated through the
//! target's [`Shape`](shape::Shape): the form name set with
//! `#[validate(form = "...")]` wins, then the serde name, and sequence
//! indexes pass through (`lineItems.1.sku`).
//!
//! ## Custom rules
//!
//! [`CustomValidator`]s are registered when a [`Binder`] is built, or on the
//! process-wide default with [`register`]. Each brings a message that replaces
//! the default `rule=param` detail.

// BindError carries multer and serde errors unboxed; binds return it once per
// request, so the size does not matter.
#![allow(clippy::result_large_err)]

extern crate self as nebula_binding;

mod binder;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod extract;
mod form;
pub mod global;
pub mod path;
mod registry;
pub mod shape;

pub use binder::{Binder, BinderBuilder};
pub use config::BindConfig;
pub use engine::Validate;
pub use error::{BindError, DecodeError, EngineError, FieldErrors, RegisterError, ResolveError, Result, ValidationError};
pub use extract::Valid;
pub use global::{bind_and_validate, register};
pub use nebula_binding_macros::Validate;
pub use registry::CustomValidator;
