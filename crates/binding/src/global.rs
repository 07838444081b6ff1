//! Process-wide default binder
//!
//! Handlers that do not carry a [`Binder`] of their own use this one. It
//! starts with built-in rules only; [`register`] swaps in a new binder in one
//! atomic step, so concurrent binds see either the old table or the new one.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::binder::Binder;
use crate::engine::Validate;
use crate::error::{RegisterError, Result};
use crate::registry::CustomValidator;
use crate::shape::Describe;

// ============================================================================
// Default binder: ArcSwap, lock-free reads, replaced on registration
// ============================================================================

static DEFAULT_BINDER: LazyLock<ArcSwap<Binder>> = LazyLock::new(|| ArcSwap::from_pointee(Binder::new()));

/// Replaces the default binder with one holding exactly `validators`.
///
/// Validators from earlier calls are dropped. On error the current binder
/// stays in place. The body limit of the current binder is kept.
pub fn register(validators: impl IntoIterator<Item = CustomValidator>) -> Result<(), RegisterError> {
    let config = DEFAULT_BINDER.load().config().clone();
    let binder = Binder::builder()
        .validators(validators)
        .config(config)
        .build()?;
    DEFAULT_BINDER.store(Arc::new(binder));
    Ok(())
}

/// Installs `binder` as the default.
pub fn install(binder: Binder) {
    DEFAULT_BINDER.store(Arc::new(binder));
}

/// The current default binder.
pub fn current() -> Arc<Binder> {
    DEFAULT_BINDER.load_full()
}

/// [`Binder::bind_and_validate`] on the default binder.
pub async fn bind_and_validate<T>(request: Request) -> Result<T>
where
    T: DeserializeOwned + Describe + Validate,
{
    let binder = current();
    binder.bind_and_validate(request).await
}
