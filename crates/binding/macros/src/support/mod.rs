//! Internal support utilities for the derive.
//!
//! Attribute parsing, serde naming and small syn helpers.

pub mod attrs;
pub mod case;
pub mod serde;
pub mod utils;
