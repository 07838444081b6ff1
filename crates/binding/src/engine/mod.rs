//! Rule engine
//!
//! Runs the rules `#[derive(Validate)]` attaches to each field and reports
//! raw failures keyed by the internal namespace (`Order.items[1].sku`). The
//! engine knows nothing about wire names; translating namespaces is the
//! binder's job.

mod builtin;
mod value;
mod walker;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use value::{Inspect, Validate, Value};
pub use walker::Walker;

use crate::error::{EngineError, RegisterError};

/// Splits field rules from per-element rules.
pub(crate) const DIVE: &str = "dive";
/// Skips the remaining rules when the value is empty.
pub(crate) const OMITEMPTY: &str = "omitempty";

/// Names custom validators may not take.
pub(crate) const RESERVED: &[&str] = &[DIVE, OMITEMPTY, "form", "skip"];

/// A custom rule function.
pub type RuleFn = Arc<dyn Fn(&RuleInput<'_>) -> bool + Send + Sync>;

// ============================================================================
// RULES AND RESULTS
// ============================================================================

/// One rule attached to a field, as written in `#[validate(...)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    /// Rule name
    pub tag: &'static str,
    /// Parameter after `=`, if any
    pub param: Option<&'static str>,
}

impl RuleSpec {
    pub const fn new(tag: &'static str, param: Option<&'static str>) -> Self {
        Self { tag, param }
    }
}

/// What a rule function gets to look at.
#[derive(Debug)]
pub struct RuleInput<'a> {
    pub(crate) field: &'a str,
    pub(crate) namespace: &'a str,
    pub(crate) value: &'a Value<'a>,
    pub(crate) optional: bool,
    pub(crate) param: Option<&'a str>,
}

impl<'a> RuleInput<'a> {
    /// Rust identifier of the field.
    #[must_use]
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Internal namespace of the field, e.g. `Order.items[1].sku`.
    #[must_use]
    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    /// The field value.
    #[must_use]
    pub fn value(&self) -> &'a Value<'a> {
        self.value
    }

    /// Whether the field is an option; `None` shows up as [`Value::Absent`].
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the value counts as given: present for options, non-zero
    /// otherwise.
    #[must_use]
    pub fn is_given(&self) -> bool {
        if self.optional {
            !self.value.is_absent()
        } else {
            !self.value.is_zero()
        }
    }

    /// The rule parameter, if one was given.
    #[must_use]
    pub fn param(&self) -> Option<&'a str> {
        self.param
    }
}

/// A rule failure before path translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFieldFailure {
    /// Internal namespace rooted at the Rust type name
    pub namespace: String,
    /// Name of the failed rule
    pub tag: String,
    /// Rule parameter, if one was given
    pub param: Option<String>,
}

/// Outcome of running the engine over a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Every rule passed
    Valid,
    /// Some rules failed; at most one entry per field
    Failures(Vec<RawFieldFailure>),
    /// A rule could not be evaluated at all
    Faulted(EngineError),
}

// ============================================================================
// ENGINE
// ============================================================================

/// The rule engine: built-in rules plus a table of custom ones.
///
/// Custom rules shadow built-ins of the same name. An engine is filled once
/// while a [`Binder`](crate::Binder) is built and is read-only afterwards.
#[derive(Clone, Default)]
pub struct Engine {
    custom: HashMap<String, RuleFn>,
}

impl Engine {
    /// Creates an engine with only the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom rule.
    ///
    /// # Errors
    ///
    /// Rejects empty names, reserved modifiers, names containing whitespace
    /// or any of `,`, `=`, `|`, and names already registered.
    pub fn register_rule(&mut self, name: &str, rule: RuleFn) -> Result<(), RegisterError> {
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        if RESERVED.contains(&name) {
            return Err(RegisterError::Reserved(name.to_string()));
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '=' | '|'))
        {
            return Err(RegisterError::Malformed(name.to_string()));
        }
        if self.custom.contains_key(name) {
            return Err(RegisterError::Duplicate(name.to_string()));
        }

        if builtin::is_builtin(name) {
            tracing::debug!(rule = name, "custom rule shadows built-in");
        }
        self.custom.insert(name.to_string(), rule);
        Ok(())
    }

    /// Whether a custom rule with this name exists.
    #[must_use]
    pub fn has_custom(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Runs every rule of `target`, descending into nested structs.
    pub fn evaluate(&self, target: &dyn Validate) -> Evaluation {
        let mut walker = Walker::new(self, target.type_name());
        target.walk(&mut walker);
        walker.finish()
    }

    pub(crate) fn check(&self, spec: &RuleSpec, input: &RuleInput<'_>) -> Result<bool, EngineError> {
        match self.custom.get(spec.tag) {
            Some(rule) => Ok(rule(input)),
            None => builtin::check(spec.tag, input),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Engine").field("custom", &names).finish()
    }
}
