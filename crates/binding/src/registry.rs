//! Custom validators and their registration
//!
//! Registration runs in two passes over the same list. The first pass hands
//! every rule function to a fresh [`Engine`]; the second records the message
//! reported when that rule fails. A rejected validator aborts the whole
//! registration, so nothing half-built is ever installed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::{Engine, RuleFn, RuleInput};
use crate::error::RegisterError;

/// A named rule with the message reported when it fails.
///
/// # Examples
///
/// ```rust
/// use nebula_binding::CustomValidator;
///
/// let even = CustomValidator::new(
///     "even",
///     |input| matches!(input.value(), nebula_binding::engine::Value::Int(n) if n % 2 == 0),
///     "must be even",
/// );
/// assert_eq!(even.name(), "even");
/// ```
#[derive(Clone)]
pub struct CustomValidator {
    name: String,
    rule: RuleFn,
    message: String,
}

impl CustomValidator {
    /// Creates a validator. An empty message keeps the default `tag=param` detail.
    pub fn new<F>(name: impl Into<String>, rule: F, message: impl Into<String>) -> Self
    where
        F: Fn(&RuleInput<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            rule: Arc::new(rule),
            message: message.into(),
        }
    }

    /// Rule name used in `#[validate(...)]`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message reported when the rule fails.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish()
    }
}

/// Rule name to message.
pub(crate) type MessageTable = HashMap<String, String>;

/// Builds a fresh engine and message table from `validators`.
pub(crate) fn build(validators: &[CustomValidator]) -> Result<(Engine, MessageTable), RegisterError> {
    let mut engine = Engine::new();
    for validator in validators {
        engine.register_rule(&validator.name, Arc::clone(&validator.rule))?;
    }

    let mut messages = MessageTable::with_capacity(validators.len());
    for validator in validators {
        messages.insert(validator.name.clone(), validator.message.clone());
    }

    tracing::info!(count = validators.len(), "custom validators registered");
    Ok((engine, messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn always(name: &str, message: &str) -> CustomValidator {
        CustomValidator::new(name, |_| true, message)
    }

    #[test]
    fn builds_engine_and_messages() {
        let (engine, messages) = build(&[always("even", "must be even"), always("odd", "")]).unwrap();

        assert!(engine.has_custom("even"));
        assert!(engine.has_custom("odd"));
        assert_eq!(messages.get("even").map(String::as_str), Some("must be even"));
        assert_eq!(messages.get("odd").map(String::as_str), Some(""));
    }

    #[test]
    fn rejection_aborts_registration() {
        let result = build(&[always("even", "x"), always("omitempty", "y")]);
        assert_eq!(result.unwrap_err(), RegisterError::Reserved("omitempty".into()));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = build(&[always("even", "x"), always("even", "y")]);
        assert_eq!(result.unwrap_err(), RegisterError::Duplicate("even".into()));
    }
}
