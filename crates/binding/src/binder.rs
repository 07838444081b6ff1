//! Decode, validate, and translate failures
//!
//! A [`Binder`] owns the rule engine, the custom message table and the
//! [`BindConfig`]. It is immutable once built and cheap to share behind an
//! `Arc`.

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::config::BindConfig;
use crate::decode;
use crate::engine::{Engine, Evaluation, RawFieldFailure, Validate};
use crate::error::{FieldErrors, RegisterError, ResolveError, Result, ValidationError};
use crate::path::{prepare_namespace, resolve_path};
use crate::registry::{self, CustomValidator, MessageTable};
use crate::shape::{Describe, Shape};

/// Binds requests onto typed targets and validates them.
///
/// # Examples
///
/// ```rust
/// use nebula_binding::{Binder, CustomValidator, Validate};
///
/// #[derive(serde::Deserialize, Validate)]
/// struct Signup {
///     #[validate(required, notadmin)]
///     user: String,
/// }
///
/// let binder = Binder::builder()
///     .validator(CustomValidator::new(
///         "notadmin",
///         |input| input.value().as_str() != Some("admin"),
///         "reserved user name",
///     ))
///     .build()
///     .unwrap();
///
/// let error = binder.validate(&Signup { user: "admin".into() }).unwrap_err();
/// assert_eq!(error.to_string(), "user=reserved user name");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Binder {
    engine: Engine,
    messages: MessageTable,
    config: BindConfig,
}

impl Binder {
    /// A binder with built-in rules only and the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a binder.
    pub fn builder() -> BinderBuilder {
        BinderBuilder::default()
    }

    /// Builds a binder with `validators` and the default configuration.
    ///
    /// Registration always starts from scratch: validators of any other
    /// binder are not carried over.
    pub fn register(validators: impl IntoIterator<Item = CustomValidator>) -> Result<Self, RegisterError> {
        Self::builder().validators(validators).build()
    }

    /// The configuration this binder decodes with.
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Decodes `request` into `T`, then validates it.
    ///
    /// Decode failures are returned as [`BindError::Decode`](crate::BindError::Decode) and skip
    /// validation.
    pub async fn bind_and_validate<T>(&self, request: Request) -> Result<T>
    where
        T: DeserializeOwned + Describe + Validate,
    {
        let target = decode::decode::<T>(request, &self.config).await?;
        self.validate(&target)?;
        Ok(target)
    }

    /// Validates an already decoded target.
    pub fn validate<T>(&self, target: &T) -> Result<()>
    where
        T: Describe + Validate,
    {
        let failures = match self.engine.evaluate(target) {
            Evaluation::Valid => return Ok(()),
            Evaluation::Failures(failures) if failures.is_empty() => return Ok(()),
            Evaluation::Failures(failures) => failures,
            Evaluation::Faulted(fault) => {
                tracing::debug!(error = %fault, "rule evaluation faulted");
                return Err(ValidationError::with_message(fault.to_string()).into());
            }
        };

        tracing::debug!(
            target_type = target.type_name(),
            failures = failures.len(),
            "validation failed"
        );
        let fields = self.translate(T::shape(), &failures)?;
        Err(ValidationError::with_fields(fields).into())
    }

    fn translate(&self, shape: Shape, failures: &[RawFieldFailure]) -> Result<FieldErrors, ResolveError> {
        let mut fields = FieldErrors::new();

        for failure in failures {
            let segments = prepare_namespace(&failure.namespace);
            let key = resolve_path(shape, &segments).inspect_err(|error| {
                tracing::error!(namespace = %failure.namespace, %error, "failed to resolve field path");
            })?;
            let detail = self.detail(failure);
            tracing::trace!(namespace = %failure.namespace, %key, %detail, "field failure");

            if let Some(previous) = fields.insert(key.clone(), detail) {
                tracing::warn!(%key, %previous, "duplicate field key, keeping the last failure");
            }
        }

        Ok(fields)
    }

    /// Custom message for the tag when one is set, otherwise `tag` or `tag=param`.
    fn detail(&self, failure: &RawFieldFailure) -> String {
        if let Some(message) = self.messages.get(&failure.tag)
            && !message.is_empty()
        {
            tracing::trace!(rule = %failure.tag, "using custom message");
            return message.clone();
        }

        match &failure.param {
            Some(param) => format!("{}={param}", failure.tag),
            None => failure.tag.clone(),
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Binder`].
#[derive(Debug, Default)]
pub struct BinderBuilder {
    validators: Vec<CustomValidator>,
    config: BindConfig,
}

impl BinderBuilder {
    /// Adds one custom validator.
    pub fn validator(mut self, validator: CustomValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Adds several custom validators.
    pub fn validators(mut self, validators: impl IntoIterator<Item = CustomValidator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the body size limit.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    /// Registers the validators with a fresh engine.
    pub fn build(self) -> Result<Binder, RegisterError> {
        let (engine, messages) = registry::build(&self.validators)?;
        Ok(Binder {
            engine,
            messages,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Inspect, RuleSpec, Value, Walker};
    use crate::error::BindError;
    use crate::shape::{FieldShape, StructShape};
    use pretty_assertions::assert_eq;

    /// Hand-written equivalent of a derived target whose metadata
    /// can be made to disagree with its walker.
    struct Handmade {
        name: String,
        lie: bool,
    }

    impl Describe for Handmade {
        fn shape() -> Shape {
            static FIELDS: [FieldShape; 1] =
                [FieldShape::new("name", "userName", Some("user"), <String as Describe>::shape)];
            static SHAPE: StructShape = StructShape::new("Handmade", &FIELDS);
            Shape::Struct(&SHAPE)
        }
    }

    impl Inspect for Handmade {
        fn inspect(&self) -> Value<'_> {
            Value::Struct(self)
        }
    }

    impl Validate for Handmade {
        fn type_name(&self) -> &'static str {
            "Handmade"
        }

        fn walk(&self, walker: &mut Walker<'_>) {
            let ident = if self.lie { "missing" } else { "name" };
            walker.field(ident, &self.name, &[RuleSpec::new("min", Some("3"))]);
        }
    }

    fn handmade(name: &str, lie: bool) -> Handmade {
        Handmade {
            name: name.to_string(),
            lie,
        }
    }

    #[test]
    fn valid_target_passes() {
        assert!(Binder::new().validate(&handmade("abcd", false)).is_ok());
    }

    #[test]
    fn failure_uses_alternate_name_and_param() {
        let error = Binder::new().validate(&handmade("ab", false)).unwrap_err();
        let fields = error.as_validation().and_then(ValidationError::fields).unwrap();
        assert_eq!(fields.get("user").map(String::as_str), Some("min=3"));
    }

    #[test]
    fn custom_message_overrides_detail() {
        let binder = Binder::register([CustomValidator::new("min", |_| false, "too short")]).unwrap();
        let error = binder.validate(&handmade("abcd", false)).unwrap_err();
        assert_eq!(error.to_string(), "user=too short");
    }

    #[test]
    fn empty_custom_message_keeps_default_detail() {
        let binder = Binder::register([CustomValidator::new("min", |_| false, "")]).unwrap();
        let error = binder.validate(&handmade("abcd", false)).unwrap_err();
        assert_eq!(error.to_string(), "user=min=3");
    }

    #[test]
    fn unresolvable_namespace_is_a_contract_error() {
        let error = Binder::new().validate(&handmade("ab", true)).unwrap_err();
        assert!(matches!(
            error,
            BindError::Contract(ResolveError::UnknownField { type_name: "Handmade", .. })
        ));
    }

    #[test]
    fn builder_sets_config() {
        let binder = Binder::builder().max_body_bytes(16).build().unwrap();
        assert_eq!(binder.config().max_body_bytes, 16);
    }
}
