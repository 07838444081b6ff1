//! Error types for binding and validation
//!
//! [`ValidationError`] is what API callers see: either one message or a
//! mapping from wire-format field key to failure detail. The other enums
//! describe why a bind never reached, or could not finish, validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for binding operations
pub type Result<T, E = BindError> = std::result::Result<T, E>;

/// Failure details keyed by external field key (`items.1.name`).
///
/// Ordered, so the joined rendering is stable across runs.
pub type FieldErrors = BTreeMap<String, String>;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A structured validation failure.
///
/// # Examples
///
/// ```rust
/// use nebula_binding::{FieldErrors, ValidationError};
///
/// let mut fields = FieldErrors::new();
/// fields.insert("required_param".into(), "required".into());
///
/// let error = ValidationError::with_fields(fields);
/// assert_eq!(error.to_string(), "required_param=required");
///
/// let error = ValidationError::with_message("engine exploded");
/// assert_eq!(error.to_string(), "engine exploded");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationError {
    /// Free-text message, used when failures are not field-specific.
    Message(String),
    /// Failure detail per external field key.
    Fields(FieldErrors),
}

impl ValidationError {
    /// Creates a field-keyed error.
    pub fn with_fields(fields: FieldErrors) -> Self {
        Self::Fields(fields)
    }

    /// Creates a message-only error.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// The field mapping, if this is a field-keyed error.
    #[must_use]
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Self::Fields(fields) => Some(fields),
            Self::Message(_) => None,
        }
    }

    /// The message, if this is a message-only error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::Fields(_) => None,
        }
    }

    /// Returns true for field-keyed errors.
    #[must_use]
    pub fn is_fields(&self) -> bool {
        matches!(self, Self::Fields(_))
    }

    /// Consumes the error, returning the field mapping if there is one.
    pub fn into_fields(self) -> Option<FieldErrors> {
        match self {
            Self::Fields(fields) => Some(fields),
            Self::Message(_) => None,
        }
    }

    /// Renders the error the same way as [`Display`](fmt::Display).
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Fields(fields) => {
                for (i, (key, detail)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, "{key}={detail}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// DECODE ERRORS
// ============================================================================

/// The request payload could not be turned into the target type.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Reading the body failed or it exceeded the configured limit
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// The JSON body is malformed or does not fit the target
    #[error(transparent)]
    Json(serde_json::Error),

    /// Form values do not fit the target
    #[error(transparent)]
    Form(serde_json::Error),

    /// The multipart body is malformed or too large
    #[error(transparent)]
    Multipart(#[from] multer::Error),
}

// ============================================================================
// REGISTRATION ERRORS
// ============================================================================

/// A custom validator was rejected while building a binder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Validator name is empty
    #[error("validator name cannot be empty")]
    EmptyName,

    /// Validator name is one of the rule modifiers
    #[error("validator name '{0}' is reserved")]
    Reserved(String),

    /// Validator name contains characters the rule syntax uses
    #[error("validator name '{0}' contains whitespace or one of ',', '=', '|'")]
    Malformed(String),

    /// The same name was registered twice
    #[error("validator '{0}' is registered more than once")]
    Duplicate(String),
}

// ============================================================================
// ENGINE ERRORS
// ============================================================================

/// The rule engine could not evaluate a rule at all.
///
/// These indicate a mistake in the rule declarations, not bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No built-in or custom rule has this name
    #[error("undefined validation rule '{rule}' on field '{field}'")]
    UnknownRule {
        /// The rule tag
        rule: String,
        /// The internal namespace of the field
        field: String,
    },

    /// The rule needs a parameter but none was given
    #[error("rule '{rule}' on field '{field}' requires a parameter")]
    MissingParam {
        /// The rule tag
        rule: String,
        /// The internal namespace of the field
        field: String,
    },

    /// The parameter does not parse for this rule
    #[error("invalid parameter '{param}' for rule '{rule}' on field '{field}'")]
    InvalidParam {
        /// The rule tag
        rule: String,
        /// The offending parameter
        param: String,
        /// The internal namespace of the field
        field: String,
    },

    /// The rule cannot apply to this kind of value
    #[error("rule '{rule}' cannot be applied to {kind} field '{field}'")]
    NotApplicable {
        /// The rule tag
        rule: String,
        /// Kind of the value, e.g. "bool"
        kind: &'static str,
        /// The internal namespace of the field
        field: String,
    },

    /// `dive` used on a value that is not a sequence
    #[error("dive on non-sequence field '{field}'")]
    DiveOnNonSequence {
        /// The internal namespace of the field
        field: String,
    },
}

// ============================================================================
// PATH RESOLUTION ERRORS
// ============================================================================

/// An internal namespace does not fit the target's field metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The namespace had nothing after its root segment
    #[error("namespace has no field segments")]
    EmptyPath,

    /// The named field does not exist on the struct
    #[error("type '{type_name}' has no field '{field}'")]
    UnknownField {
        /// The struct being walked
        type_name: &'static str,
        /// The missing field identifier
        field: String,
    },

    /// A field segment was applied to something that is not a struct
    #[error("segment '{segment}' addresses a field of a non-struct value")]
    NotAStruct {
        /// The offending segment
        segment: String,
    },

    /// An index segment was applied to something that is not a sequence
    #[error("segment '{segment}' indexes a non-sequence value")]
    NotASequence {
        /// The offending segment
        segment: String,
    },
}

// ============================================================================
// BIND ERROR
// ============================================================================

/// Everything [`Binder::bind_and_validate`](crate::Binder::bind_and_validate) can fail with.
#[derive(Error, Debug)]
pub enum BindError {
    /// The payload could not be decoded; validation never ran
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The decoded target failed validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The target's field metadata disagrees with what the engine reported
    #[error("field path resolution failed: {0}")]
    Contract(#[from] ResolveError),
}

impl BindError {
    /// The validation error, if validation is what failed.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid(error) => Some(error),
            _ => None,
        }
    }
}
