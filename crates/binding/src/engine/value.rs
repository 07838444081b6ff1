//! Read-only views of field values
//!
//! The engine never sees concrete field types. [`Inspect`] turns a value
//! into a [`Value`], and derived structs expose their fields through
//! [`Validate::walk`].

use std::borrow::Cow;
use std::fmt;

use super::Walker;

/// A borrowed view of one field value.
pub enum Value<'a> {
    /// Text
    Str(&'a str),
    /// Signed integer
    Int(i128),
    /// Unsigned integer
    Uint(u128),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Elements of a sequence
    Seq(Vec<&'a dyn Inspect>),
    /// `None`
    Absent,
    /// A nested derived struct
    Struct(&'a dyn Validate),
}

impl Value<'_> {
    /// Human-readable kind, used in engine errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Uint(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Seq(_) => "sequence",
            Self::Absent => "absent",
            Self::Struct(_) => "struct",
        }
    }

    /// Whether the value equals its type's zero value.
    ///
    /// Structs are never zero; an absent option always is.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Int(n) => *n == 0,
            Self::Uint(n) => *n == 0,
            Self::Float(n) => *n == 0.0,
            Self::Bool(b) => !b,
            Self::Seq(items) => items.is_empty(),
            Self::Absent => true,
            Self::Struct(_) => false,
        }
    }

    /// Returns true for `None`.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<'a> Value<'a> {
    /// The text, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Str(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Uint(n) => f.debug_tuple("Uint").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Seq(items) => write!(f, "Seq(len={})", items.len()),
            Self::Absent => f.write_str("Absent"),
            Self::Struct(inner) => f.debug_tuple("Struct").field(&inner.type_name()).finish(),
        }
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// Values the rule engine can look at.
///
/// `Option` has an inherent `inspect` method that shadows this one; call
/// `Inspect::inspect(&option)` on options.
pub trait Inspect {
    /// A borrowed view of `self`.
    fn inspect(&self) -> Value<'_>;

    /// Whether `self` is an option.
    ///
    /// `required` and `omitempty` only look at presence for options, so
    /// `Some(0)` counts as given.
    fn is_optional(&self) -> bool {
        false
    }
}

/// Structs whose fields the rule engine walks.
///
/// Implemented by `#[derive(Validate)]`, which calls
/// [`Walker::field`] once per field with that field's rules.
pub trait Validate {
    /// Rust type name; the root segment of reported namespaces.
    fn type_name(&self) -> &'static str;

    /// Hands every field to the walker.
    fn walk(&self, walker: &mut Walker<'_>);
}

// ============================================================================
// INSPECT IMPLEMENTATIONS
// ============================================================================

impl Inspect for str {
    fn inspect(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl Inspect for String {
    fn inspect(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl Inspect for Cow<'_, str> {
    fn inspect(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl Inspect for bool {
    fn inspect(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

macro_rules! inspect_number {
    ($variant:ident, $wide:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> Value<'_> {
                    Value::$variant(<$wide>::from(*self))
                }
            }
        )+
    };
}

inspect_number!(Int, i128 => i8, i16, i32, i64, i128);
inspect_number!(Uint, u128 => u8, u16, u32, u64, u128);
inspect_number!(Float, f64 => f32, f64);

impl Inspect for isize {
    fn inspect(&self) -> Value<'_> {
        Value::Int(*self as i128)
    }
}

impl Inspect for usize {
    fn inspect(&self) -> Value<'_> {
        Value::Uint(*self as u128)
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> Value<'_> {
        match self {
            Some(value) => value.inspect(),
            None => Value::Absent,
        }
    }

    fn is_optional(&self) -> bool {
        true
    }
}

impl<T: Inspect> Inspect for [T] {
    fn inspect(&self) -> Value<'_> {
        Value::Seq(self.iter().map(|item| item as &dyn Inspect).collect())
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self) -> Value<'_> {
        self.as_slice().inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn inspect(&self) -> Value<'_> {
        (**self).inspect()
    }

    fn is_optional(&self) -> bool {
        (**self).is_optional()
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect(&self) -> Value<'_> {
        (**self).inspect()
    }

    fn is_optional(&self) -> bool {
        (**self).is_optional()
    }
}
