//! Field metadata of bindable types
//!
//! A [`Shape`] tells the path resolver and the form decoder how a type is
//! laid out: which fields a struct has, what each is called on the wire, and
//! what lives inside sequences and options. Shapes of derived structs are
//! statics built by `#[derive(Validate)]`; nothing is computed per request.

use std::borrow::Cow;
use std::fmt;

/// Kind of a leaf value, used to coerce form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Text, kept as-is
    Str,
    /// Signed integer
    Int,
    /// Unsigned integer
    Uint,
    /// Floating point number
    Float,
    /// Boolean
    Bool,
}

/// Layout of a bindable type.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A leaf value
    Scalar(ScalarKind),
    /// `Option<T>`; the function yields the shape of `T`
    Optional(fn() -> Shape),
    /// `Vec<T>` and friends; the function yields the element shape
    Seq(fn() -> Shape),
    /// A derived struct
    Struct(&'static StructShape),
    /// A value with no known layout (fields marked `skip`)
    Opaque,
}

impl Shape {
    /// Shape of a field excluded from binding metadata.
    pub fn opaque() -> Self {
        Self::Opaque
    }

    /// Strips any number of `Optional` layers.
    #[must_use]
    pub fn strip_optional(self) -> Self {
        let mut shape = self;
        while let Self::Optional(inner) = shape {
            shape = inner();
        }
        shape
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Optional(inner) => f.debug_tuple("Optional").field(&inner()).finish(),
            Self::Seq(inner) => f.debug_tuple("Seq").field(&inner()).finish(),
            Self::Struct(shape) => f.debug_tuple("Struct").field(&shape.name).finish(),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

/// Fields of a derived struct.
#[derive(Debug)]
pub struct StructShape {
    /// Rust type name, also the root segment of engine namespaces
    pub name: &'static str,
    /// Fields in declaration order
    pub fields: &'static [FieldShape],
}

impl StructShape {
    pub const fn new(name: &'static str, fields: &'static [FieldShape]) -> Self {
        Self { name, fields }
    }

    /// Looks up a field by its Rust identifier.
    #[must_use]
    pub fn field(&self, ident: &str) -> Option<&'static FieldShape> {
        self.fields.iter().find(|field| field.ident == ident)
    }

    /// Looks up a field by the name forms and query strings use.
    #[must_use]
    pub fn field_by_external(&self, name: &str) -> Option<&'static FieldShape> {
        self.fields.iter().find(|field| field.external_name() == name)
    }
}

/// One field of a derived struct.
pub struct FieldShape {
    /// Rust identifier
    pub ident: &'static str,
    /// Serde name, used in JSON bodies
    pub primary: &'static str,
    /// Form/query name, if it differs from the serde name
    pub alternate: Option<&'static str>,
    shape: fn() -> Shape,
}

impl FieldShape {
    pub const fn new(
        ident: &'static str,
        primary: &'static str,
        alternate: Option<&'static str>,
        shape: fn() -> Shape,
    ) -> Self {
        Self {
            ident,
            primary,
            alternate,
            shape,
        }
    }

    /// Name reported to API callers: the form name wins over the serde name.
    #[must_use]
    pub fn external_name(&self) -> &'static str {
        self.alternate.unwrap_or(self.primary)
    }

    /// Layout of the field's type.
    #[must_use]
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("ident", &self.ident)
            .field("primary", &self.primary)
            .field("alternate", &self.alternate)
            .finish()
    }
}

// ============================================================================
// DESCRIBE
// ============================================================================

/// Types whose layout is known to the binder.
///
/// Implemented by `#[derive(Validate)]` for structs and here for the
/// standard leaf and container types. A custom leaf type only needs
/// `Shape::Scalar(ScalarKind::Str)` or similar.
pub trait Describe {
    /// Layout of `Self`.
    fn shape() -> Shape;
}

macro_rules! describe_scalar {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> Shape {
                    Shape::Scalar(ScalarKind::$kind)
                }
            }
        )+
    };
}

describe_scalar!(Str => String, str, Cow<'_, str>);
describe_scalar!(Int => i8, i16, i32, i64, i128, isize);
describe_scalar!(Uint => u8, u16, u32, u64, u128, usize);
describe_scalar!(Float => f32, f64);
describe_scalar!(Bool => bool);

impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(T::shape)
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(T::shape)
    }
}

impl<T: Describe> Describe for [T] {
    fn shape() -> Shape {
        Shape::Seq(T::shape)
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: [FieldShape; 2] = [
        FieldShape::new("name", "name", None, <String as Describe>::shape),
        FieldShape::new("page_size", "pageSize", Some("per_page"), <u32 as Describe>::shape),
    ];
    static PAGE: StructShape = StructShape::new("Page", &FIELDS);

    #[test]
    fn external_name_prefers_form_name() {
        assert_eq!(PAGE.field("name").unwrap().external_name(), "name");
        assert_eq!(PAGE.field("page_size").unwrap().external_name(), "per_page");
    }

    #[test]
    fn lookup_by_external_name() {
        assert_eq!(PAGE.field_by_external("per_page").unwrap().ident, "page_size");
        assert!(PAGE.field_by_external("pageSize").is_none());
    }

    #[test]
    fn strip_optional_removes_nested_options() {
        let shape = <Option<Option<Vec<i64>>> as Describe>::shape().strip_optional();
        assert!(matches!(shape, Shape::Seq(_)));
    }

    #[test]
    fn containers_describe_their_elements() {
        match <Vec<Box<bool>> as Describe>::shape() {
            Shape::Seq(inner) => assert!(matches!(inner(), Shape::Scalar(ScalarKind::Bool))),
            other => panic!("unexpected shape: {other:?}"),
        }
    }
}
