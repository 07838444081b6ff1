//! Translation of engine namespaces into wire field keys
//!
//! The engine reports `Order.line_items[1].sku`: rooted at the Rust type
//! name, built from Rust identifiers. Callers know the same field as
//! `lineItems.1.sku` (or its form name). Resolution walks the target's
//! [`Shape`] in step with the namespace segments.

use crate::error::ResolveError;
use crate::shape::Shape;

/// Splits an engine namespace into segments, dropping the root.
///
/// ```rust
/// use nebula_binding::path::prepare_namespace;
///
/// assert_eq!(prepare_namespace("Root.Items[1].Name"), ["Items", "1", "Name"]);
/// assert!(prepare_namespace("Root").is_empty());
/// ```
pub fn prepare_namespace(raw: &str) -> Vec<String> {
    let Some((_, rest)) = raw.split_once('.') else {
        return Vec::new();
    };

    rest.replace('[', ".")
        .replace(']', "")
        .split('.')
        .map(str::to_string)
        .collect()
}

/// Resolves namespace segments against `shape`, yielding the dotted wire key.
///
/// Index segments pass through unchanged; field segments become the field's
/// form name when it has one, its serde name otherwise.
pub fn resolve_path<S: AsRef<str>>(shape: Shape, segments: &[S]) -> Result<String, ResolveError> {
    let Some((first, rest)) = segments.split_first() else {
        return Err(ResolveError::EmptyPath);
    };
    let segment = first.as_ref();
    let shape = shape.strip_optional();

    let (key, next) = if is_index(segment) {
        let Shape::Seq(element) = shape else {
            return Err(ResolveError::NotASequence {
                segment: segment.to_string(),
            });
        };
        (segment, element())
    } else {
        let Shape::Struct(fields) = shape else {
            return Err(ResolveError::NotAStruct {
                segment: segment.to_string(),
            });
        };
        let field = fields
            .field(segment)
            .ok_or_else(|| ResolveError::UnknownField {
                type_name: fields.name,
                field: segment.to_string(),
            })?;
        (field.external_name(), field.shape())
    };

    if rest.is_empty() {
        return Ok(key.to_string());
    }
    let tail = resolve_path(next, rest)?;
    Ok(format!("{key}.{tail}"))
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
