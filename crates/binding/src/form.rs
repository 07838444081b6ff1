//! Form and query values to a JSON tree
//!
//! Form data arrives as flat `(key, value)` pairs. Keys are dotted paths of
//! wire names and indexes (`address.city`, `items.0.sku`, `items[0].sku`);
//! repeated keys fill sequences. The target's [`Shape`] decides where each
//! value goes and how its text is coerced. Fields no pair reached are filled
//! with their zero value, then the tree is handed to serde.

use serde_json::{Map, Number, Value};

use crate::shape::{ScalarKind, Shape};

/// Highest sequence index a form key may address.
const MAX_INDEX: usize = 1024;

/// Builds a JSON object from form pairs. Earlier pairs win for scalars.
pub(crate) fn build(shape: Shape, pairs: &[(String, String)]) -> Value {
    let mut root = Value::Object(Map::new());

    for (key, raw) in pairs {
        let normalized = key.replace('[', ".").replace(']', "");
        let segments: Vec<&str> = normalized.split('.').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }
        place(&mut root, shape, &segments, raw);
    }

    fill_zeroes(&mut root, shape);
    root
}

fn place(slot: &mut Value, shape: Shape, segments: &[&str], raw: &str) {
    match shape.strip_optional() {
        Shape::Scalar(kind) => {
            if segments.is_empty() && slot.is_null() {
                *slot = coerce(kind, raw);
            }
        }
        Shape::Seq(element) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            let Value::Array(items) = slot else {
                return;
            };

            match segments.split_first() {
                None => {
                    let mut item = Value::Null;
                    place(&mut item, element(), &[], raw);
                    if !item.is_null() {
                        items.push(item);
                    }
                }
                Some((index, rest)) => {
                    let Ok(index) = index.parse::<usize>() else {
                        tracing::trace!(segment = *index, "ignoring non-index segment on sequence");
                        return;
                    };
                    if index >= MAX_INDEX {
                        tracing::trace!(index, "ignoring out-of-range form index");
                        return;
                    }
                    if items.len() <= index {
                        items.resize(index + 1, Value::Null);
                    }
                    place(&mut items[index], element(), rest, raw);
                }
            }
        }
        Shape::Struct(fields) => {
            let Some((name, rest)) = segments.split_first() else {
                return;
            };
            let Some(field) = fields.field_by_external(name) else {
                tracing::trace!(key = *name, type_name = fields.name, "ignoring unknown form key");
                return;
            };
            let field_shape = field.shape();
            if matches!(field_shape.strip_optional(), Shape::Opaque) {
                tracing::trace!(key = *name, type_name = fields.name, "ignoring form key of skipped field");
                return;
            }

            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };

            match map.get_mut(field.primary) {
                Some(entry) => place(entry, field_shape, rest, raw),
                None => {
                    let mut entry = Value::Null;
                    place(&mut entry, field_shape, rest, raw);
                    if !entry.is_null() {
                        map.insert(field.primary.to_string(), entry);
                    }
                }
            }
        }
        Shape::Opaque | Shape::Optional(_) => {}
    }
}

/// Gives every struct field no pair reached its zero value.
///
/// Options and skipped fields stay missing and are left to serde.
fn fill_zeroes(slot: &mut Value, shape: Shape) {
    match shape.strip_optional() {
        Shape::Struct(fields) => {
            let Value::Object(map) = slot else {
                return;
            };
            for field in fields.fields {
                let field_shape = field.shape();
                if !map.contains_key(field.primary)
                    && let Some(zero) = zero_value(field_shape)
                {
                    map.insert(field.primary.to_string(), zero);
                }
                if let Some(entry) = map.get_mut(field.primary) {
                    fill_zeroes(entry, field_shape);
                }
            }
        }
        Shape::Seq(element) => {
            if let Value::Array(items) = slot {
                for item in items {
                    fill_zeroes(item, element());
                }
            }
        }
        Shape::Scalar(_) | Shape::Opaque | Shape::Optional(_) => {}
    }
}

fn zero_value(shape: Shape) -> Option<Value> {
    match shape {
        Shape::Scalar(ScalarKind::Str) => Some(Value::String(String::new())),
        Shape::Scalar(ScalarKind::Bool) => Some(Value::Bool(false)),
        Shape::Scalar(_) => Some(Value::from(0)),
        Shape::Seq(_) => Some(Value::Array(Vec::new())),
        Shape::Struct(_) => Some(Value::Object(Map::new())),
        Shape::Optional(_) | Shape::Opaque => None,
    }
}

/// Converts form text to the JSON value serde expects for `kind`.
///
/// Text that does not parse is kept as a string so serde reports the
/// mismatch.
fn coerce(kind: ScalarKind, raw: &str) -> Value {
    if kind != ScalarKind::Str && raw.is_empty() {
        return Value::Null;
    }

    let parsed = match kind {
        ScalarKind::Str => return Value::String(raw.to_string()),
        ScalarKind::Int => raw.parse::<i64>().ok().map(Value::from),
        ScalarKind::Uint => raw.parse::<u64>().ok().map(Value::from),
        ScalarKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ScalarKind::Bool => parse_bool(raw).map(Value::Bool),
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Describe, FieldShape, StructShape};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    struct Address;

    impl Describe for Address {
        fn shape() -> Shape {
            static FIELDS: [FieldShape; 1] = [FieldShape::new("city", "city", None, <String as Describe>::shape)];
            static SHAPE: StructShape = StructShape::new("Address", &FIELDS);
            Shape::Struct(&SHAPE)
        }
    }

    struct Signup;

    impl Describe for Signup {
        fn shape() -> Shape {
            static FIELDS: [FieldShape; 6] = [
                FieldShape::new("user_name", "userName", Some("user"), <String as Describe>::shape),
                FieldShape::new("age", "age", None, <Option<u8> as Describe>::shape),
                FieldShape::new("subscribe", "subscribe", None, <bool as Describe>::shape),
                FieldShape::new("tags", "tags", None, <Vec<String> as Describe>::shape),
                FieldShape::new("address", "address", None, <Address as Describe>::shape),
                FieldShape::new("previous", "previous", None, <Vec<Address> as Describe>::shape),
            ];
            static SHAPE: StructShape = StructShape::new("Signup", &FIELDS);
            Shape::Struct(&SHAPE)
        }
    }

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn builds_nested_tree() {
        let tree = build(
            Signup::shape(),
            &pairs(&[
                ("user", "ada"),
                ("age", "36"),
                ("subscribe", "on"),
                ("tags", "a"),
                ("tags", "b"),
                ("address.city", "London"),
                ("previous[1].city", "Paris"),
                ("previous.0.city", "Rome"),
            ]),
        );

        assert_eq!(
            tree,
            json!({
                "userName": "ada",
                "age": 36,
                "subscribe": true,
                "tags": ["a", "b"],
                "address": {"city": "London"},
                "previous": [{"city": "Rome"}, {"city": "Paris"}],
            })
        );
    }

    #[test]
    fn first_value_wins_and_unknown_keys_are_ignored() {
        let tree = build(
            Signup::shape(),
            &pairs(&[("user", "body"), ("user", "query"), ("userName", "serde"), ("extra", "1")]),
        );
        assert_eq!(
            tree,
            json!({
                "userName": "body",
                "subscribe": false,
                "tags": [],
                "address": {"city": ""},
                "previous": [],
            })
        );
    }

    #[test]
    fn empty_optional_number_stays_missing() {
        let tree = build(Signup::shape(), &pairs(&[("age", ""), ("age", "7")]));
        assert_eq!(tree["age"], json!(7));

        let tree = build(Signup::shape(), &pairs(&[("age", "")]));
        assert!(tree.get("age").is_none());
    }

    #[test]
    fn missing_fields_get_zero_values() {
        let tree = build(Signup::shape(), &pairs(&[("previous.1.city", "Paris")]));
        assert_eq!(
            tree,
            json!({
                "userName": "",
                "subscribe": false,
                "tags": [],
                "address": {"city": ""},
                "previous": [null, {"city": "Paris"}],
            })
        );
    }

    struct Comment;

    impl Describe for Comment {
        fn shape() -> Shape {
            static FIELDS: [FieldShape; 3] = [
                FieldShape::new("body", "body", None, <String as Describe>::shape),
                FieldShape::new("note", "note", None, Shape::opaque),
                FieldShape::new("address", "address", None, <Address as Describe>::shape),
            ];
            static SHAPE: StructShape = StructShape::new("Comment", &FIELDS);
            Shape::Struct(&SHAPE)
        }
    }

    #[test]
    fn keys_that_cannot_be_placed_leave_nothing_behind() {
        let tree = build(
            Comment::shape(),
            &pairs(&[("body", "hi"), ("note", "internal"), ("address", "x"), ("address.city", "Oslo")]),
        );
        assert_eq!(tree, json!({"body": "hi", "address": {"city": "Oslo"}}));

        let tree = build(Comment::shape(), &pairs(&[("note", "internal"), ("address", "x")]));
        assert_eq!(tree, json!({"body": "", "address": {"city": ""}}));
    }

    #[rstest]
    #[case(ScalarKind::Bool, "TRUE", json!(true))]
    #[case(ScalarKind::Bool, "0", json!(false))]
    #[case(ScalarKind::Bool, "maybe", json!("maybe"))]
    #[case(ScalarKind::Int, "-4", json!(-4))]
    #[case(ScalarKind::Uint, "-4", json!("-4"))]
    #[case(ScalarKind::Float, "2.5", json!(2.5))]
    #[case(ScalarKind::Str, "", json!(""))]
    fn coerces_scalars(#[case] kind: ScalarKind, #[case] raw: &str, #[case] expected: Value) {
        assert_eq!(coerce(kind, raw), expected);
    }
}
