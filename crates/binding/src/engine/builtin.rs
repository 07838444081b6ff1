//! Built-in rules
//!
//! Sizes are compared by character count for strings, element count for
//! sequences and by value for numbers.

use std::cmp::Ordering;
use std::sync::LazyLock;

use super::{RuleInput, Value};
use crate::error::EngineError;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

const BUILTIN: &[&str] = &[
    "required", "min", "max", "len", "eq", "ne", "gt", "gte", "lt", "lte", "oneof", "email", "url",
];

pub(super) fn is_builtin(name: &str) -> bool {
    BUILTIN.contains(&name)
}

pub(super) fn check(tag: &str, input: &RuleInput<'_>) -> Result<bool, EngineError> {
    if !is_builtin(tag) {
        return Err(EngineError::UnknownRule {
            rule: tag.to_string(),
            field: input.namespace.to_string(),
        });
    }

    if tag == "required" {
        return Ok(input.is_given());
    }
    if input.value.is_absent() {
        return Ok(true);
    }

    match tag {
        "min" | "gte" => Ok(compare(tag, input)?.is_some_and(Ordering::is_ge)),
        "max" | "lte" => Ok(compare(tag, input)?.is_some_and(Ordering::is_le)),
        "gt" => Ok(compare(tag, input)?.is_some_and(Ordering::is_gt)),
        "lt" => Ok(compare(tag, input)?.is_some_and(Ordering::is_lt)),
        "len" => Ok(compare(tag, input)?.is_some_and(Ordering::is_eq)),
        "eq" => equals(tag, input),
        "ne" => equals(tag, input).map(|equal| !equal),
        "oneof" => one_of(tag, input),
        "email" => Ok(EMAIL_REGEX.is_match(text(tag, input)?)),
        "url" => Ok(url::Url::parse(text(tag, input)?).is_ok()),
        _ => unreachable!("every built-in rule is matched"),
    }
}

/// A value reduced to something comparable with a numeric parameter.
enum Measure {
    Int(i128),
    Float(f64),
}

fn measure(tag: &str, input: &RuleInput<'_>) -> Result<Measure, EngineError> {
    let measured = match input.value {
        Value::Str(s) => Measure::Int(s.chars().count() as i128),
        Value::Seq(items) => Measure::Int(items.len() as i128),
        Value::Int(n) => Measure::Int(*n),
        Value::Uint(n) => match i128::try_from(*n) {
            Ok(n) => Measure::Int(n),
            Err(_) => Measure::Float(*n as f64),
        },
        Value::Float(n) => Measure::Float(*n),
        other => return Err(not_applicable(tag, other, input)),
    };
    Ok(measured)
}

fn compare(tag: &str, input: &RuleInput<'_>) -> Result<Option<Ordering>, EngineError> {
    let param = require_param(tag, input)?;
    let measured = measure(tag, input)?;
    compare_with(&measured, param, tag, input)
}

fn compare_with(
    measured: &Measure,
    param: &str,
    tag: &str,
    input: &RuleInput<'_>,
) -> Result<Option<Ordering>, EngineError> {
    let param = param.trim();
    if let Measure::Int(n) = measured
        && let Ok(p) = param.parse::<i128>()
    {
        return Ok(Some(n.cmp(&p)));
    }

    let p = param
        .parse::<f64>()
        .map_err(|_| invalid_param(tag, param, input))?;
    let n = match measured {
        Measure::Int(n) => *n as f64,
        Measure::Float(n) => *n,
    };
    Ok(n.partial_cmp(&p))
}

fn equals(tag: &str, input: &RuleInput<'_>) -> Result<bool, EngineError> {
    let param = require_param(tag, input)?;
    match input.value {
        Value::Str(s) => Ok(*s == param),
        Value::Bool(b) => param
            .parse::<bool>()
            .map(|p| p == *b)
            .map_err(|_| invalid_param(tag, param, input)),
        _ => {
            let measured = measure(tag, input)?;
            Ok(compare_with(&measured, param, tag, input)?.is_some_and(Ordering::is_eq))
        }
    }
}

fn one_of(tag: &str, input: &RuleInput<'_>) -> Result<bool, EngineError> {
    let param = require_param(tag, input)?;
    let mut options = param.split_whitespace();

    match input.value {
        Value::Str(s) => Ok(options.any(|option| option == *s)),
        Value::Int(_) | Value::Uint(_) | Value::Float(_) => {
            let measured = measure(tag, input)?;
            for option in options {
                if compare_with(&measured, option, tag, input)?.is_some_and(Ordering::is_eq) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        other => Err(not_applicable(tag, other, input)),
    }
}

fn text<'a>(tag: &str, input: &RuleInput<'a>) -> Result<&'a str, EngineError> {
    input
        .value
        .as_str()
        .ok_or_else(|| not_applicable(tag, input.value, input))
}

fn require_param<'a>(tag: &str, input: &RuleInput<'a>) -> Result<&'a str, EngineError> {
    input.param.ok_or_else(|| EngineError::MissingParam {
        rule: tag.to_string(),
        field: input.namespace.to_string(),
    })
}

fn not_applicable(tag: &str, value: &Value<'_>, input: &RuleInput<'_>) -> EngineError {
    EngineError::NotApplicable {
        rule: tag.to_string(),
        kind: value.kind(),
        field: input.namespace.to_string(),
    }
}

fn invalid_param(tag: &str, param: &str, input: &RuleInput<'_>) -> EngineError {
    EngineError::InvalidParam {
        rule: tag.to_string(),
        param: param.to_string(),
        field: input.namespace.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Inspect;
    use rstest::rstest;

    fn run<V: Inspect + ?Sized>(tag: &str, param: Option<&str>, value: &V) -> Result<bool, EngineError> {
        let optional = value.is_optional();
        let value = value.inspect();
        let input = RuleInput {
            field: "field",
            namespace: "Test.field",
            value: &value,
            optional,
            param,
        };
        check(tag, &input)
    }

    #[rstest]
    #[case("required", None, "x", true)]
    #[case("required", None, "", false)]
    #[case("min", Some("3"), "abc", true)]
    #[case("min", Some("3"), "ab", false)]
    #[case("max", Some("2"), "héé", false)]
    #[case("len", Some("3"), "héé", true)]
    #[case("eq", Some("yes"), "yes", true)]
    #[case("ne", Some("yes"), "no", true)]
    #[case("oneof", Some("red green"), "green", true)]
    #[case("oneof", Some("red green"), "blue", false)]
    #[case("email", None, "user@example.com", true)]
    #[case("email", None, "not-an-email", false)]
    #[case("url", None, "https://example.com/a?b=c", true)]
    #[case("url", None, "example", false)]
    fn string_rules(#[case] tag: &str, #[case] param: Option<&str>, #[case] value: &str, #[case] expected: bool) {
        assert_eq!(run(tag, param, value), Ok(expected));
    }

    #[rstest]
    #[case("min", "18", 18_i64, true)]
    #[case("gt", "18", 18_i64, false)]
    #[case("lt", "0", -1_i64, true)]
    #[case("lte", "2.5", 2_i64, true)]
    #[case("eq", "7", 7_i64, true)]
    #[case("oneof", "1 2 3", 4_i64, false)]
    fn numeric_rules(#[case] tag: &str, #[case] param: &str, #[case] value: i64, #[case] expected: bool) {
        assert_eq!(run(tag, Some(param), &value), Ok(expected));
    }

    #[test]
    fn float_and_sequence_sizes() {
        assert_eq!(run("gte", Some("0.5"), &0.75_f64), Ok(true));
        assert_eq!(run("max", Some("2"), &vec![1, 2, 3]), Ok(false));
        assert_eq!(run("eq", Some("true"), &true), Ok(true));
    }

    #[test]
    fn absent_values_only_fail_required() {
        let absent: Option<String> = None;
        assert_eq!(run("required", None, &absent), Ok(false));
        assert_eq!(run("min", Some("3"), &absent), Ok(true));
        assert_eq!(run("email", None, &absent), Ok(true));
    }

    #[test]
    fn zero_numbers_fail_required() {
        assert_eq!(run("required", None, &0_u32), Ok(false));
        assert_eq!(run("required", None, &1_u32), Ok(true));
    }

    #[test]
    fn present_options_pass_required_even_when_zero() {
        assert_eq!(run("required", None, &Some(0_u32)), Ok(true));
        assert_eq!(run("required", None, &Some(String::new())), Ok(true));
        assert_eq!(run("required", None, &Some(false)), Ok(true));
        assert_eq!(run("required", None, &Option::<u32>::None), Ok(false));
    }

    #[test]
    fn faults() {
        assert!(matches!(run("prime", None, "7"), Err(EngineError::UnknownRule { .. })));
        assert!(matches!(run("min", None, "7"), Err(EngineError::MissingParam { .. })));
        assert!(matches!(
            run("min", Some("three"), "7"),
            Err(EngineError::InvalidParam { .. })
        ));
        assert_eq!(
            run("email", None, &5_u8),
            Err(EngineError::NotApplicable {
                rule: "email".into(),
                kind: "unsigned integer",
                field: "Test.field".into(),
            })
        );
    }
}
