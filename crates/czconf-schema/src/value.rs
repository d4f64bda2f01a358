//! JSON value classification and equality.
//!
//! Instances are plain [`serde_json::Value`]s; this module maps them onto
//! the schema type vocabulary and implements the equality used by `enum`
//! and `const`.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::node::JsonType;

/// Classify an instance.
///
/// Numbers with no fractional part classify as [`JsonType::Integer`], all
/// other numbers as [`JsonType::Number`]. `100` and `100.0` are both
/// integers; `100.5` is not.
pub fn type_of(value: &Value) -> JsonType {
    match value {
        Value::Null => JsonType::Null,
        Value::Bool(_) => JsonType::Boolean,
        Value::Number(n) if is_integral(n) => JsonType::Integer,
        Value::Number(_) => JsonType::Number,
        Value::String(_) => JsonType::String,
        Value::Array(_) => JsonType::Array,
        Value::Object(_) => JsonType::Object,
    }
}

/// Name of an instance's type, for diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    type_of(value).as_str()
}

/// Whether a number has no fractional component.
pub fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// JSON equality: numbers compare by value, containers compare
/// element-wise, and a boolean never equals a number.
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| json_equal(v, other)))
        }
        (a, b) => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    compare_numbers(a, b) == Some(Ordering::Equal)
}

/// Order two numbers. Integers held exactly compare exactly, so bounds
/// beyond 2^53 are not rounded; anything else compares as `f64`.
/// `None` only when a value is not comparable (NaN).
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (exact_integer(a), exact_integer(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn exact_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}
