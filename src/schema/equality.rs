//! Structural equality for `enum`, `contains` and `uniqueItems`
//!
//! Numbers compare by numeric value, so `1` equals `1.0`. Object key
//! order never matters.

use serde_json::{Number, Value};

/// Returns true if `a` and `b` are structurally equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).map_or(false, |y| deep_equal(x, y)))
        }
        _ => false,
    }
}

/// Returns true if any entry of `candidates` deep-equals `value`.
pub fn contains_equal(candidates: &[Value], value: &Value) -> bool {
    candidates.iter().any(|candidate| deep_equal(candidate, value))
}

/// Returns true if no two elements of `values` are deep-equal.
pub fn all_unique(values: &[Value]) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(i, value)| !contains_equal(&values[i + 1..], value))
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    // Exact integer comparison first so large u64/i64 values don't collide in f64.
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
