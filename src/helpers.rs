//! Small free functions for building items from literals.

use crate::collection::Collection;
use crate::env::coerce_env_value;
use crate::value::{Items, Value};

pub fn collect(items: Items) -> Collection {
    Collection::new(items)
}

/// Split `text` on `delimiter` after collapsing runs of whitespace to one
/// space.
pub fn words(text: &str, delimiter: &str) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.split(delimiter).map(str::to_string).collect()
}

fn integer(text: &str) -> Option<i64> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(i);
    }
    let numeric = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !numeric {
        return None;
    }
    text.parse::<f64>().ok().map(|f| f.trunc() as i64)
}

/// Parse `"a:1, b:two"` into `{"a": 1, "b": "two"}`.
///
/// Numeric values become integers, truncating any fraction. Entries without
/// a `:` are skipped.
pub fn tuples(encoded: &str) -> Items {
    let mut items = Items::new();
    for tuple in words(encoded, ",") {
        let Some((key, value)) = tuple.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let value = match integer(value) {
            Some(i) => Value::from(i),
            None => Value::from(value),
        };
        items.insert(key.trim().to_string(), value);
    }
    items
}

/// Read a process environment variable, coercing literals such as `true` or
/// `(null)`.
pub fn env(key: &str, default: Value) -> Value {
    match std::env::var(key) {
        Ok(raw) => coerce_env_value(&raw),
        Err(_) => default,
    }
}

/// `value` unless it is `null`, otherwise the result of `default`.
pub fn value_or(value: Value, default: impl FnOnce() -> Value) -> Value {
    if value.is_null() { default() } else { value }
}
