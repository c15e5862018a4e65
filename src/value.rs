//! The data model shared by every container: ordered [`Items`] of [`Value`]s.
//!
//! Keys are strings. Integer keys are stored as their canonical decimal form
//! (`"0"`, `"12"`, `"-3"`), so a mapping whose keys run `"0".."n-1"` in order
//! is a *list* and converts to a JSON array. Everything else converts to an
//! object.

use std::cmp::Ordering;

pub use serde_json::Value;

/// An ordered key-value mapping. Insertion order is preserved.
pub type Items = serde_json::Map<String, Value>;

/// Parse a key as a canonical integer key (`"7"`, `"-2"`; not `"07"` or `"+7"`).
pub fn int_key(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if key == "-0" {
        return None;
    }
    key.parse().ok()
}

/// True if the keys are exactly `0..n-1` in order. Empty mappings are lists.
pub fn is_list(items: &Items) -> bool {
    items
        .keys()
        .enumerate()
        .all(|(i, key)| int_key(key) == Some(i as i64))
}

/// Build list items from a sequence of values.
pub fn list_items(values: impl IntoIterator<Item = Value>) -> Items {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

/// Convert items to a value: an array when the items are a list, else an object.
pub fn to_value(items: Items) -> Value {
    if is_list(&items) {
        Value::Array(items.into_iter().map(|(_, v)| v).collect())
    } else {
        Value::Object(items)
    }
}

/// Convert a value to items. Scalars become a one-item list.
///
/// Arrays get integer keys, objects are taken as-is, `null` becomes empty,
/// and any other scalar becomes a single-element list.
pub fn into_items(value: Value) -> Items {
    match value {
        Value::Object(map) => map,
        Value::Array(values) => list_items(values),
        Value::Null => Items::new(),
        scalar => list_items([scalar]),
    }
}

/// The next free integer key: one past the largest integer key, or 0.
pub fn next_index(items: &Items) -> i64 {
    items
        .keys()
        .filter_map(|k| int_key(k))
        .max()
        .map_or(0, |max| max + 1)
}

/// Strict identity of two mappings: same entries in the same order.
///
/// `Items` equality alone ignores order.
pub fn same_items(a: &Items, b: &Items) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Renumber integer keys from zero, keeping string keys and order.
pub fn reindex(items: Items) -> Items {
    let mut next = 0i64;
    items
        .into_iter()
        .map(|(key, value)| {
            if int_key(&key).is_some() {
                let key = next.to_string();
                next += 1;
                (key, value)
            } else {
                (key, value)
            }
        })
        .collect()
}

/// `array_merge` semantics: string keys in `overlay` overwrite, integer keys
/// from both sides are appended and renumbered.
pub fn array_merge(base: Items, overlay: Items) -> Items {
    let mut merged = reindex(base);
    let mut next = next_index(&merged);
    for (key, value) in overlay {
        if int_key(&key).is_some() {
            merged.insert(next.to_string(), value);
            next += 1;
        } else {
            merged.insert(key, value);
        }
    }
    merged
}

/// Truthiness: `null`, `false`, `0`, `0.0`, `""`, `"0"` and empty
/// containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The string form of a value when used as a key or compared as text.
pub fn key_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".into(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The value form of a key: integer keys become numbers.
pub fn key_value(key: &str) -> Value {
    match int_key(key) {
        Some(i) => Value::from(i),
        None => Value::String(key.to_string()),
    }
}

/// Type name used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "array",
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

pub(crate) fn numeric_str(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() || t.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse().ok()
}

fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(0.0);
    let y = b.as_f64().unwrap_or(0.0);
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

/// Total ordering used by sorts: `null < bool < number < string < array < object`.
///
/// Numbers compare numerically, numeric strings compare as numbers, other
/// strings compare bytewise. Containers compare by length, then element by
/// element.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => match (numeric_str(x), numeric_str(y)) {
            (Some(fx), Some(fy)) => fx.partial_cmp(&fy).unwrap_or(Ordering::Equal),
            _ => x.cmp(y),
        },
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|(l, r)| compare(l, r))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.values()
                .zip(y.values())
                .map(|(l, r)| compare(l, r))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Loose (`==`) equality: numeric strings equal numbers, booleans compare by
/// truthiness, `null` equals anything falsy.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, other) | (other, Value::Null) => !is_truthy(other),
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == is_truthy(other),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            numeric_str(s).is_some_and(|f| Some(f) == n.as_f64())
        }
        _ => a == b || compare(a, b).is_eq(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_integer_keys() {
        assert_eq!(int_key("0"), Some(0));
        assert_eq!(int_key("42"), Some(42));
        assert_eq!(int_key("-3"), Some(-3));
        assert_eq!(int_key("07"), None);
        assert_eq!(int_key("-0"), None);
        assert_eq!(int_key("1.5"), None);
        assert_eq!(int_key("app"), None);
    }

    #[test]
    fn list_detection() {
        assert!(is_list(&Items::new()));
        assert!(is_list(&list_items([json!(1), json!(2)])));
        let mut gap = Items::new();
        gap.insert("0".into(), json!(1));
        gap.insert("2".into(), json!(2));
        assert!(!is_list(&gap));
        assert!(!is_list(&into_items(json!({"a": 1}))));
    }

    #[test]
    fn to_value_picks_array_or_object() {
        assert_eq!(to_value(list_items([json!("x")])), json!(["x"]));
        assert_eq!(to_value(into_items(json!({"a": 1}))), json!({"a": 1}));
    }

    #[test]
    fn into_items_casts_scalars() {
        assert_eq!(into_items(json!(null)), Items::new());
        assert_eq!(to_value(into_items(json!("solo"))), json!(["solo"]));
    }

    #[test]
    fn array_merge_renumbers_integer_keys() {
        let base = into_items(json!({"a": 1, "5": "five"}));
        let overlay = into_items(json!({"a": 2, "9": "nine"}));
        let merged = array_merge(base, overlay);
        assert_eq!(
            Value::Object(merged),
            json!({"a": 2, "0": "five", "1": "nine"})
        );
    }

    #[test]
    fn same_items_is_order_sensitive() {
        let ab = into_items(json!({"a": 1, "b": 2}));
        let ba = into_items(json!({"b": 2, "a": 1}));
        assert_eq!(ab, ba);
        assert!(!same_items(&ab, &ba));
        assert!(same_items(&ab, &ab.clone()));
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!(-0.5), json!("a"), json!([0])] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn ordering_across_types() {
        assert!(compare(&json!(null), &json!(false)).is_lt());
        assert!(compare(&json!(9), &json!("a")).is_lt());
        assert!(compare(&json!(2), &json!(10)).is_lt());
        assert!(compare(&json!(2.5), &json!(2)).is_gt());
        assert!(compare(&json!("10"), &json!("9")).is_gt());
        assert!(compare(&json!("apple"), &json!("banana")).is_lt());
        assert!(compare(&json!([1, 2]), &json!([3])).is_gt());
    }

    #[test]
    fn loose_equality() {
        assert!(loose_eq(&json!(100), &json!("100")));
        assert!(loose_eq(&json!(null), &json!(0)));
        assert!(loose_eq(&json!(true), &json!("yes")));
        assert!(!loose_eq(&json!(100), &json!("abc")));
        assert!(loose_eq(&json!(1), &json!(1.0)));
    }

    #[test]
    fn key_strings() {
        assert_eq!(key_string(&json!(true)), "1");
        assert_eq!(key_string(&json!(12)), "12");
        assert_eq!(key_string(&json!("x")), "x");
        assert_eq!(key_value("3"), json!(3));
        assert_eq!(key_value("x"), json!("x"));
    }
}
