//! Flatten nested items into dotted key-value pairs, and expand them back.
//!
//! `{"database": {"url": "pg://"}}` ⇄ `[("database.url", "pg://")]`
//!
//! Arrays are leaves: they are emitted whole rather than as `list.0`,
//! `list.1`. Empty objects are emitted as leaves too, so no key disappears.

use crate::path;
use crate::value::{Items, Value};

/// Flatten items into dotted `(key, value)` pairs in iteration order.
pub fn flatten(items: &Items) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(items, "", &mut out);
    out
}

fn flatten_into(items: &Items, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in items {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(map) if !map.is_empty() => flatten_into(map, &dotted, out),
            leaf => out.push((dotted, leaf.clone())),
        }
    }
}

/// Expand dotted pairs into nested items. Later pairs win on conflict.
pub fn expand(pairs: impl IntoIterator<Item = (String, Value)>) -> Items {
    let mut items = Items::new();
    for (dotted_key, value) in pairs {
        path::assign(&mut items, &dotted_key, value);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::app_items;
    use serde_json::json;

    #[test]
    fn flat_items_pass_through() {
        let items = crate::value::into_items(json!({"host": "localhost", "port": 8080}));
        let pairs = flatten(&items);
        assert_eq!(
            pairs,
            vec![("host".into(), json!("localhost")), ("port".into(), json!(8080))]
        );
    }

    #[test]
    fn nested_keys_are_dotted() {
        let pairs = flatten(&app_items());
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "app.files",
                "app.views.home",
                "app.views.contact",
                "app.controllers.login",
                "app.controllers.dashboard",
            ]
        );
    }

    #[test]
    fn arrays_and_empty_objects_are_leaves() {
        let items = crate::value::into_items(json!({"paths": ["a", "b"], "empty": {}}));
        let pairs = flatten(&items);
        assert_eq!(pairs[0], ("paths".into(), json!(["a", "b"])));
        assert_eq!(pairs[1], ("empty".into(), json!({})));
    }

    #[test]
    fn expand_inverts_flatten() {
        let items = app_items();
        assert_eq!(expand(flatten(&items)), items);
    }

    #[test]
    fn expand_later_pair_wins() {
        let items = expand(vec![
            ("db.port".to_string(), json!(1)),
            ("db.port".to_string(), json!(2)),
        ]);
        assert_eq!(items["db"]["port"], json!(2));
    }
}
