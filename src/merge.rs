use crate::value::{Items, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have an object for the same key, recurse.
/// Otherwise, `overlay`'s value wins. Keys keep their position in `base`.
pub fn deep_merge(mut base: Items, overlay: Items) -> Items {
    for (key, overlay_val) in overlay {
        match overlay_val {
            Value::Object(overlay_obj) => match base.get_mut(&key) {
                Some(Value::Object(base_obj)) => {
                    let merged = deep_merge(std::mem::take(base_obj), overlay_obj);
                    *base_obj = merged;
                }
                _ => {
                    base.insert(key, Value::Object(overlay_obj));
                }
            },
            overlay_val => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}
