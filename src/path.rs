//! Dot-path resolution over nested [`Items`].
//!
//! A path like `"db.models.home"` addresses one level per segment. Object
//! levels are addressed by key, array levels by index. In [`resolve`], a `*`
//! segment applies the rest of the path to every element of the current
//! level and collects the results.

use crate::value::{Items, Value, list_items, to_value};

enum Target<'a> {
    Root(&'a Items),
    Node(&'a Value),
}

impl<'a> Target<'a> {
    fn child(&self, segment: &str) -> Option<&'a Value> {
        match self {
            Target::Root(items) => items.get(segment),
            Target::Node(value) => step(value, segment),
        }
    }

    /// All elements at this level, or `None` if this is not a container.
    fn children(&self) -> Option<Vec<&'a Value>> {
        match self {
            Target::Root(items) => Some(items.values().collect()),
            Target::Node(Value::Object(map)) => Some(map.values().collect()),
            Target::Node(Value::Array(list)) => Some(list.iter().collect()),
            Target::Node(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Target::Root(items) => to_value((*items).clone()),
            Target::Node(value) => (*value).clone(),
        }
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(list) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| list.get_mut(i)),
        _ => None,
    }
}

fn resolve_segments(target: Target<'_>, segments: &[&str]) -> Option<Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(target.to_value());
    };

    if *first == "*" {
        let results: Vec<Value> = target
            .children()?
            .into_iter()
            .map(|child| resolve_segments(Target::Node(child), rest).unwrap_or(Value::Null))
            .collect();
        if rest.contains(&"*") {
            return Some(Value::Array(collapse(results)));
        }
        return Some(Value::Array(results));
    }

    let child = target.child(first)?;
    resolve_segments(Target::Node(child), rest)
}

/// Merge a sequence of containers into one flat sequence. Scalars are dropped.
pub fn collapse(values: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::new();
    for value in values {
        match value {
            Value::Array(list) => out.extend(list),
            Value::Object(map) => out.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
    out
}

/// Resolve a dot-path, returning `default` if any segment is missing.
///
/// An empty path or `"*"` returns the whole mapping.
pub fn resolve(items: &Items, path: &str, default: Value) -> Value {
    if path.is_empty() || path == "*" {
        return to_value(items.clone());
    }
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(Target::Root(items), &segments).unwrap_or(default)
}

/// Resolve a dot-path inside a single value. An empty path returns the value.
pub fn resolve_value(value: &Value, path: &str, default: Value) -> Value {
    if path.is_empty() {
        return value.clone();
    }
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(Target::Node(value), &segments).unwrap_or(default)
}

/// Borrow the value at a dot-path. Wildcards are treated as literal keys.
pub fn lookup<'a>(items: &'a Items, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = items.get(first)?;
    for segment in segments {
        current = step(current, segment)?;
    }
    Some(current)
}

/// True if the full path names a present key. A present `null` counts.
pub fn exists(items: &Items, path: &str) -> bool {
    !path.is_empty() && lookup(items, path).is_some()
}

/// The mapping held in `slot`. Arrays become key-indexed mappings and
/// scalars are replaced by an empty one.
fn ensure_object(slot: &mut Value) -> &mut Items {
    match *slot {
        Value::Object(ref mut map) => map,
        _ => {
            let items = match std::mem::take(slot) {
                Value::Array(list) => list_items(list),
                _ => Items::new(),
            };
            *slot = Value::Object(items);
            ensure_object(slot)
        }
    }
}

/// The slot for `segment` inside `slot`, creating it (and converting `slot`
/// into a container) as needed.
fn child_slot<'a>(slot: &'a mut Value, segment: &str) -> &'a mut Value {
    let array_index = match &*slot {
        Value::Array(list) => segment.parse::<usize>().ok().filter(|i| *i <= list.len()),
        _ => None,
    };
    match (slot, array_index) {
        (Value::Array(list), Some(i)) => {
            if i == list.len() {
                list.push(Value::Null);
            }
            &mut list[i]
        }
        (slot, _) => ensure_object(slot)
            .entry(segment.to_string())
            .or_insert(Value::Null),
    }
}

/// Assign `value` at a dot-path, creating intermediate levels as needed.
///
/// Intermediate scalars are replaced by objects. An empty path replaces the
/// whole mapping.
pub fn assign(items: &mut Items, path: &str, value: Value) {
    if path.is_empty() {
        *items = crate::value::into_items(value);
        return;
    }
    let mut root = Value::Object(std::mem::take(items));
    let mut slot = &mut root;
    for segment in path.split('.') {
        slot = child_slot(slot, segment);
    }
    *slot = value;
    *items = crate::value::into_items(root);
}

/// Remove the value at a dot-path. Missing intermediate segments are a no-op.
pub fn remove(items: &mut Items, path: &str) -> Option<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let (leaf, parents) = segments.split_last()?;
    let Some((first, parents)) = parents.split_first() else {
        return items.shift_remove(*leaf);
    };

    let mut slot = items.get_mut(*first)?;
    for segment in parents {
        slot = step_mut(slot, segment)?;
    }
    match slot {
        Value::Object(map) => map.shift_remove(*leaf),
        Value::Array(list) => match leaf.parse::<usize>() {
            Ok(i) if i < list.len() => Some(list.remove(i)),
            _ => None,
        },
        _ => None,
    }
}
