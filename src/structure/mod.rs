//! Immutable value containers.
//!
//! Every mutator returns a new structure and leaves the receiver untouched.
//! Storage is reference counted: a mutator that changes nothing hands back a
//! structure sharing the receiver's storage, which [`Structure::same_instance`]
//! reports.
//!
//! | Type | Keys | Order | Duplicates |
//! |------|------|-------|------------|
//! | [`Dictionary`] | distinct | insertion | n/a |
//! | [`SortedDictionary`] | distinct | by value | n/a |
//! | [`Set`] | none | insertion, positional inserts | removed |
//! | [`OrderedList`] | none | by value | allowed |
//! | [`UnorderedList`] | none | insertion | allowed |

use std::any::TypeId;

use crate::error::DottedError;
use crate::value::{self, Items, Value};

/// `TryFrom<Value>` and `From<Self> for Value` for a structure type.
macro_rules! value_conversions {
    ($ty:ident) => {
        impl TryFrom<$crate::value::Value> for $ty {
            type Error = $crate::error::DottedError;

            fn try_from(value: $crate::value::Value) -> Result<Self, Self::Error> {
                <$ty as $crate::structure::Structure>::from_items(
                    $crate::structure::items_from_value(value)?,
                )
            }
        }

        impl From<$ty> for $crate::value::Value {
            fn from(structure: $ty) -> Self {
                $crate::structure::Structure::to_array(&structure)
            }
        }
    };
}

mod dictionary;
mod ordered_list;
mod set;
mod sorted_dictionary;
mod unordered_list;

pub use dictionary::Dictionary;
pub use ordered_list::OrderedList;
pub use set::Set;
pub use sorted_dictionary::SortedDictionary;
pub use unordered_list::UnorderedList;

const KEYED_MESSAGE: &str = "Dictionary values must have distinct keys";
const SET_MESSAGE: &str = "Set structures cannot have distinct keys";
const LIST_MESSAGE: &str = "List structures cannot have distinct keys";

/// Behaviour shared by every immutable container.
pub trait Structure: Clone + Sized + 'static {
    /// Check a batch of input items. Empty batches always pass.
    fn validate(items: &Items) -> Result<(), DottedError>;

    /// Validate `items` and build a structure from them.
    fn from_items(items: Items) -> Result<Self, DottedError>;

    /// A copy of the backing items.
    fn items(&self) -> Items;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if both structures share the same storage.
    fn same_instance(&self, other: &Self) -> bool;

    /// The plain value: an array for sequences, an object for keyed types.
    fn to_array(&self) -> Value {
        value::to_value(self.items())
    }

    fn to_json(&self) -> Result<String, DottedError> {
        Ok(serde_json::to_string(&self.to_array())?)
    }

    /// True if `other` is the same kind of structure.
    fn is_similar<S: Structure>(&self, _other: &S) -> bool {
        TypeId::of::<Self>() == TypeId::of::<S>()
    }

    /// Serialize the backing items, keys included.
    fn to_blob(&self) -> Result<String, DottedError> {
        Ok(serde_json::to_string(&self.items())?)
    }

    /// Rebuild a structure from [`Structure::to_blob`] output. The items are
    /// validated again.
    fn from_blob(blob: &str) -> Result<Self, DottedError> {
        let value: Value = serde_json::from_str(blob)?;
        Self::from_items(items_from_value(value)?)
    }
}

/// Items from an array or object value. Scalars are rejected.
pub(crate) fn items_from_value(value: Value) -> Result<Items, DottedError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(values) => Ok(value::list_items(values)),
        other => Err(DottedError::validation(format!(
            "Structures are built from an array, got {}",
            value::type_name(&other)
        ))),
    }
}

pub(crate) fn validate_keyed(items: &Items) -> Result<(), DottedError> {
    if !items.is_empty() && value::is_list(items) {
        return Err(DottedError::validation(KEYED_MESSAGE));
    }
    Ok(())
}

fn validate_sequence(items: &Items, message: &str) -> Result<(), DottedError> {
    if !items.is_empty() && !value::is_list(items) {
        return Err(DottedError::validation(message));
    }
    Ok(())
}

pub(crate) fn validate_set(items: &Items) -> Result<(), DottedError> {
    validate_sequence(items, SET_MESSAGE)
}

pub(crate) fn validate_list(items: &Items) -> Result<(), DottedError> {
    validate_sequence(items, LIST_MESSAGE)
}

/// Stable sort of entries by value, keeping each key with its value.
pub(crate) fn sort_by_value(items: &mut Items) {
    let mut entries: Vec<(String, Value)> = std::mem::take(items).into_iter().collect();
    entries.sort_by(|(_, a), (_, b)| value::compare(a, b));
    *items = entries.into_iter().collect();
}

pub(crate) fn sort_values(values: &mut [Value]) {
    values.sort_by(value::compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_cannot_become_structures() {
        let err = items_from_value(json!("text")).unwrap_err();
        assert!(matches!(err, DottedError::Validation(_)));
    }

    #[test]
    fn keyed_validation_rejects_lists() {
        assert!(validate_keyed(&Items::new()).is_ok());
        assert!(validate_keyed(&value::into_items(json!({"a": 1}))).is_ok());
        let err = validate_keyed(&value::into_items(json!(["a"]))).unwrap_err();
        assert_eq!(err.to_string(), KEYED_MESSAGE);
    }

    #[test]
    fn sequence_validation_rejects_keys() {
        assert!(validate_set(&value::into_items(json!([1, 2]))).is_ok());
        let err = validate_list(&value::into_items(json!({"a": 1}))).unwrap_err();
        assert!(err.to_string().contains(LIST_MESSAGE));
    }

    #[test]
    fn sort_by_value_keeps_keys() {
        let mut items = value::into_items(json!({"x": 3, "y": 1, "z": 2}));
        sort_by_value(&mut items);
        let keys: Vec<&str> = items.keys().map(String::as_str).collect();
        assert_eq!(keys, ["y", "z", "x"]);
    }

    #[test]
    fn similarity_is_by_type() {
        let dict = Dictionary::default();
        let sorted = SortedDictionary::default();
        assert!(dict.is_similar(&Dictionary::default()));
        assert!(!dict.is_similar(&sorted));
        assert!(sorted.is_similar(&sorted));
        assert!(!Set::default().is_similar(&OrderedList::default()));
    }
}
