use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Dictionary, Structure, sort_by_value};
use crate::error::DottedError;
use crate::value::{Items, Value};

/// A [`Dictionary`] whose entries are kept sorted by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct SortedDictionary {
    inner: Dictionary,
}

impl SortedDictionary {
    pub fn new(items: Items) -> Result<Self, DottedError> {
        Self::from_items(items)
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.inner.get_value(key)
    }

    pub fn get_value_or(&self, key: &str, default: Value) -> Value {
        self.inner.get_value_or(key, default)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.inner.has_value(key)
    }

    pub fn with_value(&self, key: &str, value: impl Into<Value>) -> Result<Self, DottedError> {
        let next = self.inner.with_value(key, value)?;
        Ok(self.sort_changed(next))
    }

    pub fn with_values(&self, values: impl Into<Value>) -> Result<Self, DottedError> {
        let next = self.inner.with_values(values)?;
        Ok(self.sort_changed(next))
    }

    pub fn without_value(&self, key: &str) -> Self {
        let next = self.inner.without_value(key);
        self.sort_changed(next)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.inner.iter()
    }

    fn sort_changed(&self, mut next: Dictionary) -> Self {
        if next.same_instance(&self.inner) {
            return self.clone();
        }
        sort_by_value(Arc::make_mut(&mut next.items));
        Self { inner: next }
    }
}

impl Structure for SortedDictionary {
    fn validate(items: &Items) -> Result<(), DottedError> {
        Dictionary::validate(items)
    }

    fn from_items(mut items: Items) -> Result<Self, DottedError> {
        Self::validate(&items)?;
        sort_by_value(&mut items);
        Ok(Self {
            inner: Dictionary::from_items(items)?,
        })
    }

    fn items(&self) -> Items {
        self.inner.items()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn same_instance(&self, other: &Self) -> bool {
        self.inner.same_instance(&other.inner)
    }
}

impl<'a> IntoIterator for &'a SortedDictionary {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

value_conversions!(SortedDictionary);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(dict: &SortedDictionary) -> Vec<String> {
        dict.iter().map(|(k, _)| k.clone()).collect()
    }

    fn prices() -> SortedDictionary {
        SortedDictionary::try_from(json!({"desk": 200, "chair": 100, "bookcase": 150})).unwrap()
    }

    #[test]
    fn construction_sorts_by_value() {
        assert_eq!(keys(&prices()), ["chair", "bookcase", "desk"]);
    }

    #[test]
    fn with_value_resorts() {
        let dict = prices();
        let next = dict.with_value("stool", 50).unwrap();
        assert_eq!(keys(&next), ["stool", "chair", "bookcase", "desk"]);
        assert_eq!(keys(&dict), ["chair", "bookcase", "desk"]);
    }

    #[test]
    fn changed_value_moves_entry() {
        let next = prices().with_value("desk", 10).unwrap();
        assert_eq!(keys(&next), ["desk", "chair", "bookcase"]);
        assert_eq!(next.get_value("desk"), Some(&json!(10)));
    }

    #[test]
    fn unchanged_returns_same_instance() {
        let dict = prices();
        assert!(dict.with_value("chair", 100).unwrap().same_instance(&dict));
        assert!(dict.without_value("lamp").same_instance(&dict));
    }

    #[test]
    fn with_values_sorts_input() {
        let dict = prices().with_values(json!({"b": "beta", "a": "alpha"})).unwrap();
        assert_eq!(keys(&dict), ["a", "b"]);
    }

    #[test]
    fn without_value_keeps_order() {
        let next = prices().without_value("bookcase");
        assert_eq!(keys(&next), ["chair", "desk"]);
    }

    #[test]
    fn list_input_is_rejected() {
        assert!(SortedDictionary::try_from(json!([3, 1, 2])).is_err());
    }

    #[test]
    fn blob_round_trip() {
        let dict = prices();
        let back = SortedDictionary::from_blob(&dict.to_blob().unwrap()).unwrap();
        assert_eq!(keys(&back), keys(&dict));
    }
}
