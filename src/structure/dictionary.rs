use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Structure, validate_keyed};
use crate::error::DottedError;
use crate::value::{self, Items, Value};

/// Keyed values in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Dictionary {
    pub(super) items: Arc<Items>,
}

impl Dictionary {
    pub fn new(items: Items) -> Result<Self, DottedError> {
        Self::from_items(items)
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    pub fn get_value_or(&self, key: &str, default: Value) -> Value {
        self.get_value(key).cloned().unwrap_or(default)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// A dictionary with `key` set to `value`.
    ///
    /// Returns the receiver itself if `key` already holds exactly `value`.
    pub fn with_value(&self, key: &str, value: impl Into<Value>) -> Result<Self, DottedError> {
        let value = value.into();
        if self.get_value(key) == Some(&value) {
            return Ok(self.clone());
        }

        let mut batch = Items::new();
        batch.insert(key.to_string(), value);
        validate_keyed(&batch)?;

        let mut copy = self.clone();
        Arc::make_mut(&mut copy.items).extend(batch);
        Ok(copy)
    }

    /// A dictionary holding exactly `values`.
    pub fn with_values(&self, values: impl Into<Value>) -> Result<Self, DottedError> {
        let values = super::items_from_value(values.into())?;
        if value::same_items(&self.items, &values) {
            return Ok(self.clone());
        }
        validate_keyed(&values)?;
        Ok(Self {
            items: Arc::new(values),
        })
    }

    pub fn without_value(&self, key: &str) -> Self {
        if !self.has_value(key) {
            return self.clone();
        }
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.items).shift_remove(key);
        copy
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.items.iter()
    }
}

impl Structure for Dictionary {
    fn validate(items: &Items) -> Result<(), DottedError> {
        validate_keyed(items)
    }

    fn from_items(items: Items) -> Result<Self, DottedError> {
        Self::validate(&items)?;
        Ok(Self {
            items: Arc::new(items),
        })
    }

    fn items(&self) -> Items {
        (*self.items).clone()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

value_conversions!(Dictionary);
