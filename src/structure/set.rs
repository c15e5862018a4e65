use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Structure, validate_set};
use crate::error::DottedError;
use crate::value::{self, Items, Value};

/// Distinct values in insertion order.
///
/// Duplicates are dropped on construction and on every bulk replace; the
/// first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Set {
    values: Arc<Vec<Value>>,
}

fn dedup(values: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

impl Set {
    pub fn new(items: Items) -> Result<Self, DottedError> {
        Self::from_items(items)
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(dedup(values)),
        }
    }

    pub fn has_value(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Append `value` unless it is already present.
    pub fn with_value(&self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.insert_at(value, |values| values.len())
    }

    /// Insert `value` right before `search`, or at the front if `search` is
    /// absent.
    pub fn with_value_before(&self, value: impl Into<Value>, search: &Value) -> Self {
        self.insert_at(value.into(), |values| {
            values.iter().position(|v| v == search).unwrap_or(0)
        })
    }

    /// Insert `value` right after `search`, or at the end if `search` is
    /// absent.
    pub fn with_value_after(&self, value: impl Into<Value>, search: &Value) -> Self {
        self.insert_at(value.into(), |values| {
            values
                .iter()
                .position(|v| v == search)
                .map_or(values.len(), |i| i + 1)
        })
    }

    fn insert_at(&self, value: Value, index: impl FnOnce(&[Value]) -> usize) -> Self {
        if self.has_value(&value) {
            return self.clone();
        }
        let mut copy = self.clone();
        let values = Arc::make_mut(&mut copy.values);
        let at = index(values.as_slice());
        values.insert(at, value);
        copy
    }

    /// A set holding the distinct entries of `values`.
    pub fn with_values(&self, values: impl Into<Value>) -> Result<Self, DottedError> {
        let items = super::items_from_value(values.into())?;
        Self::validate(&items)?;
        Ok(Self::from_values(items.into_iter().map(|(_, v)| v).collect()))
    }

    /// Remove `value`. Returns the receiver itself if it is absent.
    pub fn without_value(&self, value: &Value) -> Self {
        let Some(index) = self.values.iter().position(|v| v == value) else {
            return self.clone();
        };
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.values).remove(index);
        copy
    }
}

impl Structure for Set {
    fn validate(items: &Items) -> Result<(), DottedError> {
        validate_set(items)
    }

    fn from_items(items: Items) -> Result<Self, DottedError> {
        Self::validate(&items)?;
        Ok(Self::from_values(items.into_iter().map(|(_, v)| v).collect()))
    }

    fn items(&self) -> Items {
        value::list_items(self.values.iter().cloned())
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl<'a> IntoIterator for &'a Set {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

value_conversions!(Set);
