use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Structure, validate_list};
use crate::error::DottedError;
use crate::value::{self, Items, Value};

/// Values in insertion order. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct UnorderedList {
    values: Arc<Vec<Value>>,
}

impl UnorderedList {
    pub fn new(items: Items) -> Result<Self, DottedError> {
        Self::from_items(items)
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(values),
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

    pub fn with_value(&self, value: impl Into<Value>) -> Self {
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.values).push(value.into());
        copy
    }

    pub fn with_values(&self, values: impl Into<Value>) -> Result<Self, DottedError> {
        let items = super::items_from_value(values.into())?;
        Self::validate(&items)?;
        let values: Vec<Value> = items.into_iter().map(|(_, v)| v).collect();
        if *self.values == values {
            return Ok(self.clone());
        }
        Ok(Self::from_values(values))
    }

    /// Remove the first occurrence of `value`.
    pub fn without_value(&self, value: &Value) -> Self {
        let Some(index) = self.values.iter().position(|v| v == value) else {
            return self.clone();
        };
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.values).remove(index);
        copy
    }
}

impl Structure for UnorderedList {
    fn validate(items: &Items) -> Result<(), DottedError> {
        validate_list(items)
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

impl<'a> IntoIterator for &'a UnorderedList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

value_conversions!(UnorderedList);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let list = UnorderedList::from_values(vec![json!(3), json!(1)])
            .with_value(3)
            .with_value(2);
        assert_eq!(list.to_array(), json!([3, 1, 3, 2]));
    }

    #[test]
    fn with_value_always_copies() {
        let list = UnorderedList::from_values(vec![json!(1)]);
        let next = list.with_value(1);
        assert!(!next.same_instance(&list));
        assert_eq!(list.len(), 1);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn with_values_short_circuits_on_identical_input() {
        let list = UnorderedList::try_from(json!(["a", "b"])).unwrap();
        assert!(list.with_values(json!(["a", "b"])).unwrap().same_instance(&list));
        assert!(!list.with_values(json!(["b", "a"])).unwrap().same_instance(&list));
    }

    #[test]
    fn without_value_removes_first_occurrence() {
        let list = UnorderedList::from_values(vec![json!("x"), json!("y"), json!("x")]);
        assert_eq!(list.without_value(&json!("x")).to_array(), json!(["y", "x"]));
        assert!(list.without_value(&json!("z")).same_instance(&list));
    }

    #[test]
    fn keyed_input_is_rejected() {
        let err = UnorderedList::try_from(json!({"name": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "List structures cannot have distinct keys");
    }

    #[test]
    fn iterates_by_reference() {
        let list = UnorderedList::from_values(vec![json!(1), json!(2)]);
        let total: i64 = (&list).into_iter().filter_map(Value::as_i64).sum();
        assert_eq!(total, 3);
        assert_eq!(list.get(1), Some(&json!(2)));
    }
}
