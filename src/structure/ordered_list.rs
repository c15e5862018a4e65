use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Structure, sort_values, validate_list};
use crate::error::DottedError;
use crate::value::{self, Items, Value};

/// Values kept sorted ascending by [`value::compare`]. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct OrderedList {
    values: Arc<Vec<Value>>,
}

impl OrderedList {
    pub fn new(items: Items) -> Result<Self, DottedError> {
        Self::from_items(items)
    }

    pub fn from_values(mut values: Vec<Value>) -> Self {
        sort_values(&mut values);
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
        let values = Arc::make_mut(&mut copy.values);
        values.push(value.into());
        sort_values(values);
        copy
    }

    pub fn with_values(&self, values: impl Into<Value>) -> Result<Self, DottedError> {
        let items = super::items_from_value(values.into())?;
        if value::same_items(&self.items(), &items) {
            return Ok(self.clone());
        }
        Self::validate(&items)?;
        Ok(Self::from_values(items.into_iter().map(|(_, v)| v).collect()))
    }

    pub fn without_value(&self, value: &Value) -> Self {
        let Some(index) = self.values.iter().position(|v| v == value) else {
            return self.clone();
        };
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.values).remove(index);
        copy
    }
}

impl Structure for OrderedList {
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

impl<'a> IntoIterator for &'a OrderedList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

value_conversions!(OrderedList);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_sorted(list: &OrderedList) -> bool {
        list.iter()
            .zip(list.iter().skip(1))
            .all(|(a, b)| value::compare(a, b).is_le())
    }

    #[test]
    fn sorted_after_every_mutation() {
        let list = OrderedList::from_values(vec![json!(5), json!(1), json!(3)]);
        assert!(is_sorted(&list));

        let list = list.with_value(2).with_value(0).with_value(9);
        assert!(is_sorted(&list));
        assert_eq!(list.to_array(), json!([0, 1, 2, 3, 5, 9]));

        let list = list.without_value(&json!(3));
        assert!(is_sorted(&list));

        let list = list.with_values(json!(["b", "c", "a"])).unwrap();
        assert_eq!(list.to_array(), json!(["a", "b", "c"]));
    }

    #[test]
    fn duplicates_are_kept() {
        let list = OrderedList::from_values(vec![json!(2), json!(1)]).with_value(2);
        assert_eq!(list.to_array(), json!([1, 2, 2]));
    }

    #[test]
    fn receiver_is_untouched() {
        let list = OrderedList::from_values(vec![json!(1)]);
        let _ = list.with_value(0);
        assert_eq!(list.to_array(), json!([1]));
    }

    #[test]
    fn mixed_types_follow_total_order() {
        let list = OrderedList::from_values(vec![json!("a"), json!(10), json!(null), json!(true)]);
        assert_eq!(list.to_array(), json!([null, true, 10, "a"]));
    }

    #[test]
    fn identical_values_short_circuit() {
        let list = OrderedList::from_values(vec![json!(1), json!(2)]);
        assert!(list.with_values(json!([1, 2])).unwrap().same_instance(&list));
    }

    #[test]
    fn keyed_input_is_rejected() {
        let list = OrderedList::default();
        let err = list.with_values(json!({"a": 1})).unwrap_err();
        assert!(matches!(err, DottedError::Validation(_)));
    }

    #[test]
    fn to_array_round_trip_is_idempotent() {
        let list = OrderedList::from_values(vec![json!(3), json!(1), json!(2)]);
        let again = OrderedList::try_from(list.to_array()).unwrap();
        assert_eq!(again, list);
    }
}
