use serde::Serialize;

use crate::error::DottedError;
use crate::io::ExportItems;
use crate::value::{self, Items, Value};

const OVERWRITE_MESSAGE: &str =
    "Setting magic or other properties is not allowed in an immutable data object.";
const REMOVE_MESSAGE: &str = "Cannot remove an immutable item.";
const POPULATED_MESSAGE: &str = "Cannot use setAttributes once the item array is populated.";

/// Set-once attributes.
///
/// Items are populated once, either by [`Attributes::new`] with a non-empty
/// mapping or by [`Attributes::set_attributes`]. After that no key is added,
/// overwritten or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    items: Items,
    populated: bool,
}

impl Attributes {
    pub fn new(items: Items) -> Self {
        Self {
            populated: !items.is_empty(),
            items,
        }
    }

    /// Build from anything serializable to a mapping.
    pub fn from_serialize<T: Serialize>(source: &T) -> Result<Self, DottedError> {
        Ok(Self::new(value::into_items(serde_json::to_value(source)?)))
    }

    pub fn get(&self, name: &str, default: Value) -> Value {
        self.items.get(name).cloned().unwrap_or(default)
    }

    /// The attribute named `name`, failing if it is absent.
    pub fn attribute(&self, name: &str) -> Result<&Value, DottedError> {
        self.items
            .get(name)
            .ok_or_else(|| DottedError::AttributeNotFound(name.to_string()))
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Always fails. Items come only from [`Attributes::new`] or
    /// [`Attributes::set_attributes`].
    pub fn set(&mut self, _key: &str, _value: impl Into<Value>) -> Result<(), DottedError> {
        Err(DottedError::ImmutableViolation(OVERWRITE_MESSAGE.into()))
    }

    /// Always fails.
    pub fn remove(&mut self, _key: &str) -> Result<(), DottedError> {
        Err(DottedError::ImmutableViolation(REMOVE_MESSAGE.into()))
    }

    /// Populate the items, unless they already are.
    pub fn set_attributes(&mut self, items: Items) -> Result<&mut Self, DottedError> {
        if self.populated {
            return Err(DottedError::ImmutableViolation(POPULATED_MESSAGE.into()));
        }
        self.items = items;
        self.populated = true;
        Ok(self)
    }

    pub fn copy(&self) -> Items {
        self.items.clone()
    }

    pub fn get_attributes(&self) -> Attributes {
        self.clone()
    }

    pub fn to_array(&self) -> Value {
        value::to_value(self.items.clone())
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, DottedError> {
        let value = self.to_array();
        Ok(if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        })
    }
}

impl From<Items> for Attributes {
    fn from(items: Items) -> Self {
        Self::new(items)
    }
}

impl ExportItems for Attributes {
    fn items(&self) -> &Items {
        &self.items
    }
}
