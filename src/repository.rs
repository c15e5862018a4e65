use crate::error::DottedError;
use crate::io::{ExportItems, ImportItems};
use crate::path;
use crate::value::{self, Items, Value};

/// A dot-path keyed store of application values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repository {
    items: Items,
}

impl Repository {
    pub fn new(items: Items) -> Self {
        Self { items }
    }

    pub fn all(&self) -> &Items {
        &self.items
    }

    pub fn get(&self, path: &str, default: Value) -> Value {
        path::resolve(&self.items, path, default)
    }

    pub fn has(&self, path: &str) -> bool {
        path::exists(&self.items, path)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        path::assign(&mut self.items, path, value.into());
    }

    /// Set each entry, treating keys as dot-paths.
    pub fn set_many(&mut self, items: Items) {
        for (path, item) in items {
            self.set(&path, item);
        }
    }

    /// Store `null` at the path. The key stays present.
    pub fn unset(&mut self, path: &str) {
        self.set(path, Value::Null);
    }

    /// Push onto the array at `path`.
    pub fn append(&mut self, path: &str, value: impl Into<Value>) -> Result<(), DottedError> {
        let mut items = match self.get(path, Value::Null) {
            Value::Array(values) => value::list_items(values),
            Value::Object(items) => items,
            other => return Err(DottedError::AppendNotPossible(value::type_name(&other))),
        };
        let key = value::next_index(&items).to_string();
        items.insert(key, value.into());
        self.set(path, value::to_value(items));
        Ok(())
    }

    /// Insert at the front of the array at `path`. Integer keys are
    /// renumbered.
    pub fn prepend(&mut self, path: &str, value: impl Into<Value>) -> Result<(), DottedError> {
        let items = match self.get(path, Value::Null) {
            Value::Array(values) => value::list_items(values),
            Value::Object(items) => items,
            other => return Err(DottedError::PrependNotPossible(value::type_name(&other))),
        };
        let mut front = Items::new();
        front.insert("0".into(), value.into());
        let shifted = value::reindex(value::array_merge(front, items));
        self.set(path, value::to_value(shifted));
        Ok(())
    }
}

impl From<Items> for Repository {
    fn from(items: Items) -> Self {
        Self::new(items)
    }
}

impl ImportItems for Repository {
    fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }
}

impl ExportItems for Repository {
    fn items(&self) -> &Items {
        &self.items
    }
}
