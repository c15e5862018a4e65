//! A mutable bag of items with named plug-in functions.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};

use crate::collection::Collection;
use crate::env::{DEFAULT_ENVIRONMENT_KEY, Environment};
use crate::error::DottedError;
use crate::io::{ExportItems, ImportItems};
use crate::merge::deep_merge;
use crate::path;
use crate::value::{self, Items, Value};

/// A plug-in receives the scope it is called on and the call arguments.
pub type Plugin = Rc<dyn Fn(&Scope, &[Value]) -> Value>;

#[derive(Clone, Default)]
pub struct Scope {
    items: Items,
    plugins: BTreeMap<String, Plugin>,
}

impl Scope {
    pub fn new(items: Items) -> Self {
        Self {
            items,
            plugins: BTreeMap::new(),
        }
    }

    /// Build from anything serializable to a mapping.
    pub fn from_serialize<T: Serialize>(source: &T) -> Result<Self, DottedError> {
        Ok(Self::new(value::into_items(serde_json::to_value(source)?)))
    }

    /// The application-wide scope: `developing`, `app_key`, `debugging` and
    /// `testing`.
    ///
    /// With an environment, its detected settings are used and the
    /// environment key must be set. Without one, the settings are read from
    /// the process environment.
    pub fn global(env: Option<&mut Environment>) -> Result<Self, DottedError> {
        let settings = match env {
            Some(env) => env.detect_environment()?,
            None => Environment::from_process(DEFAULT_ENVIRONMENT_KEY).settings(),
        };
        Ok(Self::new(settings))
    }

    pub fn all(&self) -> &Items {
        &self.items
    }

    /// Resolve a dot-path.
    pub fn get(&self, path: &str, default: Value) -> Value {
        path::resolve(&self.items, path, default)
    }

    /// True if the top-level key exists.
    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Store under a top-level key.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.items.insert(key.to_string(), value.into());
    }

    /// Store at a dot-path, creating levels as needed.
    pub fn put(&mut self, path: &str, value: impl Into<Value>) {
        path::assign(&mut self.items, path, value.into());
    }

    /// Store a new key. Fails if the key already exists.
    pub fn append(&mut self, key: &str, value: impl Into<Value>) -> Result<(), DottedError> {
        if self.has(key) {
            return Err(DottedError::KeyExists(key.to_string()));
        }
        self.put(key, value);
        Ok(())
    }

    /// Deep-merge `items` over the current items.
    pub fn search_and_replace(&mut self, items: Items) {
        self.items = deep_merge(std::mem::take(&mut self.items), items);
    }

    pub fn forget(&mut self, path: &str) {
        path::remove(&mut self.items, path);
    }

    /// `array_merge` the given items in and return the result.
    pub fn merge(&mut self, items: Items) -> &Items {
        self.items = value::array_merge(std::mem::take(&mut self.items), items);
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    fn collection(&self) -> Collection {
        Collection::new(self.items.clone())
    }

    /// Visit every item until `f` returns `false`.
    pub fn each(&self, mut f: impl FnMut(&Value, &str) -> bool) -> &Self {
        for (key, item) in &self.items {
            if !f(item, key) {
                break;
            }
        }
        self
    }

    pub fn every(&self, step: usize, offset: usize) -> Collection {
        self.collection().every(step, offset)
    }

    pub fn filter(&self, f: impl FnMut(&Value, &str) -> bool) -> Collection {
        self.collection().filter(f)
    }

    pub fn flip(&self) -> Collection {
        self.collection().flip()
    }

    pub fn chunk(&self, size: usize) -> Collection {
        self.collection().chunk(size)
    }

    /// Register a plug-in, replacing any with the same name.
    pub fn plugin(&mut self, name: &str, plugin: impl Fn(&Scope, &[Value]) -> Value + 'static) {
        self.plugins.insert(name.to_string(), Rc::new(plugin));
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn forget_plugin(&mut self, name: &str) {
        self.plugins.remove(name);
    }

    /// Call a plug-in by name.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, DottedError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| DottedError::PluginNotFound(name.to_string()))?;
        Ok(plugin(self, args))
    }

    pub fn to_array(&self) -> Value {
        value::to_value(self.items.clone())
    }

    pub fn to_json(&self) -> Result<String, DottedError> {
        Ok(serde_json::to_string(&self.to_array())?)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("items", &self.items)
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ImportItems for Scope {
    fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }
}

impl ExportItems for Scope {
    fn items(&self) -> &Items {
        &self.items
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}
