//! Named filesystem paths, normalized when stored.

use std::path::{Path, PathBuf};

use crate::error::DottedError;
use crate::format::Format;
use crate::io::{self, ExportItems};
use crate::path;
use crate::value::{Items, Value};

/// Expand a leading `~/` to the user's home directory.
///
/// Returns `None` when there is nothing to expand or no home directory.
fn expand_home(raw: &str) -> Option<PathBuf> {
    let rest = raw.strip_prefix("~/")?;
    let user = directories::UserDirs::new()?;
    Some(user.home_dir().join(rest))
}

/// The canonical form of an existing path with a trailing `/`, or `raw`
/// unchanged if it does not exist. Non-string values are left alone.
pub fn normalize(raw: Value) -> Value {
    let Value::String(text) = &raw else {
        return raw;
    };
    let candidate = expand_home(text).unwrap_or_else(|| PathBuf::from(text));
    match std::fs::canonicalize(&candidate) {
        Ok(real) => {
            let real = real.to_string_lossy();
            Value::String(format!("{}/", real.trim_end_matches('/')))
        }
        Err(_) => raw,
    }
}

/// A mapping of names to directory paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paths {
    items: Items,
}

impl Paths {
    pub fn new(items: Items) -> Self {
        let mut paths = Self::default();
        paths.merge(items);
        paths
    }

    pub fn all(&self) -> &Items {
        &self.items
    }

    pub fn get(&self, key: &str, default: Value) -> Value {
        path::resolve(&self.items, key, default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn set(&mut self, key: &str, path: impl Into<Value>) -> &mut Self {
        self.items.insert(key.to_string(), normalize(path.into()));
        self
    }

    /// Set each entry, normalizing its path.
    pub fn merge(&mut self, items: Items) -> &mut Self {
        for (key, path) in items {
            self.set(&key, path);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn import(&mut self, source: &str, format: Format, key: &str) -> Result<(), DottedError> {
        let mut imported = Items::new();
        io::import(&mut imported, source, format, key)?;
        self.merge(imported);
        Ok(())
    }

    /// Import JSON text or a JSON file. An empty key merges into the paths.
    pub fn import_json(&mut self, source: &str, key: &str) -> Result<(), DottedError> {
        self.import(source, Format::Json, key)
    }

    #[cfg(feature = "yaml")]
    pub fn import_yaml(&mut self, source: &str, key: &str) -> Result<(), DottedError> {
        self.import(source, Format::Yaml, key)
    }

    pub fn import_toml(&mut self, source: &str, key: &str) -> Result<(), DottedError> {
        self.import(source, Format::Toml, key)
    }

    /// Load every entry of a file, picking the format from its extension.
    pub fn import_file(&mut self, file: &Path) -> Result<(), DottedError> {
        let extension = file
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = Format::from_extension(&extension)?;
        let imported = io::read_file(file, format)?;
        let mut items = Items::new();
        io::import_value(&mut items, imported, "")?;
        self.merge(items);
        Ok(())
    }
}

impl ExportItems for Paths {
    fn items(&self) -> &Items {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn canonical(dir: &TempDir) -> String {
        let real = fs::canonicalize(dir.path()).unwrap();
        format!("{}/", real.to_string_lossy())
    }

    #[test]
    fn existing_paths_get_a_trailing_slash() {
        let dir = TempDir::new().unwrap();
        let mut paths = Paths::default();
        paths.set("root", dir.path().to_string_lossy().into_owned());
        assert_eq!(paths.get("root", Value::Null), json!(canonical(&dir)));
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let dir = TempDir::new().unwrap();
        let raw = format!("{}/", dir.path().to_string_lossy());
        let paths = Paths::new(crate::value::into_items(json!({"root": raw})));
        assert_eq!(paths.get("root", Value::Null), json!(canonical(&dir)));
    }

    #[test]
    fn missing_paths_are_kept_raw() {
        let mut paths = Paths::default();
        paths.set("gone", "/no/such/dir");
        paths.set("count", 3);
        assert_eq!(paths.get("gone", Value::Null), json!("/no/such/dir"));
        assert_eq!(paths.get("count", Value::Null), json!(3));
    }

    #[test]
    fn relative_segments_are_resolved() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let raw = dir.path().join("sub").join("..").to_string_lossy().into_owned();
        assert_eq!(normalize(json!(raw)), json!(canonical(&dir)));
    }

    #[test]
    fn home_prefix_is_expanded() {
        let Some(user) = directories::UserDirs::new() else {
            return;
        };
        if !user.home_dir().is_dir() {
            return;
        }
        let normalized = normalize(json!("~/"));
        let expected = fs::canonicalize(user.home_dir()).unwrap();
        assert_eq!(
            normalized,
            json!(format!("{}/", expected.to_string_lossy().trim_end_matches('/')))
        );
    }

    #[test]
    fn merge_and_import_normalize() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let mut paths = Paths::default();
        paths.merge(crate::value::into_items(json!({"a": root.clone()})));
        paths
            .import_json(&serde_json::to_string(&json!({"b": root})).unwrap(), "")
            .unwrap();
        assert_eq!(paths.get("a", Value::Null), json!(canonical(&dir)));
        assert_eq!(paths.get("b", Value::Null), json!(canonical(&dir)));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn import_file_by_extension() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("paths.toml");
        fs::write(&file, format!("root = {:?}\n", dir.path().to_string_lossy())).unwrap();
        let mut paths = Paths::default();
        paths.import_file(&file).unwrap();
        assert_eq!(paths.get("root", Value::Null), json!(canonical(&dir)));
        assert!(paths.has("root"));
    }

    #[test]
    fn export() {
        let mut paths = Paths::default();
        paths.set("gone", "/no/such/dir");
        assert_eq!(paths.export_json().unwrap(), r#"{"gone":"/no/such/dir"}"#);
    }
}
