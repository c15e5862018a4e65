//! Import into and export from [`Items`], shared by every file-aware wrapper.
//!
//! Import sources are either a path to an existing file or literal text.
//! Export writes whole files and replaces any existing one.

use std::path::{Path, PathBuf};

use crate::error::DottedError;
use crate::format::Format;
use crate::path;
use crate::value::{self, Items, Value};

/// The contents of `source` if it names an existing file, otherwise `source`
/// itself.
pub fn read_source(source: &str) -> Result<String, DottedError> {
    let path = Path::new(source);
    if !path.is_file() {
        return Ok(source.to_string());
    }
    tracing::debug!(path = %path.display(), "reading import source");
    std::fs::read_to_string(path).map_err(|e| DottedError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and parse a file that must exist.
pub fn read_file(path: &Path, format: Format) -> Result<Value, DottedError> {
    if !path.is_file() {
        return Err(DottedError::FileNotFound(path.to_path_buf()));
    }
    tracing::debug!(path = %path.display(), ?format, "reading file");
    let text = std::fs::read_to_string(path).map_err(|e| DottedError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    format.decode(&text)
}

/// Store an imported value.
///
/// An empty key merges a keyed mapping into the items (`array_merge`);
/// anything else fails with [`DottedError::MalformedImport`]. A non-empty
/// key stores the value under that top-level key.
pub fn import_value(items: &mut Items, imported: Value, key: &str) -> Result<(), DottedError> {
    if !key.is_empty() {
        items.insert(key.to_string(), imported);
        return Ok(());
    }
    match imported {
        Value::Object(map) if map.is_empty() || !value::is_list(&map) => {
            *items = value::array_merge(std::mem::take(items), map);
            Ok(())
        }
        _ => Err(DottedError::MalformedImport),
    }
}

/// Parse `source` (a file path or literal text) and import it.
pub fn import(
    items: &mut Items,
    source: &str,
    format: Format,
    key: &str,
) -> Result<(), DottedError> {
    let text = read_source(source)?;
    let imported = format.decode(&text)?;
    import_value(items, imported, key)
}

/// Render the items, optionally nested under a single `label` key.
pub fn export(items: &Items, format: Format, label: Option<&str>) -> Result<String, DottedError> {
    let body = value::to_value(items.clone());
    let value = match label {
        Some(label) => {
            let mut wrapper = Items::new();
            wrapper.insert(label.to_string(), body);
            Value::Object(wrapper)
        }
        None => body,
    };
    format.encode(&value)
}

/// Compact single-line JSON.
pub fn export_json(items: &Items) -> Result<String, DottedError> {
    Ok(serde_json::to_string(&value::to_value(items.clone()))?)
}

/// Write part or all of the items to `{dir}/{base_name}`.
///
/// `key` is a dot-path to export, or `"*"` for everything. The default base
/// name is `export{ext}` for `"*"` and `{key}{ext}` otherwise. Fails with
/// [`DottedError::ExportWrite`] if `dir` is not a directory.
pub fn export_file(
    items: &Items,
    dir: &Path,
    key: &str,
    format: Format,
    base_name: Option<&str>,
) -> Result<PathBuf, DottedError> {
    let base_name = match base_name {
        Some(name) => name.to_string(),
        None if key == "*" => format!("export{}", format.extension()),
        None => format!("{key}{}", format.extension()),
    };
    let target = dir.join(base_name);

    if !dir.is_dir() {
        return Err(DottedError::ExportWrite(target));
    }

    let value = path::resolve(items, key, Value::Null);
    let text = format.encode(&value)?;

    if target.exists() {
        std::fs::remove_file(&target).map_err(|e| DottedError::IoError {
            path: target.clone(),
            source: e,
        })?;
    }
    std::fs::write(&target, text).map_err(|e| DottedError::IoError {
        path: target.clone(),
        source: e,
    })?;
    tracing::debug!(path = %target.display(), key, "exported items");
    Ok(target)
}

/// Import methods for a type backed by [`Items`].
pub trait ImportItems {
    fn items_mut(&mut self) -> &mut Items;

    /// Import JSON text or a JSON file. An empty key merges into the items.
    fn import_json(&mut self, source: &str, key: &str) -> Result<(), DottedError> {
        import(self.items_mut(), source, Format::Json, key)
    }

    #[cfg(feature = "yaml")]
    fn import_yaml(&mut self, source: &str, key: &str) -> Result<(), DottedError> {
        import(self.items_mut(), source, Format::Yaml, key)
    }

    fn import_toml(&mut self, source: &str, key: &str) -> Result<(), DottedError> {
        import(self.items_mut(), source, Format::Toml, key)
    }
}

/// Export methods for a type backed by [`Items`].
pub trait ExportItems {
    fn items(&self) -> &Items;

    fn export_json(&self) -> Result<String, DottedError> {
        export_json(self.items())
    }

    fn export_formatted_json(&self) -> Result<String, DottedError> {
        export(self.items(), Format::Json, None)
    }

    #[cfg(feature = "yaml")]
    fn export_yaml(&self, label: Option<&str>) -> Result<String, DottedError> {
        export(self.items(), Format::Yaml, label)
    }

    fn export_toml(&self, label: Option<&str>) -> Result<String, DottedError> {
        export(self.items(), Format::Toml, label)
    }

    fn export_file(
        &self,
        dir: &Path,
        key: &str,
        format: Format,
        base_name: Option<&str>,
    ) -> Result<PathBuf, DottedError> {
        export_file(self.items(), dir, key, format, base_name)
    }
}
