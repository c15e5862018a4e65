//! Configuration items loaded from files, folders, and the environment.
//!
//! A [`Config`] is a [`Collection`] with dot-path access plus:
//!
//! - **Folder import**: every matching file in a directory is imported under
//!   its base name (`config/app.toml` becomes the `app` key).
//! - **Compiled files**: the whole config can be written to a single
//!   `_compiled.json` and read back in place of the folder.
//! - **Environment overlays**: `PREFIX__DATABASE__URL=...` sets
//!   `database.url`.
//! - **Typed extraction**: deserialize the items into any serde type, with an
//!   optional strict mode that reports keys the type does not consume.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::collection::Collection;
use crate::env::{DEFAULT_ENVIRONMENT_KEY, Environment};
use crate::error::DottedError;
use crate::format::Format;
use crate::io::{self, ExportItems, ImportItems};
use crate::merge::deep_merge;
use crate::path;
use crate::value::{self, Items, Value};

/// File name used by [`Config::compile`] and [`Config::import_compiled_file`].
pub const COMPILED_FILE: &str = "_compiled.json";

/// Folder mask that prefers a compiled file when one exists.
pub const DEFAULT_MASK: &str = "*.toml";

const IMPORT_EXTENSIONS: [&str; 4] = [".json", ".toml", ".yaml", ".yml"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    items: Collection,
    base_path: Option<PathBuf>,
    compile_path: Option<PathBuf>,
}

impl Config {
    pub fn new(items: Items) -> Self {
        Self {
            items: Collection::new(items),
            ..Self::default()
        }
    }

    /// Import every file in `folder` matching [`DEFAULT_MASK`].
    pub fn create_from_folder(folder: impl AsRef<Path>) -> Result<Self, DottedError> {
        let mut config = Self::default();
        config.import_folder(folder, DEFAULT_MASK)?;
        Ok(config)
    }

    /// Build from JSON text or a JSON file.
    pub fn create_from_json(source: &str) -> Result<Self, DottedError> {
        let mut config = Self::default();
        config.import_json(source, "")?;
        Ok(config)
    }

    #[cfg(feature = "yaml")]
    pub fn create_from_yaml(source: &str) -> Result<Self, DottedError> {
        let mut config = Self::default();
        config.import_yaml(source, "")?;
        Ok(config)
    }

    pub fn create_from_toml(source: &str) -> Result<Self, DottedError> {
        let mut config = Self::default();
        config.import_toml(source, "")?;
        Ok(config)
    }

    pub fn all(&self) -> &Items {
        self.items.all()
    }

    pub fn collection(&self) -> &Collection {
        &self.items
    }

    pub fn get(&self, path: &str, default: Value) -> Value {
        path::resolve(self.all(), path, default)
    }

    /// True if the top-level key exists.
    pub fn has(&self, key: &str) -> bool {
        self.items.has(key)
    }

    /// True if the dot-path resolves to a stored value.
    pub fn has_path(&self, path: &str) -> bool {
        path::exists(self.all(), path)
    }

    pub fn put(&mut self, path: &str, value: impl Into<Value>) {
        path::assign(self.items.items_mut(), path, value.into());
    }

    /// Store a new key. Fails if the key already exists.
    pub fn append(&mut self, key: &str, value: impl Into<Value>) -> Result<(), DottedError> {
        if self.has(key) {
            return Err(DottedError::KeyExists(key.to_string()));
        }
        self.put(key, value);
        Ok(())
    }

    pub fn forget(&mut self, path: &str) {
        path::remove(self.items.items_mut(), path);
    }

    /// A detached copy of the items and paths.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Put each top-level entry, treating keys as dot-paths.
    pub fn import_array(&mut self, items: Items) {
        for (key, item) in items {
            self.put(&key, item);
        }
    }

    /// Import `file` under `key` using the format named by `extension`.
    ///
    /// The extension may be given as a mask (`*.json`). A file that does not
    /// exist as given is looked up under the base path. Nothing happens if
    /// `key` is already set, or if the file does not hold a mapping or array.
    pub fn import_by_extension(
        &mut self,
        extension: &str,
        file: impl AsRef<Path>,
        key: &str,
    ) -> Result<(), DottedError> {
        let extension = extension.replace('*', "").to_ascii_lowercase();
        if !IMPORT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DottedError::InvalidExtension(extension));
        }
        let format = Format::from_extension(&extension)?;

        let file = file.as_ref();
        let file = match &self.base_path {
            Some(base) if !file.exists() => base.join(file),
            _ => file.to_path_buf(),
        };

        if !key.is_empty() && self.has(key) {
            tracing::trace!(key, path = %file.display(), "key already set, skipping import");
            return Ok(());
        }

        let imported = io::read_file(&file, format)?;
        if !matches!(imported, Value::Object(_) | Value::Array(_)) {
            tracing::trace!(path = %file.display(), "import is not a mapping, skipping");
            return Ok(());
        }
        if key.is_empty() {
            return io::import_value(self.items.items_mut(), imported, "");
        }
        self.put(key, imported);
        Ok(())
    }

    /// Import a single file under its base name.
    pub fn import_file(&mut self, file: impl AsRef<Path>) -> Result<(), DottedError> {
        let file = file.as_ref();
        let extension = file
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let key = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.import_by_extension(&extension, file, &key)
    }

    /// Import each file in `folder` whose name ends with the mask's extension.
    ///
    /// With [`DEFAULT_MASK`], a compiled file for the folder is imported
    /// instead when one exists.
    pub fn import_folder(
        &mut self,
        folder: impl AsRef<Path>,
        mask: &str,
    ) -> Result<&mut Self, DottedError> {
        let folder = folder.as_ref();
        if mask == DEFAULT_MASK && self.is_compiled(folder) {
            self.import_compiled_file(folder)?;
            return Ok(self);
        }

        let folder = match &self.base_path {
            Some(base) if !folder.is_dir() => base.join(folder),
            _ => folder.to_path_buf(),
        };
        let extension = mask.replace('*', "").to_ascii_lowercase();

        let mut imported = 0;
        for entry in walkdir::WalkDir::new(&folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| DottedError::IoError {
                path: e.path().map_or_else(|| folder.clone(), Path::to_path_buf),
                source: e.into(),
            })?;
            let name = entry.file_name().to_string_lossy();
            if !entry.file_type().is_file()
                || !name.to_ascii_lowercase().ends_with(&extension)
            {
                tracing::trace!(path = %entry.path().display(), "skipping");
                continue;
            }
            let key = &name[..name.len() - extension.len()];
            self.import_by_extension(&extension, entry.path(), key)?;
            imported += 1;
        }
        tracing::debug!(folder = %folder.display(), mask, imported, "imported folder");
        Ok(self)
    }

    /// The directory compiled files live in for `path`: the compile path if
    /// set, otherwise `path` under the base path.
    fn compile_dir(&self, path: &Path) -> PathBuf {
        if let Some(compile_path) = &self.compile_path {
            return compile_path.clone();
        }
        match &self.base_path {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Write the whole config as JSON to `{dir}/{filename}`.
    ///
    /// A `compiled` key naming the target is included in the file unless
    /// one is already set. It never stays in the items.
    pub fn compile(
        &mut self,
        path: impl AsRef<Path>,
        filename: Option<&str>,
    ) -> Result<PathBuf, DottedError> {
        let dir = self.compile_dir(path.as_ref());
        let filename = filename.unwrap_or(COMPILED_FILE);

        if !self.has("compiled") {
            let target = dir.join(filename).to_string_lossy().into_owned();
            self.items.set("compiled", target);
        }
        let written = io::export_file(self.all(), &dir, "*", Format::Json, Some(filename));
        self.items.forget("compiled");

        let written = written?;
        tracing::debug!(path = %written.display(), "compiled config");
        Ok(written)
    }

    /// Set every top-level key of the compiled file for `path`.
    pub fn import_compiled_file(&mut self, path: impl AsRef<Path>) -> Result<(), DottedError> {
        let file = self.compile_dir(path.as_ref()).join(COMPILED_FILE);
        match io::read_file(&file, Format::Json)? {
            Value::Object(items) => {
                for (key, item) in items {
                    self.items.set(&key, item);
                }
                Ok(())
            }
            _ => Err(DottedError::MalformedImport),
        }
    }

    /// True if a compiled file exists for `path`.
    pub fn is_compiled(&self, path: impl AsRef<Path>) -> bool {
        self.compile_dir(path.as_ref()).join(COMPILED_FILE).is_file()
    }

    pub fn set_base_path(&mut self, path: impl Into<PathBuf>) -> Result<&mut Self, DottedError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(DottedError::InvalidBasePath(path));
        }
        self.base_path = Some(path);
        Ok(self)
    }

    pub fn set_compile_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.compile_path = Some(path.into());
        self
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Deep-merge `items` over the current items.
    pub fn merge_deep(&mut self, items: Items) -> &mut Self {
        let merged = deep_merge(std::mem::take(self.items.items_mut()), items);
        *self.items.items_mut() = merged;
        self
    }

    /// Deep-merge `PREFIX__A__B=value` variables as `a.b = value`.
    pub fn merge_env(
        &mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> &mut Self {
        let overlay = Environment::from_vars(vars, DEFAULT_ENVIRONMENT_KEY).prefixed(prefix);
        self.merge_deep(overlay)
    }

    /// Dotted `(key, value)` pairs for every leaf.
    pub fn flatten(&self) -> Vec<(String, Value)> {
        crate::flatten::flatten(self.all())
    }

    /// Deserialize the items into `T`. Keys `T` does not name are ignored.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, DottedError> {
        Ok(serde_json::from_value(self.to_array())?)
    }

    /// Deserialize the items into `T`, failing with
    /// [`DottedError::UnknownKeys`] if any key is not consumed by `T`.
    pub fn extract_strict<T: DeserializeOwned>(&self) -> Result<T, DottedError> {
        let mut unknown = Vec::new();
        let extracted = serde_ignored::deserialize(self.to_array(), |ignored| {
            unknown.push(ignored.to_string());
        })?;
        if unknown.is_empty() {
            Ok(extracted)
        } else {
            Err(DottedError::UnknownKeys(unknown))
        }
    }

    pub fn to_array(&self) -> Value {
        value::to_value(self.all().clone())
    }

    pub fn to_json(&self) -> Result<String, DottedError> {
        self.items.to_json()
    }
}

impl From<Items> for Config {
    fn from(items: Items) -> Self {
        Self::new(items)
    }
}

impl ImportItems for Config {
    fn items_mut(&mut self) -> &mut Items {
        self.items.items_mut()
    }
}

impl ExportItems for Config {
    fn items(&self) -> &Items {
        self.all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{APP_TOML, AppSettings, DB_JSON, DatabaseSettings};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn config_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.toml"), APP_TOML).unwrap();
        fs::write(dir.path().join("cache.toml"), "driver = \"file\"\n").unwrap();
        fs::write(dir.path().join("db.json"), DB_JSON).unwrap();
        dir
    }

    #[test]
    fn dot_path_access() {
        let mut config = Config::default();
        config.put("database.pool.size", 5);
        assert_eq!(config.get("database.pool.size", Value::Null), json!(5));
        assert!(config.has("database"));
        assert!(!config.has("database.pool"));
        assert!(config.has_path("database.pool"));

        config.forget("database.pool");
        assert!(!config.has_path("database.pool"));
        assert_eq!(config.get("database.pool.size", json!("none")), json!("none"));
    }

    #[test]
    fn append_rejects_existing_keys() {
        let mut config = Config::new(crate::value::into_items(json!({"a": 1})));
        config.append("b", 2).unwrap();
        assert!(matches!(config.append("a", 3), Err(DottedError::KeyExists(_))));
        assert_eq!(config.get("a", Value::Null), json!(1));
    }

    #[test]
    fn import_array_uses_dot_paths() {
        let mut config = Config::default();
        config.import_array(crate::value::into_items(json!({"app.name": "dotted", "debug": true})));
        assert_eq!(config.to_array(), json!({"app": {"name": "dotted"}, "debug": true}));
    }

    #[test]
    fn folder_import_keys_by_base_name() {
        let dir = config_dir();
        let config = Config::create_from_folder(dir.path()).unwrap();
        assert_eq!(config.get("app.database.port", Value::Null), json!(5432));
        assert_eq!(config.get("cache.driver", Value::Null), json!("file"));
        assert!(!config.has("db"));
        let keys: Vec<&String> = config.all().keys().collect();
        assert_eq!(keys, ["app", "cache"]);
    }

    #[test]
    fn folder_import_with_other_mask() {
        let dir = config_dir();
        let mut config = Config::default();
        config.import_folder(dir.path(), "*.json").unwrap();
        assert_eq!(config.get("db.models.home", Value::Null), json!("HomeModel"));
        assert!(!config.has("app"));
    }

    #[test]
    fn folder_keys_keep_file_name_case() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Database.json"), DB_JSON).unwrap();
        std::fs::write(dir.path().join("Cache.JSON"), r#"{"driver": "file"}"#).unwrap();
        let mut config = Config::default();
        config.import_folder(dir.path(), "*.json").unwrap();
        let keys: Vec<&String> = config.all().keys().collect();
        assert_eq!(keys, ["Cache", "Database"]);
        assert_eq!(config.get("Database.models.home", Value::Null), json!("HomeModel"));
    }

    #[test]
    fn existing_keys_are_not_reimported() {
        let dir = config_dir();
        let mut config = Config::new(crate::value::into_items(json!({"cache": "kept"})));
        config.import_folder(dir.path(), DEFAULT_MASK).unwrap();
        assert_eq!(config.get("cache", Value::Null), json!("kept"));
        assert!(config.has("app"));
    }

    #[test]
    fn invalid_extension() {
        let err = Config::default()
            .import_by_extension("*.ini", "settings.ini", "settings")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid import extension: `.ini`");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::default()
            .import_by_extension(".json", "/no/such/file.json", "file")
            .unwrap_err();
        assert!(matches!(err, DottedError::FileNotFound(_)));
    }

    #[test]
    fn files_are_found_under_the_base_path() {
        let dir = config_dir();
        let mut config = Config::default();
        config.set_base_path(dir.path()).unwrap();
        config.import_by_extension(".json", "db.json", "database").unwrap();
        assert_eq!(config.get("database.driver", Value::Null), json!("sqlite"));

        config.import_file("app.toml").unwrap();
        assert_eq!(config.get("app.title", Value::Null), json!("dotted"));
    }

    #[test]
    fn base_path_must_be_a_directory() {
        let err = Config::default().set_base_path("/no/such/dir").unwrap_err();
        assert!(matches!(err, DottedError::InvalidBasePath(_)));
        assert!(err.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn compile_and_reload() {
        let dir = config_dir();
        let mut config = Config::create_from_folder(dir.path()).unwrap();
        assert!(!config.is_compiled(dir.path()));

        let written = config.compile(dir.path(), None).unwrap();
        assert_eq!(written, dir.path().join(COMPILED_FILE));
        assert!(config.is_compiled(dir.path()));
        assert!(!config.has("compiled"));

        // The compiled file now stands in for the folder.
        fs::remove_file(dir.path().join("cache.toml")).unwrap();
        let reloaded = Config::create_from_folder(dir.path()).unwrap();
        assert_eq!(reloaded.get("cache.driver", Value::Null), json!("file"));
        assert_eq!(
            reloaded.get("compiled", Value::Null),
            json!(written.to_string_lossy())
        );
    }

    #[test]
    fn compile_path_overrides_folder() {
        let dir = config_dir();
        let out = TempDir::new().unwrap();
        let mut config = Config::create_from_folder(dir.path()).unwrap();
        config.set_compile_path(out.path());
        let written = config.compile("ignored", Some("all.json")).unwrap();
        assert_eq!(written, out.path().join("all.json"));
    }

    #[test]
    fn compile_into_missing_dir_fails() {
        let mut config = Config::new(crate::value::into_items(json!({"a": 1})));
        let err = config.compile("/no/such/dir", None).unwrap_err();
        assert!(matches!(err, DottedError::ExportWrite(_)));
        assert!(!config.has("compiled"));
    }

    #[test]
    fn create_from_sources() {
        let config = Config::create_from_json(DB_JSON).unwrap();
        assert_eq!(config.get("models.user", Value::Null), json!("UserModel"));

        let config = Config::create_from_toml(APP_TOML).unwrap();
        assert_eq!(config.get("database.pool.size", Value::Null), json!(5));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn create_from_yaml() {
        let config = Config::create_from_yaml(crate::fixtures::test::TEST_YAML).unwrap();
        assert_eq!(config.get("address.city", Value::Null), json!("Vancouver"));
    }

    #[test]
    fn env_overlay() {
        let mut config = Config::create_from_toml(APP_TOML).unwrap();
        config.merge_env(
            "MYAPP",
            vec![
                ("MYAPP__DATABASE__PORT".to_string(), "6543".to_string()),
                ("OTHER__X".to_string(), "1".to_string()),
            ],
        );
        assert_eq!(config.get("database.port", Value::Null), json!(6543));
        assert_eq!(config.get("database.host", Value::Null), json!("localhost"));
        assert!(!config.has("x"));
    }

    #[test]
    fn flatten_leaves() {
        let config = Config::create_from_toml(APP_TOML).unwrap();
        let keys: Vec<String> = config.flatten().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["title", "database.host", "database.port", "database.pool.size"]
        );
    }

    #[test]
    fn extract_ignores_extra_keys() {
        let config = Config::create_from_toml(APP_TOML).unwrap();
        let settings: AppSettings = config.extract().unwrap();
        assert_eq!(
            settings.database,
            DatabaseSettings {
                host: "localhost".into(),
                port: 5432
            }
        );
    }

    #[test]
    fn extract_strict_reports_unknown_keys() {
        let config = Config::create_from_toml(APP_TOML).unwrap();
        let err = config.extract_strict::<AppSettings>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown keys: database.pool");

        let mut clean = config.copy();
        clean.forget("database.pool");
        assert!(clean.extract_strict::<AppSettings>().is_ok());
        assert!(config.has_path("database.pool"));
    }

    #[test]
    fn exports() {
        let dir = TempDir::new().unwrap();
        let config = Config::create_from_json(DB_JSON).unwrap();
        let written = config.export_file(dir.path(), "models", Format::Toml, None).unwrap();
        assert_eq!(written, dir.path().join("models.toml"));
        let back = Config::create_from_toml(written.to_str().unwrap()).unwrap();
        assert_eq!(back.get("home", Value::Null), json!("HomeModel"));
    }
}
