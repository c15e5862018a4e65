use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DottedError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    ImmutableViolation(String),

    #[error("You requested {requested} items, but there are only {available} items in the collection")]
    OutOfRange { requested: usize, available: usize },

    #[error("Attribute '{0}' does not exist.")]
    AttributeNotFound(String),

    #[error("Cannot append an already existing key: '{0}'")]
    KeyExists(String),

    #[error("Plug-in {0} does not exist.")]
    PluginNotFound(String),

    #[error("Append requires that the target be an array. {0} given.")]
    AppendNotPossible(&'static str),

    #[error("Prepend requires that the target be an array. {0} given.")]
    PrependNotPossible(&'static str),

    #[error("Base environment setting ({0}) not found.")]
    InvalidEnvironmentKey(String),

    #[error("Invalid import extension: `{0}`")]
    InvalidExtension(String),

    #[error("Config base path `{}` does not exist.", .0.display())]
    InvalidBasePath(PathBuf),

    #[error("Import failed due to malformed source or missing key.")]
    MalformedImport,

    #[error("Failed exporting `{}` - cannot write contents.", .0.display())]
    ExportWrite(PathBuf),

    #[error("Config file {} does not exist.", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid .env file {}: {source}", path.display())]
    Dotenv {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Cannot render TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Unknown keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),
}

impl DottedError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DottedError::Validation(message.into())
    }
}
