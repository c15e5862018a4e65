use crate::error::DottedError;
use crate::value::Value;

/// A text format items can be imported from and exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    Toml,
}

impl Format {
    /// Pick a format from a file extension or mask: `"json"`, `".yml"`, `"*.toml"`.
    pub fn from_extension(extension: &str) -> Result<Self, DottedError> {
        let normalized = extension.replace('*', "").to_ascii_lowercase();
        match normalized.trim_start_matches('.') {
            "json" => Ok(Format::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            _ => Err(DottedError::InvalidExtension(normalized)),
        }
    }

    /// The canonical extension, with its leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => ".json",
            #[cfg(feature = "yaml")]
            Format::Yaml => ".yml",
            Format::Toml => ".toml",
        }
    }

    pub fn decode(self, text: &str) -> Result<Value, DottedError> {
        match self {
            Format::Json => Ok(serde_json::from_str(text)?),
            #[cfg(feature = "yaml")]
            Format::Yaml => Ok(serde_yaml::from_str(text)?),
            Format::Toml => Ok(toml::from_str(text)?),
        }
    }

    /// Render a value. JSON output is pretty-printed.
    pub fn encode(self, value: &Value) -> Result<String, DottedError> {
        match self {
            Format::Json => Ok(serde_json::to_string_pretty(value)?),
            #[cfg(feature = "yaml")]
            Format::Yaml => Ok(serde_yaml::to_string(value)?),
            Format::Toml => Ok(toml::to_string(value)?),
        }
    }
}
