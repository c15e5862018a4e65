//! Environment variables: typed lookups, `.env` files, and prefixed overlays.
//!
//! Every constructor takes `(name, value)` pairs so tests can pass synthetic
//! data instead of `std::env::vars()`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::DottedError;
use crate::path;
use crate::value::{Items, Value};

const DEFAULT_APP_KEY: &str = "$invalid$this&key%must#be@changed";

/// Coerce a raw environment string into a value.
///
/// `true`/`(true)` and `false`/`(false)` become booleans, `empty`/`(empty)`
/// becomes `""`, and `null`/`(null)` becomes `null`. Matching ignores case.
/// A value wrapped in double quotes is unwrapped. Anything else stays a string.
pub fn coerce_env_value(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "(true)" => return Value::Bool(true),
        "false" | "(false)" => return Value::Bool(false),
        "empty" | "(empty)" => return Value::String(String::new()),
        "null" | "(null)" => return Value::Null,
        _ => {}
    }
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    Value::String(unquoted.to_string())
}

/// Typing for overlay values: literals as in [`coerce_env_value`], then
/// integers, then decimals. Decimals need a `.` so `NaN` and `inf` stay
/// strings.
fn overlay_value(raw: &str) -> Value {
    let text = match coerce_env_value(raw) {
        Value::String(text) => text,
        literal => return literal,
    };
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    if text.contains('.')
        && let Ok(f) = text.parse::<f64>()
        && f.is_finite()
    {
        return Value::from(f);
    }
    Value::String(text)
}

/// The environment key used when none is given.
pub const DEFAULT_ENVIRONMENT_KEY: &str = "APP_ENV";

/// A snapshot of environment variables keyed by an environment key such as
/// `APP_ENV`.
#[derive(Debug, Clone)]
pub struct Environment {
    vars: HashMap<String, String>,
    environment_key: String,
    environment: Value,
    detected: Option<Items>,
}

impl Environment {
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>, key: &str) -> Self {
        let mut env = Self {
            vars: vars.into_iter().collect(),
            environment_key: key.to_string(),
            environment: Value::Null,
            detected: None,
        };
        env.environment = env.get(key, Value::Null);
        env
    }

    /// Snapshot the current process environment.
    pub fn from_process(key: &str) -> Self {
        Self::from_vars(std::env::vars(), key)
    }

    /// Overlay the variables of a `.env` file. File values win.
    pub fn with_dotenv(mut self, file: &Path) -> Result<Self, DottedError> {
        let invalid = |source: dotenvy::Error| DottedError::Dotenv {
            path: file.to_path_buf(),
            source,
        };
        let mut count = 0;
        for pair in dotenvy::from_path_iter(file).map_err(invalid)? {
            let (name, value) = pair.map_err(invalid)?;
            self.vars.insert(name, value);
            count += 1;
        }
        tracing::debug!(path = %file.display(), count, "loaded .env file");
        self.environment = self.get(&self.environment_key, Value::Null);
        Ok(self)
    }

    /// Items built from the variables named `{prefix}__*`.
    ///
    /// Each further `__` opens a nesting level and segments are lowercased,
    /// so `MYAPP__DATABASE__URL` lands at `database.url`. A single `_` stays
    /// part of the key.
    pub fn prefixed(&self, prefix: &str) -> Items {
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();

        let mut items = Items::new();
        for name in names {
            let Some(rest) = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix("__"))
                .filter(|rest| !rest.is_empty())
            else {
                continue;
            };
            let dotted = rest
                .split("__")
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(".");
            path::assign(&mut items, &dotted, overlay_value(&self.vars[name]));
        }
        items
    }

    pub fn environment_key(&self) -> &str {
        &self.environment_key
    }

    /// The value of the environment key at construction (or `null`).
    pub fn environment(&self) -> &Value {
        &self.environment
    }

    /// True if the upper-cased key is set to a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.vars
            .get(&key.to_uppercase())
            .is_some_and(|raw| !coerce_env_value(raw).is_null())
    }

    /// Look up a key. Detected settings are checked before raw variables.
    /// `"*"` returns the detected settings.
    pub fn get(&self, key: &str, default: Value) -> Value {
        if key == "*" {
            return self
                .detected
                .clone()
                .map_or(Value::Null, Value::Object);
        }
        if let Some(detected) = self.detected.as_ref().and_then(|d| d.get(key)) {
            return detected.clone();
        }
        match self.vars.get(key) {
            Some(raw) => coerce_env_value(raw),
            None => default,
        }
    }

    /// The standard settings derived from the environment, without requiring
    /// the environment key to be present.
    pub fn settings(&self) -> Items {
        let mut items = Items::new();
        let app_env = self.get("APP_ENV", Value::from("PRODUCTION"));
        items.insert(
            "developing".into(),
            Value::Bool(app_env != Value::from("PRODUCTION")),
        );
        items.insert("app_key".into(), self.get("APP_KEY", Value::from(DEFAULT_APP_KEY)));
        items.insert("debugging".into(), self.get("DEBUG", Value::Bool(false)));
        items.insert("testing".into(), self.get("TESTING", Value::Bool(false)));
        items
    }

    /// Derive and remember the standard settings.
    ///
    /// Fails if the environment key itself is not set.
    pub fn detect_environment(&mut self) -> Result<Items, DottedError> {
        if !self.has(&self.environment_key) {
            return Err(DottedError::InvalidEnvironmentKey(
                self.environment_key.clone(),
            ));
        }
        let settings = self.settings();
        self.detected = Some(settings.clone());
        Ok(settings)
    }
}
