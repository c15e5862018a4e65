//! Ordered collections with dot-notation access, file import and export, and
//! a family of immutable value structures.
//!
//! Every type here is a thin layer over one ordered mapping of string keys to
//! [`Value`]s. Nested levels are addressed with dot-paths:
//!
//! ```ignore
//! let mut config = Config::create_from_folder("config")?;
//! let port = config.get("app.database.port", Value::Null);
//! config.put("app.database.pool.size", 10);
//! ```
//!
//! # Data model
//!
//! [`Items`] is a `serde_json::Map` built with `preserve_order`, so iteration
//! follows insertion order. Integer keys are stored as their decimal strings
//! (`"0"`, `"12"`). A mapping whose keys are exactly `"0".."n-1"` is a
//! **list** and converts to a JSON array; everything else converts to an
//! object.
//!
//! Sorting and comparison follow one total order over values (see
//! [`value::compare`]): `null < bool < number < string < array < object`.
//! Loose equality compares numeric strings as numbers, and `array_merge`
//! renumbers integer keys while string keys overwrite.
//!
//! # Dot-paths
//!
//! | Path | Meaning |
//! |------|---------|
//! | `db.models.home` | key `home` inside `models` inside `db` |
//! | `records.0.price` | `price` of the first element of `records` |
//! | `records.*.price` | every record's `price`, as a list |
//!
//! Lookups never fail: a missing segment yields the caller's default. See the
//! [`path`] module.
//!
//! # Wrappers
//!
//! - [`Collection`]: general sequence and map operations (filter, sort,
//!   group, pluck, slice, chunk and friends). Most return a new collection.
//! - [`Scope`]: a mutable bag of items plus named plug-in functions.
//! - [`Config`]: files, folders, compiled snapshots, environment overlays,
//!   and typed extraction with an optional strict mode.
//! - [`Paths`]: directory paths normalized to their canonical form on write.
//! - [`Attributes`]: set-once items. After population no key is added,
//!   overwritten or removed.
//! - [`Repository`]: dot-path storage with array append and prepend.
//!
//! # Immutable structures
//!
//! The [`structure`] module holds [`Dictionary`], [`SortedDictionary`],
//! [`Set`], [`OrderedList`] and [`UnorderedList`]. Every mutator returns a
//! new value and leaves the receiver alone. Storage is reference counted, so
//! a mutator that changes nothing hands back a structure that shares the
//! receiver's storage.
//!
//! # Formats
//!
//! JSON and TOML are always available. YAML sits behind the `yaml` Cargo
//! feature, on by default:
//!
//! ```toml
//! dotted = { version = "...", default-features = false }
//! ```
//!
//! Import sources are file paths or literal text. An import with an empty key
//! merges a keyed mapping into the items; anything else is stored under the
//! key. See [`io`].
//!
//! # Environment
//!
//! [`Environment`] reads variables from explicit `(name, value)` pairs so
//! tests never touch the process environment. With prefix `MYAPP`:
//!
//! | Env var | Key |
//! |---------|-----|
//! | `MYAPP__HOST` | `host` |
//! | `MYAPP__DATABASE__URL` | `database.url` |
//!
//! # Logging
//!
//! File reads, folder imports, compiles and exports are logged with
//! [`tracing`] at `debug`; skipped files at `trace`. No subscriber is
//! installed.
//!
//! # Error handling
//!
//! All fallible operations return [`DottedError`]. See the [`error`] module
//! for the full set.

pub mod attributes;
pub mod collection;
pub mod config;
pub mod env;
pub mod error;
pub mod flatten;
pub mod format;
pub mod helpers;
pub mod io;
pub(crate) mod merge;
pub mod path;
pub mod paths;
pub mod repository;
pub mod scope;
pub mod structure;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use attributes::Attributes;
pub use collection::{By, Collection, Sample};
pub use config::Config;
pub use env::Environment;
pub use error::DottedError;
pub use format::Format;
pub use io::{ExportItems, ImportItems};
pub use paths::Paths;
pub use repository::Repository;
pub use scope::Scope;
pub use structure::{Dictionary, OrderedList, Set, SortedDictionary, Structure, UnorderedList};
pub use value::{Items, Value};
