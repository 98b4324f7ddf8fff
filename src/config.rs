//! Build configuration store.
//!
//! The configuration is a flat JSON object produced by the project's
//! configuration step. Keys are lower-case identifiers; values are strings,
//! booleans or other JSON scalars. The store is read-only once loaded and is
//! threaded explicitly through every phase that needs it.
//!
//! ```
//! use modresolve::config::ConfigStore;
//!
//! let config = ConfigStore::from_json_str(r#"{"debug": true, "cc": "gcc"}"#)?;
//! assert!(config.get_bool("debug")?);
//! assert_eq!(config.get_string("cc")?, "gcc");
//! # Ok::<(), modresolve::config::ConfigError>(())
//! ```

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use thiserror::Error;

/// Errors raised while loading or querying the configuration store.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    #[diagnostic(code(modresolve::config::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not a JSON object.
    #[error("failed to parse configuration {name}")]
    #[diagnostic(
        code(modresolve::config::parse),
        help("the configuration must be a single JSON object of key/value pairs")
    )]
    Parse {
        /// Display name of the configuration source.
        name: String,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },

    /// A required key is absent.
    #[error("configuration key `{key}` is not set")]
    #[diagnostic(code(modresolve::config::missing_key))]
    MissingKey {
        /// Key that was requested.
        key: String,
    },

    /// A key holds a value of the wrong JSON type.
    #[error("configuration key `{key}` must be a {expected}, found {found}")]
    #[diagnostic(code(modresolve::config::wrong_type))]
    WrongType {
        /// Key that was requested.
        key: String,
        /// Expected JSON type.
        expected: &'static str,
        /// JSON value actually stored.
        found: String,
    },
}

/// Read-only key/value configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigStore {
    values: IndexMap<String, JsonValue>,
}

impl ConfigStore {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not a JSON object.
    pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let data = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let store = Self::parse_named(&data, path_ref.as_str())?;
        tracing::debug!(path = %path_ref, keys = store.len(), "loaded configuration");
        Ok(store)
    }

    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `json` is not a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::parse_named(json, "<string>")
    }

    fn parse_named(json: &str, name: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            name: name.to_owned(),
            source,
        })
    }

    /// Number of keys in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Raw JSON value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Look up a required string value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn get_string(&self, key: &str) -> Result<&str, ConfigError> {
        self.get_optional_string(key)?
            .ok_or_else(|| ConfigError::MissingKey { key: key.to_owned() })
    }

    /// Look up an optional string value. Missing keys and empty strings both
    /// yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WrongType`] when the value is not a string.
    pub fn get_optional_string(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.values.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(value)) if value.is_empty() => Ok(None),
            Some(JsonValue::String(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }

    /// Look up a required boolean value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self.values.get(key) {
            None => Err(ConfigError::MissingKey { key: key.to_owned() }),
            Some(JsonValue::Bool(value)) => Ok(*value),
            Some(other) => Err(wrong_type(key, "boolean", other)),
        }
    }

    /// Look up a selector flag; an absent key reads as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WrongType`] when the value is not a boolean.
    pub fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.values.get(key) {
            None | Some(JsonValue::Null) => Ok(false),
            Some(JsonValue::Bool(value)) => Ok(*value),
            Some(other) => Err(wrong_type(key, "boolean", other)),
        }
    }

    /// Iterate over every key/value pair in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigStore
where
    K: Into<String>,
    V: Into<JsonValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &JsonValue) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_owned(),
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn store() -> ConfigStore {
        ConfigStore::from_iter([
            ("cc", JsonValue::from("gcc")),
            ("empty", JsonValue::from("")),
            ("debug", JsonValue::from(true)),
            ("jobs", JsonValue::from(4)),
        ])
    }

    #[rstest]
    fn strings_and_bools_are_typed() {
        let config = store();
        assert_eq!(config.get_string("cc").expect("cc"), "gcc");
        assert!(config.get_bool("debug").expect("debug"));
        assert!(matches!(
            config.get_bool("cc"),
            Err(ConfigError::WrongType { expected: "boolean", .. })
        ));
        assert!(matches!(
            config.get_string("jobs"),
            Err(ConfigError::WrongType { expected: "string", .. })
        ));
    }

    #[rstest]
    fn empty_strings_read_as_unset() {
        let config = store();
        assert_eq!(config.get_optional_string("empty").expect("empty"), None);
        assert!(matches!(
            config.get_string("empty"),
            Err(ConfigError::MissingKey { .. })
        ));
    }

    #[rstest]
    #[case("debug", true)]
    #[case("absent", false)]
    fn flags_default_to_false(#[case] key: &str, #[case] expected: bool) {
        assert_eq!(store().flag(key).expect("flag"), expected);
    }

    #[rstest]
    fn parse_rejects_non_objects() {
        let err = ConfigStore::from_json_str("[1, 2]").expect_err("array");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[rstest]
    fn parse_preserves_key_order() {
        let config = ConfigStore::from_json_str(r#"{"z": 1, "a": 2}"#).expect("parse");
        let keys: Vec<_> = config.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
