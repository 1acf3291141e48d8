//! Translation bundle: one locale's nested key → string tree.

use std::collections::HashMap;

use serde_json::{
    Map,
    Value,
};

use crate::types::LocaleId;

/// A parsed translation bundle.
///
/// Bundles are fetched per switch and never merged; a new bundle replaces
/// the previous one entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBundle {
    /// Locale the bundle was loaded for
    locale: LocaleId,
    /// Top-level object
    root: Map<String, Value>,
}

impl TranslationBundle {
    /// Wraps a JSON value. Only objects are valid bundles.
    ///
    /// # Errors
    /// Returns the JSON type name when `value` is not an object.
    pub fn from_value(locale: LocaleId, value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Object(root) => Ok(Self { locale, root }),
            Value::Array(_) => Err("array"),
            Value::String(_) => Err("string"),
            Value::Number(_) => Err("number"),
            Value::Bool(_) => Err("boolean"),
            Value::Null => Err("null"),
        }
    }

    #[must_use]
    pub const fn locale(&self) -> &LocaleId {
        &self.locale
    }

    /// Resolves a key path such as `"nav.home"` by walking nested objects.
    ///
    /// Only non-empty string leaves resolve. Missing segments, non-object
    /// intermediates and non-string leaves yield `None`.
    #[must_use]
    pub fn resolve(&self, key_path: &str, separator: &str) -> Option<&str> {
        let mut segments = key_path.split(separator);
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str().filter(|text| !text.is_empty())
    }

    /// Number of leaves in the bundle.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.flatten(".").len()
    }

    /// Flattens the tree into separator-joined key paths.
    ///
    /// Arrays are indexed as `key[0]`; non-string scalars are rendered as JSON.
    #[must_use]
    pub fn flatten(&self, separator: &str) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for (key, value) in &self.root {
            flatten_value(value, separator, key, &mut result);
        }
        result
    }
}

fn flatten_value(value: &Value, separator: &str, prefix: &str, result: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_value(child, separator, &format!("{prefix}{separator}{key}"), result);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_value(child, separator, &format!("{prefix}[{index}]"), result);
            }
        }
        Value::String(s) => {
            result.insert(prefix.to_string(), s.clone());
        }
        _ => {
            result.insert(prefix.to_string(), value.to_string());
        }
    }
}
