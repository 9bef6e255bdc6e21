//! User-entered form data and token resolution against it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entry fields that decide whether a Repeatable record counts as filled.
pub const PRIMARY_ENTRY_FIELDS: &[&str] = &["company", "role"];

/// Form data mirroring the shape of a model schema: scalars, groups of
/// scalars, and lists of records.
///
/// Kept as raw JSON so a value whose shape disagrees with the schema reads as
/// empty instead of failing to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(Map<String, Value>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps any JSON value; non-objects become empty form data.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }

    #[cfg(test)]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Sets a top-level field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Text of a top-level scalar; empty when absent or not a scalar.
    pub fn scalar(&self, key: &str) -> String {
        self.0.get(key).map(text).unwrap_or_default()
    }

    /// Sub-fields of a group in declaration order. Anything but an object
    /// yields no fields.
    pub fn group(&self, key: &str) -> Vec<(&str, String)> {
        match self.0.get(key) {
            Some(Value::Object(fields)) => fields
                .iter()
                .map(|(name, value)| (name.as_str(), text(value)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Records of a Repeatable field. Non-lists yield nothing; non-object
    /// items are skipped.
    pub fn entries(&self, key: &str) -> Vec<Entry<'_>> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().map(Entry))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Resolves a placeholder name to its text.
    ///
    /// Lookup order: dotted path (`contact.email`), top-level scalar,
    /// group-prefixed key (`skills_cloud` → `skills.cloud`), then a bare
    /// sub-key of any group (`email` → `contact.email`).
    pub fn resolve(&self, token: &str) -> Option<String> {
        if token.contains('.') {
            return self.resolve_path(token);
        }

        if let Some(value) = self.0.get(token) {
            if is_scalar(value) {
                return Some(text(value));
            }
        }

        for (group, value) in &self.0 {
            let Value::Object(fields) = value else {
                continue;
            };
            let Some(rest) = token
                .strip_prefix(group.as_str())
                .and_then(|r| r.strip_prefix('_'))
            else {
                continue;
            };
            if let Some(value) = fields.get(rest).filter(|v| is_scalar(v)) {
                return Some(text(value));
            }
        }

        self.0.values().find_map(|value| match value {
            Value::Object(fields) => fields.get(token).filter(|v| is_scalar(v)).map(text),
            _ => None,
        })
    }

    fn resolve_path(&self, path: &str) -> Option<String> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(fields) => fields.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        is_scalar(current).then(|| text(current))
    }
}

/// One record of a Repeatable field.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a>(&'a Map<String, Value>);

impl Entry<'_> {
    pub fn field(&self, name: &str) -> String {
        self.0.get(name).map(text).unwrap_or_default()
    }

    /// True when any primary field holds non-blank text.
    pub fn is_filled(&self) -> bool {
        PRIMARY_ENTRY_FIELDS
            .iter()
            .any(|name| !self.field(name).trim().is_empty())
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Display text of a scalar JSON value. Other shapes read as empty.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
