//! Model schema: the JSON document that declares which fields a template
//! expects and which placeholder each one renders as.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::template::tokens;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema root must be a JSON object")]
    NotAnObject,
}

/// Shape of one schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// A single placeholder, e.g. `"summary": "{{summary}}"`.
    Scalar(String),
    /// Named scalars, e.g. contact details or skills, with their placeholders.
    Group(Vec<(String, String)>),
    /// Same-shaped records. `fields` is the union of record keys in first-seen
    /// order; `rows` holds each declared record's placeholders.
    Repeatable {
        fields: Vec<String>,
        rows: Vec<Vec<(String, String)>>,
    },
}

/// Ordered mapping from field name to [`FieldSpec`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Builds a schema from a JSON object. Members that are neither strings,
    /// objects nor arrays are skipped.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        let Value::Object(root) = value else {
            return Err(SchemaError::NotAnObject);
        };

        let mut fields = Vec::with_capacity(root.len());
        for (key, member) in root {
            let spec = match member {
                Value::String(placeholder) => FieldSpec::Scalar(placeholder.clone()),
                Value::Object(members) => FieldSpec::Group(string_members(key, members)),
                Value::Array(items) => repeatable(key, items),
                other => {
                    warn!("Skipping schema field '{key}': unsupported type {}", kind(other));
                    continue;
                }
            };
            fields.push((key.clone(), spec));
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(key, spec)| (key.as_str(), spec))
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, spec)| spec)
    }

    /// Every placeholder token name the schema declares, in schema order.
    pub fn placeholders(&self) -> Vec<String> {
        let mut declared = String::new();
        for (_, spec) in &self.fields {
            match spec {
                FieldSpec::Scalar(placeholder) => declared.push_str(placeholder),
                FieldSpec::Group(members) => {
                    for (_, placeholder) in members {
                        declared.push_str(placeholder);
                    }
                }
                FieldSpec::Repeatable { rows, .. } => {
                    for (_, placeholder) in rows.iter().flatten() {
                        declared.push_str(placeholder);
                    }
                }
            }
            declared.push('\n');
        }
        tokens::token_names(&declared)
    }
}

/// Placeholders the schema declares but `template` never mentions.
pub fn unused_placeholders(schema: &Schema, template: &str) -> Vec<String> {
    let used = tokens::token_names(template);
    schema
        .placeholders()
        .into_iter()
        .filter(|name| !used.contains(name))
        .collect()
}

fn string_members(field: &str, members: &Map<String, Value>) -> Vec<(String, String)> {
    members
        .iter()
        .filter_map(|(name, value)| match value {
            Value::String(placeholder) => Some((name.clone(), placeholder.clone())),
            other => {
                warn!(
                    "Skipping schema field '{field}.{name}': expected string, got {}",
                    kind(other)
                );
                None
            }
        })
        .collect()
}

fn repeatable(field: &str, items: &[Value]) -> FieldSpec {
    let mut fields: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(members) = item else {
            warn!("Skipping non-object record in schema field '{field}'");
            continue;
        };
        let row = string_members(field, members);
        for (name, _) in &row {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
        rows.push(row);
    }
    FieldSpec::Repeatable { fields, rows }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
