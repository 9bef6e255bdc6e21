//! Model catalog: résumé models kept in static storage.
//!
//! Layout of the models directory:
//! - `list.json`: `{"models": [ModelEntry, ...]}`
//! - `<name>.json`: the model schema
//! - `<name>.md`: the model template (optional; falls back to the built-in default)

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::template::{Schema, SchemaError, DEFAULT_TEMPLATE};

pub const LIST_FILE: &str = "list.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("model '{0}' not found")]
    NotFound(String),

    #[error("invalid model file name '{0}'")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema in {file}: {source}")]
    Schema {
        file: String,
        #[source]
        source: SchemaError,
    },
}

/// One entry of `list.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub description: String,
    pub file: String,
    pub created_at: NaiveDate,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsList {
    pub models: Vec<ModelEntry>,
}

impl ModelsList {
    pub fn contains(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }
}

/// A model ready for editing: raw and parsed schema plus its template.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub file: String,
    pub schema_json: Value,
    pub schema: Schema,
    pub template: String,
    /// True when the model's own template was unavailable and
    /// [`DEFAULT_TEMPLATE`] was substituted.
    pub template_fallback: bool,
}

/// Reads models from a directory. Cheap to clone; holds only the path.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    root: PathBuf,
}

impl ModelCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn list(&self) -> Result<ModelsList, CatalogError> {
        let path = self.root.join(LIST_FILE);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No {LIST_FILE} in {}; catalog is empty", self.root.display());
                return Ok(ModelsList::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
            file: LIST_FILE.to_string(),
            source,
        })
    }

    /// Loads `<file>` (a bare `*.json` name) and its sibling template.
    pub async fn load(&self, file: &str) -> Result<LoadedModel, CatalogError> {
        let file = validate_file_name(file)?;

        let raw = match tokio::fs::read_to_string(self.root.join(file)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(file.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let schema_json: Value = serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
            file: file.to_string(),
            source,
        })?;
        let schema = Schema::from_json(&schema_json).map_err(|source| CatalogError::Schema {
            file: file.to_string(),
            source,
        })?;

        let template_file = template_file_name(file);
        let (template, template_fallback) =
            match tokio::fs::read_to_string(self.root.join(&template_file)).await {
                Ok(template) if !template.trim().is_empty() => (template, false),
                Ok(_) => {
                    warn!("Template {template_file} is empty, using default template");
                    (DEFAULT_TEMPLATE.to_string(), true)
                }
                Err(e) => {
                    warn!("Template {template_file} unavailable ({e}), using default template");
                    (DEFAULT_TEMPLATE.to_string(), true)
                }
            };

        debug!(
            "Loaded model {file}: {} fields, fallback template: {template_fallback}",
            schema.fields().count()
        );

        Ok(LoadedModel {
            file: file.to_string(),
            schema_json,
            schema,
            template,
            template_fallback,
        })
    }
}

/// Accepts bare `*.json` names only, so requests cannot walk out of the
/// models directory.
pub fn validate_file_name(file: &str) -> Result<&str, CatalogError> {
    let stem = file.strip_suffix(".json").unwrap_or_default();
    let valid = !stem.is_empty()
        && !stem.starts_with('.')
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid && file != LIST_FILE {
        Ok(file)
    } else {
        Err(CatalogError::InvalidName(file.to_string()))
    }
}

/// `backend.json` → `backend.md`.
pub fn template_file_name(file: &str) -> String {
    match file.strip_suffix(".json") {
        Some(stem) => format!("{stem}.md"),
        None => format!("{file}.md"),
    }
}
