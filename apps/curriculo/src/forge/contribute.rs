//! Turns a model submitted from the editor into a pull request against the
//! models directory of the repository.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{ser::PrettyFormatter, Value};
use tracing::info;

use super::{FileWrite, ForgeError, PullRequestCreated, PullRequestDraft, RepositoryForge};
use crate::catalog::{validate_file_name, ModelEntry, LIST_FILE};
use crate::template::Schema;

pub const MODELS_PATH: &str = "public/models";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContributionRequest {
    pub model_name: String,
    pub description: String,
    pub creator_name: String,
    #[serde(rename = "creatorLinkedIn")]
    pub creator_linkedin: Option<String>,
    pub json_content: String,
    pub markdown_content: String,
}

impl ContributionRequest {
    pub fn validate(&self) -> Result<(), ForgeError> {
        let required = [
            ("modelName", &self.model_name),
            ("description", &self.description),
            ("creatorName", &self.creator_name),
            ("jsonContent", &self.json_content),
            ("markdownContent", &self.markdown_content),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ForgeError::Invalid(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        Schema::parse(&self.json_content)
            .map_err(|e| ForgeError::Invalid(format!("jsonContent is not a valid schema: {e}")))?;
        Ok(())
    }

    fn linkedin(&self) -> Option<&str> {
        self.creator_linkedin
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// `"Senior  Backend"` → `"senior-backend"`.
pub fn normalize_model_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn branch_name(model: &str, now: DateTime<Utc>) -> String {
    format!("model/{model}-{}", now.timestamp_millis())
}

pub fn pull_request_body(request: &ContributionRequest) -> String {
    let mut body = format!(
        "## New résumé model\n\n**Description:** {}\n\n**Created by:** {}",
        request.description.trim(),
        request.creator_name.trim()
    );
    if let Some(url) = request.linkedin() {
        body.push_str(&format!("\n**LinkedIn:** {url}"));
    }
    body.push_str("\n\nThis PR adds a new résumé model to the catalog.");
    body
}

fn pretty_json(value: &Value) -> Result<String, ForgeError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    serde::Serialize::serialize(value, &mut serializer).map_err(|source| ForgeError::Json {
        file: LIST_FILE.to_string(),
        source,
    })?;
    String::from_utf8(out).map_err(|e| ForgeError::Decode(e.to_string()))
}

/// Parses `list.json`, rejects a duplicate name and appends `entry`.
/// Members other than `models` are kept as they are.
fn append_entry(list: &str, entry: &ModelEntry) -> Result<String, ForgeError> {
    let json_error = |source| ForgeError::Json {
        file: LIST_FILE.to_string(),
        source,
    };
    let mut root: Value = serde_json::from_str(list).map_err(json_error)?;
    let Some(object) = root.as_object_mut() else {
        return Err(ForgeError::Invalid(format!("{LIST_FILE} is not a JSON object")));
    };
    let models = object
        .entry("models")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(models) = models.as_array_mut() else {
        return Err(ForgeError::Invalid(format!("{LIST_FILE} models is not an array")));
    };

    let taken = models
        .iter()
        .any(|m| m.get("name").and_then(Value::as_str) == Some(entry.name.as_str()));
    if taken {
        return Err(ForgeError::Duplicate(entry.name.clone()));
    }

    models.push(serde_json::to_value(entry).map_err(json_error)?);
    pretty_json(&root)
}

/// Opens a pull request that adds the model's schema and template and lists
/// it in the catalog. Nothing is written if validation or the duplicate check fails.
pub async fn contribute_model(
    forge: &dyn RepositoryForge,
    base_branch: &str,
    request: &ContributionRequest,
    now: DateTime<Utc>,
) -> Result<PullRequestCreated, ForgeError> {
    request.validate()?;

    let name = normalize_model_name(&request.model_name);
    let schema_file = format!("{name}.json");
    validate_file_name(&schema_file)
        .map_err(|_| ForgeError::Invalid(format!("'{}' is not a usable model name", request.model_name)))?;
    let template_file = format!("{name}.md");
    let list_path = format!("{MODELS_PATH}/{LIST_FILE}");

    let entry = ModelEntry {
        name: name.clone(),
        description: request.description.trim().to_string(),
        file: schema_file.clone(),
        created_at: now.date_naive(),
        created_by: request.creator_name.trim().to_string(),
        creator_url: request.linkedin().map(str::to_string),
    };

    let list = forge.read_file(base_branch, &list_path).await?;
    let updated_list = append_entry(&list.content, &entry)?;

    let branch = branch_name(&name, now);
    let head = forge.branch_head(base_branch).await?;
    forge.create_branch(&branch, &head).await?;
    info!("Created branch {branch} from {base_branch}@{head}");

    forge
        .write_file(FileWrite {
            branch: &branch,
            path: &format!("{MODELS_PATH}/{schema_file}"),
            content: &request.json_content,
            message: &format!("Add model {name} schema"),
            sha: None,
        })
        .await?;
    forge
        .write_file(FileWrite {
            branch: &branch,
            path: &format!("{MODELS_PATH}/{template_file}"),
            content: &request.markdown_content,
            message: &format!("Add model {name} template"),
            sha: None,
        })
        .await?;
    forge
        .write_file(FileWrite {
            branch: &branch,
            path: &list_path,
            content: &updated_list,
            message: &format!("Add {name} to models list"),
            sha: Some(&list.sha),
        })
        .await?;

    let created = forge
        .open_pull_request(&PullRequestDraft {
            title: format!("Add résumé model: {}", request.model_name.trim()),
            body: pull_request_body(request),
            head: branch.clone(),
            base: base_branch.to_string(),
        })
        .await?;
    info!("Opened pull request #{} for model {name}", created.pr_number);
    Ok(created)
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::forge::RemoteFile;

    /// In-memory repository: `files` is keyed by `(branch, path)`.
    #[derive(Default)]
    pub struct FakeForge {
        pub files: Mutex<HashMap<(String, String), RemoteFile>>,
        pub branches: Mutex<Vec<String>>,
        pub pulls: Mutex<Vec<PullRequestDraft>>,
    }

    impl FakeForge {
        pub fn with_list(branch: &str, list: &str) -> Self {
            let forge = Self::default();
            forge.branches.lock().unwrap().push(branch.to_string());
            forge.files.lock().unwrap().insert(
                (branch.to_string(), format!("{MODELS_PATH}/{LIST_FILE}")),
                RemoteFile {
                    content: list.to_string(),
                    sha: "list-sha".to_string(),
                },
            );
            forge
        }

        pub fn file(&self, branch: &str, path: &str) -> Option<RemoteFile> {
            self.files
                .lock()
                .unwrap()
                .get(&(branch.to_string(), path.to_string()))
                .cloned()
        }
    }

    #[async_trait]
    impl RepositoryForge for FakeForge {
        async fn branch_head(&self, branch: &str) -> Result<String, ForgeError> {
            if self.branches.lock().unwrap().iter().any(|b| b == branch) {
                Ok(format!("{branch}-head"))
            } else {
                Err(ForgeError::Api {
                    status: 404,
                    message: "Not Found".into(),
                })
            }
        }

        async fn create_branch(&self, name: &str, _from_sha: &str) -> Result<(), ForgeError> {
            self.branches.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn read_file(&self, branch: &str, path: &str) -> Result<RemoteFile, ForgeError> {
            self.file(branch, path)
                .ok_or_else(|| ForgeError::FileNotFound(path.to_string()))
        }

        async fn write_file(&self, write: FileWrite<'_>) -> Result<(), ForgeError> {
            let key = (write.branch.to_string(), write.path.to_string());
            let mut files = self.files.lock().unwrap();
            let existing = files
                .get(&key)
                .or_else(|| files.iter().find(|((_, p), _)| p == write.path).map(|(_, f)| f));
            if let (Some(current), Some(sha)) = (existing, write.sha) {
                if current.sha != sha {
                    return Err(ForgeError::Api {
                        status: 409,
                        message: "sha mismatch".into(),
                    });
                }
            }
            files.insert(
                key,
                RemoteFile {
                    content: write.content.to_string(),
                    sha: format!("sha-{}", write.path),
                },
            );
            Ok(())
        }

        async fn open_pull_request(
            &self,
            draft: &PullRequestDraft,
        ) -> Result<PullRequestCreated, ForgeError> {
            let mut pulls = self.pulls.lock().unwrap();
            pulls.push(draft.clone());
            let number = pulls.len() as u64;
            Ok(PullRequestCreated {
                pr_url: format!("https://github.com/acme/curriculo/pull/{number}"),
                pr_number: number,
            })
        }
    }
}
