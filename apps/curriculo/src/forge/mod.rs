//! Git-forge access for contributing new résumé models as pull requests.
//!
//! `RepositoryForge` is the seam: `GitHubForge` talks to the REST API,
//! tests use an in-memory fake.

pub mod contribute;
pub mod github;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use contribute::{contribute_model, ContributionRequest};
pub use github::GitHubForge;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("forge API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("file '{0}' not found")]
    FileNotFound(String),

    #[error("could not decode file contents: {0}")]
    Decode(String),

    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid contribution: {0}")]
    Invalid(String),

    #[error("model '{0}' already exists")]
    Duplicate(String),
}

/// A file read from a branch, with the blob sha needed to overwrite it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub content: String,
    pub sha: String,
}

/// A file to create or update on a branch.
#[derive(Debug, Clone)]
pub struct FileWrite<'a> {
    pub branch: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
    /// Sha of the blob being replaced; `None` creates the file.
    pub sha: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestCreated {
    pub pr_url: String,
    pub pr_number: u64,
}

#[async_trait]
pub trait RepositoryForge: Send + Sync {
    /// Commit sha at the tip of `branch`.
    async fn branch_head(&self, branch: &str) -> Result<String, ForgeError>;

    async fn create_branch(&self, name: &str, from_sha: &str) -> Result<(), ForgeError>;

    async fn read_file(&self, branch: &str, path: &str) -> Result<RemoteFile, ForgeError>;

    async fn write_file(&self, write: FileWrite<'_>) -> Result<(), ForgeError>;

    async fn open_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<PullRequestCreated, ForgeError>;
}
