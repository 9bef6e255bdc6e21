use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{FileWrite, ForgeError, PullRequestCreated, PullRequestDraft, RemoteFile, RepositoryForge};

const API_URL: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("curriculo/", env!("CARGO_PKG_VERSION"));

/// GitHub REST v3 client scoped to one repository.
#[derive(Clone)]
pub struct GitHubForge {
    client: Client,
    token: String,
    repo_url: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CreateRef<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
    number: u64,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

impl GitHubForge {
    pub fn new(token: String, owner: &str, repo: &str) -> Self {
        Self::with_api_url(API_URL, token, owner, repo)
    }

    pub fn with_api_url(api_url: &str, token: String, owner: &str, repo: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
            token,
            repo_url: format!("{}/repos/{owner}/{repo}", api_url.trim_end_matches('/')),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT)
    }

    /// Passes successful responses through; turns the rest into `ForgeError::Api`.
    async fn check(response: Response) -> Result<Response, ForgeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        warn!("GitHub API returned {status}: {message}");
        Err(ForgeError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// GitHub wraps base64 contents at 60 columns.
fn decode_contents(encoded: &str) -> Result<String, ForgeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ForgeError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ForgeError::Decode(e.to_string()))
}

#[async_trait]
impl RepositoryForge for GitHubForge {
    async fn branch_head(&self, branch: &str) -> Result<String, ForgeError> {
        let url = format!("{}/git/refs/heads/{branch}", self.repo_url);
        debug!("GET {url}");
        let response = self.authorized(self.client.get(&url)).send().await?;
        let reference: GitRef = Self::check(response).await?.json().await?;
        Ok(reference.object.sha)
    }

    async fn create_branch(&self, name: &str, from_sha: &str) -> Result<(), ForgeError> {
        let url = format!("{}/git/refs", self.repo_url);
        debug!("POST {url} (refs/heads/{name})");
        let body = CreateRef {
            reference: format!("refs/heads/{name}"),
            sha: from_sha,
        };
        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn read_file(&self, branch: &str, path: &str) -> Result<RemoteFile, ForgeError> {
        let url = format!("{}/contents/{path}", self.repo_url);
        debug!("GET {url}?ref={branch}");
        let response = self
            .authorized(self.client.get(&url))
            .query(&[("ref", branch)])
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ForgeError::FileNotFound(path.to_string()));
        }
        let contents: ContentsResponse = Self::check(response).await?.json().await?;
        Ok(RemoteFile {
            content: decode_contents(&contents.content)?,
            sha: contents.sha,
        })
    }

    async fn write_file(&self, write: FileWrite<'_>) -> Result<(), ForgeError> {
        let url = format!("{}/contents/{}", self.repo_url, write.path);
        debug!("PUT {url} on {}", write.branch);
        let body = PutContents {
            message: write.message,
            content: STANDARD.encode(write.content),
            branch: write.branch,
            sha: write.sha,
        };
        let response = self
            .authorized(self.client.put(&url))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn open_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<PullRequestCreated, ForgeError> {
        let url = format!("{}/pulls", self.repo_url);
        debug!("POST {url} ({} -> {})", draft.head, draft.base);
        let body = CreatePull {
            title: &draft.title,
            body: &draft.body,
            head: &draft.head,
            base: &draft.base,
        };
        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let pull: PullResponse = Self::check(response).await?.json().await?;
        Ok(PullRequestCreated {
            pr_url: pull.html_url,
            pr_number: pull.number,
        })
    }
}
