use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which HTML→PDF backend serves `/api/generate-pdf` and friends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PdfBackend {
    /// Local `wkhtmltopdf`-compatible executable.
    #[default]
    Command,
    /// Gotenberg-compatible HTTP service.
    Hosted,
    /// Headless Chromium; needs the `browser` feature.
    Browser,
}

impl FromStr for PdfBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" => Ok(PdfBackend::Command),
            "hosted" => Ok(PdfBackend::Hosted),
            "browser" => Ok(PdfBackend::Browser),
            other => bail!("PDF_BACKEND must be one of command, hosted, browser (got '{other}')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub base_branch: String,
}

#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Application configuration loaded from environment variables.
/// Everything has a default except the credentials of optional integrations,
/// which are switched off when absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub models_dir: PathBuf,
    pub frontend_url: String,
    pub pdf_backend: PdfBackend,
    pub pdf_command: String,
    pub pdf_converter_url: Option<String>,
    pub github: Option<GitHubConfig>,
    pub linkedin: Option<LinkedInConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = env_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let github = optional_env("GITHUB_TOKEN").map(|token| GitHubConfig {
            token,
            owner: env_or("GITHUB_REPO_OWNER", "dalmasjunior"),
            repo: env_or("GITHUB_REPO_NAME", "curriculo"),
            base_branch: env_or("GITHUB_BASE_BRANCH", "main"),
        });

        let linkedin = match (
            optional_env("LINKEDIN_CLIENT_ID"),
            optional_env("LINKEDIN_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(LinkedInConfig {
                client_id,
                client_secret,
                redirect_uri: env_or(
                    "LINKEDIN_REDIRECT_URI",
                    &format!("http://localhost:{port}/api/auth/linkedin/callback"),
                ),
            }),
            (None, None) => None,
            _ => bail!("LINKEDIN_CLIENT_ID and LINKEDIN_CLIENT_SECRET must be set together"),
        };

        Ok(Config {
            port,
            rust_log: env_or("RUST_LOG", "info"),
            models_dir: PathBuf::from(env_or("MODELS_DIR", "public/models")),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            pdf_backend: optional_env("PDF_BACKEND")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
            pdf_command: env_or("PDF_COMMAND", "wkhtmltopdf"),
            pdf_converter_url: optional_env("PDF_CONVERTER_URL"),
            github,
            linkedin,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            models_dir: PathBuf::from("public/models"),
            frontend_url: "http://localhost:3000".to_string(),
            pdf_backend: PdfBackend::Command,
            pdf_command: "wkhtmltopdf".to_string(),
            pdf_converter_url: None,
            github: None,
            linkedin: None,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Unset and blank are the same thing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
