//! LinkedIn "Sign In with LinkedIn using OpenID Connect".
//!
//! Used only to prefill the résumé form with the member's name and email.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::template::FormValues;

const AUTHORIZATION_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";
const SCOPES: &str = "openid profile email";

/// Cookie holding the `state` sent with the authorization request.
pub const STATE_COOKIE: &str = "linkedin_oauth_state";
pub const STATE_TTL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid authorization URL: {0}")]
    Url(String),

    #[error("token exchange failed (status {status}): {message}")]
    TokenExchange { status: u16, message: String },

    #[error("userinfo request failed (status {status})")]
    UserInfo { status: u16 },
}

impl OAuthError {
    /// Short code reported to the frontend in `?error=`.
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::TokenExchange { .. } => "token_failed",
            OAuthError::UserInfo { .. } => "userinfo_failed",
            OAuthError::Http(_) | OAuthError::Url(_) => "callback_failed",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Claims returned by the OpenID userinfo endpoint. All optional: members
/// can withhold any of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinkedInProfile {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl LinkedInProfile {
    pub fn display_name(&self) -> Option<String> {
        let full = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        if let Some(full) = full {
            return Some(full.to_string());
        }
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Form values to merge into the résumé: `name` and `contact.email`.
    pub fn prefill(&self) -> FormValues {
        let mut values = FormValues::new();
        if let Some(name) = self.display_name() {
            values.set("name", Value::String(name));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            values.set("contact", json!({ "email": email.trim() }));
        }
        values
    }
}

#[derive(Clone)]
pub struct LinkedInClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl LinkedInClient {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    pub fn authorization_url(&self, state: &str) -> Result<Url, OAuthError> {
        Url::parse_with_params(
            AUTHORIZATION_URL,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| OAuthError::Url(e.to_string()))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        debug!("Exchanging LinkedIn authorization code");
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("LinkedIn token exchange returned {status}: {message}");
            return Err(OAuthError::TokenExchange {
                status: status.as_u16(),
                message,
            });
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<LinkedInProfile, OAuthError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!("LinkedIn userinfo returned {status}");
            return Err(OAuthError::UserInfo {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}
