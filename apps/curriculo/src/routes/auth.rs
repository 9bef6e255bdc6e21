use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{linkedin::STATE_TTL_SECS, LinkedInClient, OAuthError, STATE_COOKIE};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn linkedin(state: &AppState) -> Result<&LinkedInClient, AppError> {
    state
        .linkedin
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("LinkedIn sign-in is not configured".to_string()))
}

fn state_cookie(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie =
        format!("{STATE_COOKIE}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `<frontend>/curriculo?<params>`.
fn frontend_redirect(frontend_url: &str, params: &[(&str, &str)]) -> Result<Redirect, AppError> {
    let url = Url::parse_with_params(&format!("{frontend_url}/curriculo"), params)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid FRONTEND_URL: {e}")))?;
    Ok(Redirect::temporary(url.as_str()))
}

/// GET /api/auth/linkedin
pub async fn handle_linkedin_login(State(state): State<AppState>) -> Result<Response, AppError> {
    let client = linkedin(&state)?;
    let oauth_state = Uuid::new_v4().simple().to_string();
    let url = client.authorization_url(&oauth_state)?;
    let secure = state.config.frontend_url.starts_with("https://");

    Ok((
        [(
            header::SET_COOKIE,
            state_cookie(&oauth_state, STATE_TTL_SECS, secure),
        )],
        Redirect::temporary(url.as_str()),
    )
        .into_response())
}

/// GET /api/auth/linkedin/callback
///
/// Always answers with a redirect back to the résumé page, carrying either
/// `error=<code>` or the prefill data.
pub async fn handle_linkedin_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let client = linkedin(&state)?;
    let frontend = state.config.frontend_url.as_str();
    let secure = frontend.starts_with("https://");
    let clear = [(header::SET_COOKIE, state_cookie("", 0, secure))];

    if let Some(error) = query.error.as_deref() {
        warn!("LinkedIn sign-in refused: {error}");
        return Ok((clear, frontend_redirect(frontend, &[("error", error)])?).into_response());
    }
    let Some(code) = query.code.as_deref() else {
        return Ok((clear, frontend_redirect(frontend, &[("error", "no_code")])?).into_response());
    };
    let expected = read_cookie(&headers, STATE_COOKIE);
    if expected.is_none() || expected != query.state.as_deref() {
        warn!("LinkedIn callback state mismatch");
        return Ok((clear, frontend_redirect(frontend, &[("error", "invalid_state")])?).into_response());
    }

    match sign_in(client, code).await {
        Ok(data) => {
            info!("LinkedIn sign-in succeeded");
            let params = [("linkedin_import", "success"), ("data", data.as_str())];
            Ok((clear, frontend_redirect(frontend, &params)?).into_response())
        }
        Err(e) => {
            warn!("LinkedIn sign-in failed: {e}");
            Ok((clear, frontend_redirect(frontend, &[("error", e.code())])?).into_response())
        }
    }
}

/// Exchanges the code and returns the prefill values as JSON text.
async fn sign_in(client: &LinkedInClient, code: &str) -> Result<String, OAuthError> {
    let token = client.exchange_code(code).await?;
    let profile = client.fetch_profile(&token).await?;
    Ok(profile.prefill().into_json().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use crate::routes::testing::{get, json_body, send, test_state};

    fn with_linkedin(mut state: AppState) -> AppState {
        state.linkedin = Some(LinkedInClient::new(
            "client-1".into(),
            "secret".into(),
            "http://localhost:8080/api/auth/linkedin/callback".into(),
        ));
        state
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_login_disabled_without_credentials() {
        let (_dir, state, _) = test_state(&[]);
        let (status, _) = json_body(send(state, get("/api/auth/linkedin")).await).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_login_sets_state_cookie_and_redirects() {
        let (_dir, state, _) = test_state(&[]);
        let response = send(with_linkedin(state), get("/api/auth/linkedin")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("linkedin_oauth_state="));
        assert!(cookie.contains("Max-Age=600"));
        assert!(cookie.contains("HttpOnly"));

        let oauth_state = cookie
            .trim_start_matches("linkedin_oauth_state=")
            .split(';')
            .next()
            .unwrap();
        let target = location(&response);
        assert!(target.starts_with("https://www.linkedin.com/oauth/v2/authorization?"));
        assert!(target.contains(&format!("state={oauth_state}")));
    }

    #[tokio::test]
    async fn test_callback_reports_provider_error() {
        let (_dir, state, _) = test_state(&[]);
        let response = send(
            with_linkedin(state),
            get("/api/auth/linkedin/callback?error=user_cancelled_login"),
        )
        .await;
        assert_eq!(
            location(&response),
            "http://localhost:3000/curriculo?error=user_cancelled_login"
        );
    }

    #[tokio::test]
    async fn test_callback_without_code() {
        let (_dir, state, _) = test_state(&[]);
        let response = send(with_linkedin(state), get("/api/auth/linkedin/callback?state=abc")).await;
        assert_eq!(
            location(&response),
            "http://localhost:3000/curriculo?error=no_code"
        );
    }

    #[tokio::test]
    async fn test_callback_rejects_state_mismatch() {
        let (_dir, state, _) = test_state(&[]);
        let request = Request::get("/api/auth/linkedin/callback?code=c1&state=abc")
            .header(header::COOKIE, "theme=dark; linkedin_oauth_state=xyz")
            .body(Body::empty())
            .unwrap();
        let response = send(with_linkedin(state), request).await;
        assert_eq!(
            location(&response),
            "http://localhost:3000/curriculo?error=invalid_state"
        );
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "a=1; linkedin_oauth_state=s1".parse().unwrap());
        assert_eq!(read_cookie(&headers, STATE_COOKIE), Some("s1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_frontend_redirect_encodes_data() {
        let redirect = frontend_redirect(
            "http://localhost:3000",
            &[("linkedin_import", "success"), ("data", r#"{"name":"Ana"}"#)],
        )
        .unwrap();
        let response = redirect.into_response();
        assert_eq!(
            location(&response),
            "http://localhost:3000/curriculo?linkedin_import=success&data=%7B%22name%22%3A%22Ana%22%7D"
        );
    }
}
