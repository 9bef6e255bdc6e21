use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::AppError;
use crate::forge::{contribute_model, ContributionRequest, PullRequestCreated};
use crate::state::AppState;

const DEFAULT_BASE_BRANCH: &str = "main";

/// POST /api/create-model-pr
pub async fn handle_create_model_pr(
    State(state): State<AppState>,
    Json(req): Json<ContributionRequest>,
) -> Result<Json<PullRequestCreated>, AppError> {
    let forge = state
        .forge
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("model contribution is not configured".to_string()))?;
    let base_branch = state
        .config
        .github
        .as_ref()
        .map_or(DEFAULT_BASE_BRANCH, |gh| gh.base_branch.as_str());

    let created = contribute_model(forge.as_ref(), base_branch, &req, Utc::now()).await?;
    Ok(Json(created))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::forge::contribute::testing::FakeForge;
    use crate::routes::testing::{json_body, post_json, send, test_state, LIST};

    fn body() -> serde_json::Value {
        json!({
            "modelName": "Data Engineer",
            "description": "Pipelines first",
            "creatorName": "Ana Souza",
            "creatorLinkedIn": "",
            "jsonContent": r#"{"name": "{{name}}"}"#,
            "markdownContent": "# {{name}}"
        })
    }

    #[tokio::test]
    async fn test_contribution_disabled_without_forge() {
        let (_dir, state, _) = test_state(&[]);
        let (status, body) = json_body(send(state, post_json("/api/create-model-pr", body())).await).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_contribution_opens_pull_request() {
        let (_dir, mut state, _) = test_state(&[]);
        let forge = Arc::new(FakeForge::with_list("main", LIST));
        state.forge = Some(forge.clone());

        let (status, body) = json_body(send(state, post_json("/api/create-model-pr", body())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prNumber"], 1);
        assert_eq!(body["prUrl"], "https://github.com/acme/curriculo/pull/1");
        assert!(!forge.pulls.lock().unwrap()[0].body.contains("LinkedIn"));
    }

    #[tokio::test]
    async fn test_contribution_missing_fields_is_400() {
        let (_dir, mut state, _) = test_state(&[]);
        state.forge = Some(Arc::new(FakeForge::with_list("main", LIST)));
        let req = post_json("/api/create-model-pr", json!({"modelName": "x"}));
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("description"));
    }

    #[tokio::test]
    async fn test_contribution_duplicate_is_409() {
        let (_dir, mut state, _) = test_state(&[]);
        state.forge = Some(Arc::new(FakeForge::with_list("main", LIST)));
        let mut req = body();
        req["modelName"] = json!("Default");
        let (status, _) = json_body(send(state, post_json("/api/create-model-pr", req)).await).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
