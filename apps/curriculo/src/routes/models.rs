use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::ModelsList;
use crate::errors::AppError;
use crate::render::render_html;
use crate::state::AppState;
use crate::template::{blank_values, example_values, merge, unused_placeholders, FormValues, Schema};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub file: String,
    pub schema: Value,
    pub template: String,
    /// True when the model has no usable template and the default was served.
    pub template_fallback: bool,
    /// Empty form in the schema's shape, ready for editing.
    pub values: FormValues,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPreviewRequest {
    pub json_content: String,
    #[serde(default)]
    pub markdown_content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPreviewResponse {
    pub markdown: String,
    pub html: String,
    pub unused_placeholders: Vec<String>,
}

/// GET /api/models
pub async fn handle_list_models(State(state): State<AppState>) -> Result<Json<ModelsList>, AppError> {
    Ok(Json(state.catalog.list().await?))
}

/// GET /api/models/:file
pub async fn handle_get_model(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Json<ModelResponse>, AppError> {
    let model = state.catalog.load(&file).await?;
    let values = blank_values(&model.schema);
    Ok(Json(ModelResponse {
        file: model.file,
        schema: model.schema_json,
        template: model.template,
        template_fallback: model.template_fallback,
        values,
    }))
}

/// POST /api/models/preview
///
/// Model editor preview: the submitted template filled with sample data
/// derived from the submitted schema.
pub async fn handle_preview_model(
    Json(req): Json<ModelPreviewRequest>,
) -> Result<Json<ModelPreviewResponse>, AppError> {
    let schema = Schema::parse(&req.json_content)
        .map_err(|e| AppError::Validation(format!("jsonContent is not a valid schema: {e}")))?;
    let markdown = merge(&req.markdown_content, &example_values(&schema))?;
    Ok(Json(ModelPreviewResponse {
        html: render_html(&markdown),
        unused_placeholders: unused_placeholders(&schema, &req.markdown_content),
        markdown,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::{get, json_body, post_json, send, test_state};
    use crate::template::defaults::DEFAULT_SCHEMA;

    #[tokio::test]
    async fn test_list_models() {
        let (_dir, state, _) = test_state(&[]);
        let (status, body) = json_body(send(state, get("/api/models")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models"][0]["file"], "default.json");
        assert_eq!(body["models"][0]["created_at"], "2025-01-15");
    }

    #[tokio::test]
    async fn test_get_model_with_blank_values() {
        let (_dir, state, _) = test_state(&[
            ("default.json", DEFAULT_SCHEMA),
            ("default.md", "# {{name}}"),
        ]);
        let (status, body) = json_body(send(state, get("/api/models/default.json")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "# {{name}}");
        assert_eq!(body["templateFallback"], false);
        assert_eq!(body["values"]["name"], "");
        assert_eq!(body["values"]["contact"]["email"], "");
        assert_eq!(body["values"]["experience"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_model_is_404() {
        let (_dir, state, _) = test_state(&[]);
        let (status, body) = json_body(send(state, get("/api/models/nope.json")).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_model_rejects_non_json_name() {
        let (_dir, state, _) = test_state(&[]);
        let (status, _) = json_body(send(state, get("/api/models/default.md")).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_model_uses_example_values() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json(
            "/api/models/preview",
            json!({
                "jsonContent": r#"{"name": "{{name}}", "headline": "{{headline}}"}"#,
                "markdownContent": "# {{name}}\n\n{{title}}"
            }),
        );
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["markdown"], "# Jane Doe");
        assert_eq!(body["html"], "<h1>Jane Doe</h1>\n");
        assert_eq!(body["unusedPlaceholders"], json!(["headline"]));
    }

    #[tokio::test]
    async fn test_preview_model_rejects_invalid_schema() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json(
            "/api/models/preview",
            json!({"jsonContent": "{oops", "markdownContent": "# x"}),
        );
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_preview_model_blank_template_is_422() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json(
            "/api/models/preview",
            json!({"jsonContent": "{}", "markdownContent": "  "}),
        );
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "TEMPLATE_NOT_LOADED");
    }
}
