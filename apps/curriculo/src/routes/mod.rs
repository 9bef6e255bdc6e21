pub mod auth;
pub mod contribute;
pub mod health;
pub mod models;
pub mod resume;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Model catalog and editor
        .route("/api/models", get(models::handle_list_models))
        .route("/api/models/preview", post(models::handle_preview_model))
        .route("/api/models/:file", get(models::handle_get_model))
        .route("/api/create-model-pr", post(contribute::handle_create_model_pr))
        // Résumé preview and export
        .route("/api/resume/preview", post(resume::handle_preview))
        .route("/api/resume/export", post(resume::handle_export))
        .route("/api/generate-pdf", post(resume::handle_generate_pdf))
        // LinkedIn sign-in
        .route("/api/auth/linkedin", get(auth::handle_linkedin_login))
        .route(
            "/api/auth/linkedin/callback",
            get(auth::handle_linkedin_callback),
        )
        .with_state(state)
}

#[cfg(test)]
pub mod testing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use super::build_router;
    use crate::catalog::ModelCatalog;
    use crate::config::Config;
    use crate::render::testing::RecordingRenderer;
    use crate::render::PdfOptions;
    use crate::state::AppState;

    pub const LIST: &str = r#"{"models": [{"name": "default", "description": "Classic", "file": "default.json", "created_at": "2025-01-15", "created_by": "Curriculo"}]}"#;

    /// State over a temp models directory holding `list.json` plus `files`.
    pub fn test_state(files: &[(&str, &str)]) -> (tempfile::TempDir, AppState, Arc<RecordingRenderer>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("list.json"), LIST).unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let pdf = Arc::new(RecordingRenderer::returning(b"%PDF-1.7 test"));
        let state = AppState {
            config: Config::default(),
            catalog: ModelCatalog::new(dir.path()),
            pdf: pdf.clone(),
            pdf_options: PdfOptions::default(),
            forge: None,
            linkedin: None,
        };
        (dir, state, pdf)
    }

    pub async fn send(state: AppState, request: Request<Body>) -> Response {
        build_router(state).oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn json_body(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn raw_body(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }
}
