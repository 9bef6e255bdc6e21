use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::render::{export_pdf, render_html};
use crate::state::AppState;
use crate::template::{merge, FormValues, MergeError};

const PDF_FILE_NAME: &str = "curriculo.pdf";
const MARKDOWN_FILE_NAME: &str = "curriculo.md";

/// Form values plus where the template comes from: an inline `template`
/// wins over a catalog `model`.
#[derive(Debug, Default, Deserialize)]
pub struct ResumeRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub values: FormValues,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Pdf,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub resume: ResumeRequest,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePdfRequest {
    #[serde(default)]
    pub markdown: String,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub markdown: String,
    pub html: String,
}

async fn merged_markdown(state: &AppState, req: &ResumeRequest) -> Result<String, AppError> {
    let template = match (&req.template, &req.model) {
        (Some(template), _) => template.clone(),
        (None, Some(model)) => state.catalog.load(model).await?.template,
        (None, None) => return Err(MergeError::TemplateNotLoaded.into()),
    };
    Ok(merge(&template, &req.values)?)
}

fn attachment(content_type: &'static str, file_name: &str, body: Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /api/resume/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let markdown = merged_markdown(&state, &req).await?;
    Ok(Json(PreviewResponse {
        html: render_html(&markdown),
        markdown,
    }))
}

/// POST /api/resume/export
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let markdown = merged_markdown(&state, &req.resume).await?;
    match req.format {
        ExportFormat::Markdown => Ok(attachment(
            "text/markdown; charset=utf-8",
            MARKDOWN_FILE_NAME,
            Bytes::from(markdown),
        )),
        ExportFormat::Pdf => {
            let pdf = export_pdf(state.pdf.as_ref(), &markdown, &state.pdf_options).await?;
            info!("Exported résumé PDF ({} bytes)", pdf.len());
            Ok(attachment("application/pdf", PDF_FILE_NAME, pdf))
        }
    }
}

/// POST /api/generate-pdf
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Json(req): Json<GeneratePdfRequest>,
) -> Result<Response, AppError> {
    if req.markdown.trim().is_empty() {
        return Err(AppError::Validation("markdown is required".to_string()));
    }
    let pdf = export_pdf(state.pdf.as_ref(), &req.markdown, &state.pdf_options).await?;
    info!("Generated PDF ({} bytes)", pdf.len());
    Ok(attachment("application/pdf", PDF_FILE_NAME, pdf))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{json_body, post_json, raw_body, send, test_state};

    #[tokio::test]
    async fn test_preview_inline_template() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json(
            "/api/resume/preview",
            json!({
                "template": "# {{name}}\nEmail: {{email}}\nPhone: {{phone}}",
                "values": {"name": "Ana", "contact": {"email": "ana@x.com", "phone": ""}}
            }),
        );
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["markdown"], "# Ana\nEmail: ana@x.com");
        assert!(body["html"].as_str().unwrap().contains("<h1>Ana</h1>"));
    }

    #[tokio::test]
    async fn test_preview_catalog_model() {
        let (_dir, state, _) = test_state(&[
            ("default.json", r#"{"name": "{{name}}"}"#),
            ("default.md", "# {{name}}\n\n## Summary\n{{summary}}"),
        ]);
        let req = post_json(
            "/api/resume/preview",
            json!({"model": "default.json", "values": {"name": "Ana"}}),
        );
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["markdown"], "# Ana");
    }

    #[tokio::test]
    async fn test_preview_without_template_is_422() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json("/api/resume/preview", json!({"values": {"name": "Ana"}}));
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"]["message"],
            "Template not loaded. Please reload the page."
        );
    }

    #[tokio::test]
    async fn test_export_markdown_attachment() {
        let (_dir, state, pdf) = test_state(&[]);
        let req = post_json(
            "/api/resume/export",
            json!({"template": "# {{name}}", "values": {"name": "Ana"}}),
        );
        let response = send(state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"curriculo.md\""
        );
        assert_eq!(raw_body(response).await, b"# Ana");
        assert!(pdf.pages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_pdf_goes_through_renderer() {
        let (_dir, state, pdf) = test_state(&[]);
        let req = post_json(
            "/api/resume/export",
            json!({"template": "# {{name}}", "values": {"name": "Ana"}, "format": "pdf"}),
        );
        let response = send(state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(raw_body(response).await, b"%PDF-1.7 test");
        let pages = pdf.pages.lock().unwrap();
        assert!(pages[0].contains("<h1>Ana</h1>"));
    }

    #[tokio::test]
    async fn test_generate_pdf() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json("/api/generate-pdf", json!({"markdown": "# Ana\n\nHello"}));
        let response = send(state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"curriculo.pdf\""
        );
        assert_eq!(raw_body(response).await, b"%PDF-1.7 test");
    }

    #[tokio::test]
    async fn test_generate_pdf_requires_markdown() {
        let (_dir, state, _) = test_state(&[]);
        let req = post_json("/api/generate-pdf", json!({}));
        let (status, body) = json_body(send(state, req).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
