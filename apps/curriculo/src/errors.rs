use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::OAuthError;
use crate::catalog::CatalogError;
use crate::forge::ForgeError;
use crate::render::RenderError;
use crate::template::MergeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Template(#[from] MergeError),

    #[error("Catalog error: {0}")]
    Catalog(CatalogError),

    #[error("PDF error: {0}")]
    Render(#[from] RenderError),

    #[error("Forge error: {0}")]
    Forge(ForgeError),

    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(name) => AppError::NotFound(format!("model '{name}' not found")),
            CatalogError::InvalidName(name) => {
                AppError::Validation(format!("invalid model file name '{name}'"))
            }
            other => AppError::Catalog(other),
        }
    }
}

impl From<ForgeError> for AppError {
    fn from(e: ForgeError) -> Self {
        match e {
            ForgeError::Invalid(msg) => AppError::Validation(msg),
            ForgeError::Duplicate(name) => {
                AppError::Conflict(format!("a model named '{name}' already exists"))
            }
            other => AppError::Forge(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
            }
            AppError::Template(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "TEMPLATE_NOT_LOADED",
                e.to_string(),
            ),
            AppError::Catalog(e) => {
                tracing::error!("Catalog error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_ERROR",
                    "The model catalog could not be read".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("PDF render error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PDF_ERROR",
                    "The PDF could not be generated".to_string(),
                )
            }
            AppError::Forge(e) => {
                tracing::error!("Forge error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FORGE_ERROR",
                    "The pull request could not be created".to_string(),
                )
            }
            AppError::OAuth(e) => {
                tracing::error!("OAuth error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "OAUTH_ERROR",
                    "LinkedIn sign-in failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
