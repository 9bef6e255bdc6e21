use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "curriculo-api"
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{get, json_body, send, test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (_dir, state, _) = test_state(&[]);
        let (status, body) = json_body(send(state, get("/health")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "curriculo-api");
    }
}
