use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready() -> impl IntoResponse {
    // No external dependency is required to serve the proxy surface
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
        })),
    )
}
