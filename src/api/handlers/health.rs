/*
 * Responsibility
 * - GET / (稼働確認メッセージ)
 * - GET /health (疎通用)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn root() -> &'static str {
    "Warehouse Server is running"
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
