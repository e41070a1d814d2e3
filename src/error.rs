/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON `{"message": ...}` body)
 * - StoreError / PasswordError などを統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::StoreError;
use crate::services::auth::password::PasswordError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// No credential on a protected route.
    #[error("Unauthorized Access")]
    Unauthenticated,

    /// Credential present but malformed, badly signed or expired.
    #[error("Access Forbidden")]
    Forbidden,

    /// Verified identity does not own the requested scope.
    #[error("Forbidden Access")]
    OwnershipMismatch,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Upstream(#[source] StoreError),

    #[error("Internal Server Error")]
    Internal,
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::OwnershipMismatch => StatusCode::FORBIDDEN,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // The store's detail names internal ids and indexes; it stays in the log.
            StoreError::Conflict(detail) => {
                tracing::warn!(detail = %detail, "document store conflict");
                AppError::Conflict("Document already exists".to_string())
            }
            StoreError::InvalidDocument(reason) => AppError::invalid_request(reason),
            e => {
                tracing::error!(error = %e, "document store failure");
                AppError::Upstream(e)
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        tracing::error!(error = %e, "password hashing failed");
        AppError::Internal
    }
}
