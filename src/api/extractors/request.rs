/*
 * Responsibility
 * - axum の Json / Query rejection を AppError (400 `{"message": ...}`) に揃える
 * - handler は `Result<Json<T>, JsonRejection>` を受け取り、ここで中身を取り出す
 */
use axum::{
    Json,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
};

use crate::error::AppError;

/// JSON body を取り出す。構文エラー・型不一致・Content-Type 不正はすべて 400。
///
/// ```ignore
/// pub async fn handler(body: Result<Json<MyRequest>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|err| {
        tracing::debug!(status = %err.status(), "rejected request body");
        AppError::InvalidRequest(err.body_text())
    })
}

pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::InvalidRequest(err.body_text()))
}
