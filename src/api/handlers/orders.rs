/*
 * Responsibility
 * - /orders 系 handler (全て Bearer 必須)
 * - 一覧は所有者チェック付き、作成時は email をトークンの claim で上書き
 */
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    api::{
        dto::scope::EmailQuery,
        extractors::{AuthCtxExtractor, extract_json, extract_query},
        handlers::into_document,
    },
    error::AppError,
    repos::{Document, InsertOneResult, collections::ORDERS, eq_filter},
    state::AppState,
};

pub async fn list_orders(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, AppError> {
    let requested = extract_query(query)?.normalized_email();
    let email = auth.require_owner(requested.as_deref())?;

    let orders = state.store.find(ORDERS, &eq_filter("email", email)).await?;
    Ok(Json(orders))
}

pub async fn create_order(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<InsertOneResult>), AppError> {
    let email = auth.email().ok_or(AppError::OwnershipMismatch)?.to_string();

    let mut doc = into_document(extract_json(body)?)?;
    doc.insert("email".to_string(), Value::String(email));

    let result = state.store.insert_one(ORDERS, doc).await?;
    Ok((StatusCode::CREATED, Json(result)))
}
