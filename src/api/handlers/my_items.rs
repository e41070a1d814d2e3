/*
 * Responsibility
 * - /add 系 handler (ユーザーが追加した items)
 * - GET /add?email= は Bearer 必須 + 所有者チェック (AuthCtx::require_owner)
 * - 保存時・検索時とも email は正規化 (trim + 小文字) して扱う
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde_json::Value;

use crate::{
    api::{
        dto::scope::{EmailQuery, normalize_email},
        extractors::{AuthCtxExtractor, extract_json, extract_query},
        handlers::into_document,
    },
    error::AppError,
    repos::{DeleteResult, Document, InsertOneResult, collections::MY_ITEMS, eq_filter, id_filter},
    state::AppState,
};

pub async fn add_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<InsertOneResult>, AppError> {
    let mut doc = into_document(extract_json(body)?)?;
    if let Some(Value::String(email)) = doc.get("email") {
        let email = normalize_email(email);
        doc.insert("email".to_string(), Value::String(email));
    }

    let result = state.store.insert_one(MY_ITEMS, doc).await?;
    Ok(Json(result))
}

pub async fn list_my_items(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, AppError> {
    let requested = extract_query(query)?.normalized_email();
    let email = auth.require_owner(requested.as_deref())?;
    tracing::debug!(email = %email, "listing items by owner");

    let items = state.store.find(MY_ITEMS, &eq_filter("email", email)).await?;
    Ok(Json(items))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let result = state.store.delete_one(MY_ITEMS, &id_filter(&id)).await?;
    Ok(Json(result))
}
