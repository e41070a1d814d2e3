/*
 * Responsibility
 * - /inventory 系 handler (items collection)
 * - store の結果をそのまま返す
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::Value;

use crate::{
    api::{dto::inventory::UpdateQuantityRequest, extractors::extract_json},
    error::AppError,
    repos::{Document, UpdateOptions, UpdateResult, collections::ITEMS, id_filter},
    state::AppState,
};

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    let items = state.store.find(ITEMS, &Document::new()).await?;
    Ok(Json(items))
}

/// `null` when no item has this id.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, AppError> {
    let item = state.store.find_one(ITEMS, &id_filter(&id)).await?;
    Ok(Json(item))
}

/// Delivery / restock: overwrite `quantity`, creating the item if it does not exist.
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<UpdateResult>, AppError> {
    let req = extract_json(body)?;
    let quantity = req.quantity().map_err(AppError::invalid_request)?;

    let mut patch = Document::new();
    patch.insert("quantity".to_string(), Value::from(quantity));

    let result = state
        .store
        .update_one(ITEMS, &id_filter(&id), patch, UpdateOptions { upsert: true })
        .await?;

    Ok(Json(result))
}
