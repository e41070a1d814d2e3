pub mod auth;
pub mod health;
pub mod inventory;
pub mod my_items;
pub mod orders;
pub mod reports;

use serde_json::Value;

use crate::error::AppError;
use crate::repos::Document;

/// Request bodies stored as documents must be JSON objects.
pub(crate) fn into_document(body: Value) -> Result<Document, AppError> {
    match body {
        Value::Object(doc) => Ok(doc),
        _ => Err(AppError::invalid_request("request body must be a JSON object")),
    }
}
