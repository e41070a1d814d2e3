/*
 * Responsibility
 * - users collection 向けの操作 (email で検索 / 登録)
 * - 保存形式: `{_id, email, password_hash}`
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repos::collections::USERS;
use crate::repos::document_store::{Document, DocumentStore, InsertOneResult, eq_filter};
use crate::repos::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub password_hash: String,
}

pub async fn find_by_email(
    store: &dyn DocumentStore,
    email: &str,
) -> StoreResult<Option<UserRecord>> {
    let doc = store.find_one(USERS, &eq_filter("email", email)).await?;

    doc.map(|doc| serde_json::from_value(Value::Object(doc)).map_err(StoreError::from))
        .transpose()
}

pub async fn create(
    store: &dyn DocumentStore,
    email: &str,
    password_hash: &str,
) -> StoreResult<InsertOneResult> {
    let record = UserRecord {
        id: None,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
    };

    let doc: Document = match serde_json::to_value(&record)? {
        Value::Object(doc) => doc,
        _ => return Err(StoreError::InvalidDocument("user record must be an object")),
    };

    store.insert_one(USERS, doc).await
}
