//! Document store interface consumed by the HTTP handlers.
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::repos::collections::USERS;
use crate::repos::error::{StoreError, StoreResult};

/// A stored JSON object. Every stored document carries a string `_id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

/// `(collection, field)` pairs whose values may appear at most once per collection.
/// The postgres backend mirrors each entry with a partial unique index.
pub const UNIQUE_FIELDS: [(&str, &str); 1] = [(USERS, "email")];

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Insert a new document built from filter + patch when nothing matches.
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn upserted(id: String) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Single-document CRUD over named collections.
///
/// Filters are top-level equality matches: a document matches when every
/// filter field is present and equal. An empty filter matches everything.
///
/// Implementations must be cheap to share (`Arc<dyn DocumentStore>` in state).
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: &Document)
    -> StoreResult<Option<Document>>;

    // `_id` is generated when absent.
    async fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<InsertOneResult>;

    // Sets the patch fields on the first match. `_id` in the patch is ignored.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        patch: Document,
        options: UpdateOptions,
    ) -> StoreResult<UpdateResult>;

    async fn delete_one(&self, collection: &str, filter: &Document) -> StoreResult<DeleteResult>;
}

/// `{"_id": id}`
pub fn id_filter(id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    filter
}

/// `{field: value}`
pub fn eq_filter(field: &str, value: impl Into<Value>) -> Document {
    let mut filter = Document::new();
    filter.insert(field.to_string(), value.into());
    filter
}

pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| doc.get(key) == Some(expected))
}

/// First unique field whose value in `doc` is already held by one of `others`.
///
/// Missing and `null` values never collide.
pub fn unique_violation<'a>(
    collection: &str,
    doc: &Document,
    others: impl IntoIterator<Item = &'a Document>,
) -> Option<&'static str> {
    let fields: Vec<&'static str> = UNIQUE_FIELDS
        .iter()
        .filter(|(c, _)| *c == collection)
        .map(|(_, field)| *field)
        .collect();
    if fields.is_empty() {
        return None;
    }

    others.into_iter().find_map(|other| {
        fields.iter().copied().find(|field| match doc.get(*field) {
            Some(Value::Null) | None => false,
            Some(value) => other.get(*field) == Some(value),
        })
    })
}

/// Makes sure `doc` has a string `_id`, generating a UUID when missing.
pub fn assign_id(doc: &mut Document) -> StoreResult<String> {
    match doc.get(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(_) => Err(StoreError::InvalidDocument("_id must be a non-empty string")),
        None => {
            let id = Uuid::new_v4().to_string();
            doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            Ok(id)
        }
    }
}

/// Drops `_id` from an update patch; ids are immutable.
pub fn sanitize_patch(mut patch: Document) -> Document {
    patch.remove(ID_FIELD);
    patch
}

/// The document an upsert inserts: the filter's equality fields overlaid with the patch.
pub fn upsert_seed(filter: &Document, patch: &Document) -> Document {
    let mut doc = filter.clone();
    for (key, value) in patch {
        doc.insert(key.clone(), value.clone());
    }
    doc
}

/// Applies `patch` in place; returns whether anything changed.
pub fn apply_patch(doc: &mut Document, patch: &Document) -> bool {
    let mut changed = false;
    for (key, value) in patch {
        if doc.get(key) != Some(value) {
            doc.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}
