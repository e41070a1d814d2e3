use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::document_store::{
    DeleteResult, Document, DocumentStore, ID_FIELD, InsertOneResult, UpdateOptions,
    UpdateResult, apply_patch, assign_id, matches, sanitize_patch, unique_violation, upsert_seed,
};
use crate::repos::error::{StoreError, StoreResult};

/// Process-local document store.
///
/// Collections keep insertion order, so `find` returns documents in the
/// order they were written. Used for tests and `STORE_BACKEND=memory`.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Callers hold the write lock, so the uniqueness checks and the push are atomic.
fn insert_into(
    collection: &str,
    docs: &mut Vec<Document>,
    mut doc: Document,
) -> StoreResult<String> {
    let id = assign_id(&mut doc)?;
    if docs
        .iter()
        .any(|d| d.get(ID_FIELD).and_then(|v| v.as_str()) == Some(id.as_str()))
    {
        return Err(StoreError::Conflict(format!("duplicate _id: {}", id)));
    }
    if let Some(field) = unique_violation(collection, &doc, docs.iter()) {
        return Err(StoreError::Conflict(format!("duplicate {}", field)));
    }
    docs.push(doc);
    Ok(id)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> StoreResult<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)).cloned()))
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<InsertOneResult> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        let inserted_id = insert_into(collection, docs, doc)?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        patch: Document,
        options: UpdateOptions,
    ) -> StoreResult<UpdateResult> {
        let patch = sanitize_patch(patch);
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();

        if let Some(pos) = docs.iter().position(|d| matches(d, filter)) {
            let mut updated = docs[pos].clone();
            let modified = apply_patch(&mut updated, &patch);

            let others = docs
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pos)
                .map(|(_, d)| d);
            if let Some(field) = unique_violation(collection, &updated, others) {
                return Err(StoreError::Conflict(format!("duplicate {}", field)));
            }

            docs[pos] = updated;
            return Ok(UpdateResult::matched(modified));
        }

        if !options.upsert {
            return Ok(UpdateResult::unmatched());
        }

        let id = insert_into(collection, docs, upsert_seed(filter, &patch))?;
        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(&self, collection: &str, filter: &Document) -> StoreResult<DeleteResult> {
        let mut guard = self.collections.write().await;
        let deleted_count = match guard.get_mut(collection) {
            Some(docs) => match docs.iter().position(|d| matches(d, filter)) {
                Some(pos) => {
                    docs.remove(pos);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }
}
