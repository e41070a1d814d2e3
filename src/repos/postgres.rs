/*
 * Responsibility
 * - PostgreSQL (JSONB) 上の document store 実装
 * - 1 テーブル `documents (collection, id, body)` に全 collection を格納
 * - filter は JSONB containment (`body @> filter`) で評価する
 */
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::repos::document_store::{
    DeleteResult, Document, DocumentStore, InsertOneResult, UpdateOptions, UpdateResult,
    assign_id, sanitize_patch, upsert_seed,
};
use crate::repos::error::{StoreError, StoreResult};

#[derive(Clone, Debug)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing table and indexes when missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body JSONB NOT NULL,
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS documents_body_idx
            ON documents USING GIN (body jsonb_path_ops)
            "#,
        )
        .execute(&self.pool)
        .await?;

        // One account per email.
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS documents_users_email_idx
            ON documents ((body->>'email'))
            WHERE collection = 'users'
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<String> {
        let id = assign_id(&mut doc)?;

        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(&doc))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("duplicate _id: {}", id)));
        }

        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY "createdAt", id
            "#,
        )
        .bind(collection)
        .bind(Json(filter))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> StoreResult<Option<Document>> {
        let row = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY "createdAt", id
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(Json(filter))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|Json(doc)| doc))
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<InsertOneResult> {
        let inserted_id = self.insert(collection, doc).await?;

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

        // `unchanged` is computed against the pre-update body.
        let unchanged = sqlx::query_scalar::<_, bool>(
            r#"
            WITH target AS (
                SELECT id, body
                FROM documents
                WHERE collection = $1 AND body @> $2
                ORDER BY "createdAt", id
                LIMIT 1
                FOR UPDATE
            )
            UPDATE documents d
            SET body = d.body || $3
            FROM target
            WHERE d.collection = $1 AND d.id = target.id
            RETURNING target.body @> $3
            "#,
        )
        .bind(collection)
        .bind(Json(filter))
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        match unchanged {
            Some(unchanged) => Ok(UpdateResult::matched(!unchanged)),
            None if options.upsert => {
                let id = self.insert(collection, upsert_seed(filter, &patch)).await?;
                Ok(UpdateResult::upserted(id))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Document) -> StoreResult<DeleteResult> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = (
                SELECT id
                FROM documents
                WHERE collection = $1 AND body @> $2
                ORDER BY "createdAt", id
                LIMIT 1
            )
            "#,
        )
        .bind(collection)
        .bind(Json(filter))
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }
}
