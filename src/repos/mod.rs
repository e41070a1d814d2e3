/*
 * Responsibility
 * - document store の公開インターフェース (re-export)
 * - collection 名の定義
 */
pub mod document_store;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod user_repo;

pub use document_store::{
    DeleteResult, Document, DocumentStore, InsertOneResult, UpdateOptions, UpdateResult,
    eq_filter, id_filter,
};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Collection names (database `warehouse`).
pub mod collections {
    pub const ITEMS: &str = "items";
    pub const MY_ITEMS: &str = "add";
    pub const REPORTS: &str = "report";
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
}
