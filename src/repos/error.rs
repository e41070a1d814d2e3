/*
 * Responsibility
 * - document store が上位に伝える意味の定義
 */
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db error: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid document: {0}")]
    InvalidDocument(&'static str),
    #[error("stored document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    // 23505 = unique_violation
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            let constraint = dbe.constraint().unwrap_or("unique constraint");
            return StoreError::Conflict(format!("duplicate value for {}", constraint));
        }
        StoreError::Backend(e)
    }
}
