pub mod auth_ctx;
pub mod request;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use request::{extract_json, extract_query};
