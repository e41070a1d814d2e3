/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: 起動時に一度だけ生成し、プロセス終了まで保持する document store
 *   - auth: アクセストークンの発行・検証
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::repos::DocumentStore;
use crate::services::auth::AccessJwt;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<AccessJwt>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<AccessJwt>) -> Self {
        Self { store, auth }
    }
}
