/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::error::AppError;
use crate::services::auth::TokenClaims;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `claims` は検証済みトークンから decode したもの（発行時の claims + iat/exp）
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: TokenClaims,
}

impl AuthCtx {
    pub fn new(claims: TokenClaims) -> Self {
        Self { claims }
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.email()
    }

    /// Ownership check for identity-scoped queries.
    ///
    /// The requested email must be present and equal to the token's `email`
    /// claim; otherwise the caller gets 403 `Forbidden Access` even though
    /// authentication succeeded.
    pub fn require_owner<'a>(&self, requested: Option<&'a str>) -> Result<&'a str, AppError> {
        match (self.email(), requested) {
            (Some(own), Some(requested)) if own == requested => Ok(requested),
            (own, requested) => {
                tracing::warn!(
                    token_email = ?own,
                    requested_email = ?requested,
                    "ownership check failed"
                );
                Err(AppError::OwnershipMismatch)
            }
        }
    }
}
