//! access token（JWT）検証 → AuthCtx を extensions に入れる
//!
//! Request lifecycle:
//! - `Authorization` ヘッダなし → 401 `Unauthorized Access`（handler は実行されない）
//! - `Bearer <token>` 形式でない / 署名不正 / 期限切れ → 403 `Access Forbidden`
//! - 検証成功 → decode した claims を `AuthCtx` として extensions に格納し next へ
//!
//! 所有者チェック（email クエリと claims の照合）は handler 側 (`AuthCtx::require_owner`) で行う。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// 保護対象の Router に認証を掛ける。
///
/// `route_layer` なので、マッチしないパスは 401 ではなく 404 のまま。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/orders", get(orders::list));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// let app = public.merge(protected);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?
        .to_str()
        .map_err(|_| AppError::Unauthenticated)?;

    let Some(token) = bearer_token(auth) else {
        tracing::warn!("authorization header is not a bearer credential");
        return Err(AppError::Forbidden);
    };

    let claims = match state.auth.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "access token verification failed"
            );
            return Err(AppError::Forbidden);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}

/// `Bearer <token>` から token を取り出す。
///
/// scheme は大文字小文字を区別しないが、`Bearer` 以外や token の欠落・余分な要素は拒否する。
pub(crate) fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }

    Some(token)
}
