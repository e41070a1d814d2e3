/*
 * Responsibility
 * - POST /register: email + password を保存 (argon2 hash)
 * - POST /login: 保存済み identity を照合してからアクセストークンを発行
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde_json::Value;

use crate::{
    api::{
        dto::auth::{CredentialsRequest, LoginResponse, RegisterResponse},
        extractors::extract_json,
    },
    error::AppError,
    repos::{StoreError, user_repo},
    services::auth::{Claims, password},
    state::AppState,
};

fn email_taken() -> AppError {
    AppError::Conflict("Email already registered".to_string())
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let req = extract_json(body)?;
    req.validate().map_err(AppError::invalid_request)?;
    let email = req.normalized_email();

    // Early exit before hashing; the store's unique email is what settles races.
    if user_repo::find_by_email(state.store.as_ref(), &email)
        .await?
        .is_some()
    {
        return Err(email_taken());
    }

    let hash = password::hash_password(&req.password).await?;
    match user_repo::create(state.store.as_ref(), &email, &hash).await {
        Ok(_) => {}
        Err(StoreError::Conflict(detail)) => {
            tracing::info!(email = %email, detail = %detail, "concurrent registration lost");
            return Err(email_taken());
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(email = %email, "account registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { email })))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_json(body)?;
    req.validate().map_err(AppError::invalid_request)?;
    let email = req.normalized_email();

    let Some(user) = user_repo::find_by_email(state.store.as_ref(), &email).await? else {
        tracing::warn!(email = %email, "login for unknown account");
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify_password(&req.password, &user.password_hash).await? {
        tracing::warn!(email = %email, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let mut claims = Claims::new();
    claims.insert("email".to_string(), Value::String(user.email));

    let access_token = state.auth.issue(claims).map_err(|e| {
        tracing::error!(error = %e, "failed to sign access token");
        AppError::Internal
    })?;

    Ok(Json(LoginResponse { access_token }))
}
