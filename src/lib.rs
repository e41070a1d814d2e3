//! Warehouse inventory API.
//!
//! Thin CRUD layer over a [`repos::DocumentStore`], with signed bearer
//! credentials guarding the identity-scoped listings.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Route table bound to `state`, without the transport layers (CORS,
/// tracing, timeouts) that `app::run` adds on top.
pub fn router(state: AppState) -> Router {
    api::routes(state.clone()).with_state(state)
}
