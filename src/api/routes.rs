/*
 * Responsibility
 * - URL 構造を定義
 * - Bearer が必要な範囲 (protected) と不要な範囲 (public) をここで分ける
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::handlers::{
    auth::{login, register},
    health::{health, root},
    inventory::{get_item, list_items, update_quantity},
    my_items::{add_item, delete_item, list_my_items},
    orders::{create_order, list_orders},
    reports::list_reports,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/inventory", get(list_items))
        .route("/inventory/{id}", get(get_item).put(update_quantity))
        .route("/report", get(list_reports))
        .route("/add", post(add_item))
        .route("/add/{id}", delete(delete_item));

    // Same-path routes merge per method: GET /add is protected, POST /add is not.
    let protected = Router::new()
        .route("/add", get(list_my_items))
        .route("/orders", get(list_orders).post(create_order));

    public.merge(access::apply(protected, state))
}
