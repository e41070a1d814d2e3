/*
 * Responsibility
 * - Config読み込み → 依存生成 (store, token service) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / request-id, trace, timeout)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreConfig};
use crate::middleware::{self, http::HttpLimits};
use crate::repos::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use crate::services::auth::build_access_jwt;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,warehouse_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting warehouse API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!("Warehouse Server is running at port : {}", config.addr.port());

    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Created once here and held for the process lifetime. The pool reconnects
    // individual connections, but there is no retry if the initial connect fails.
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreConfig::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .context("failed to connect to the document database")?;

            let store = PgDocumentStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("failed to prepare the documents table")?;
            Arc::new(store)
        }
        StoreConfig::Memory => Arc::new(MemoryDocumentStore::new()),
    };

    tracing::info!(backend = store.backend_name(), "db connected");

    Ok(AppState::new(store, build_access_jwt(config)))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = crate::router(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, HttpLimits::from_config(config))
}
