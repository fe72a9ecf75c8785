pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod http;
pub mod middleware;
pub mod models;
pub mod service;
pub mod state;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, middleware as axum_middleware};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, StoreBackend},
    db::{MemoryStore, RedisStore},
    errors::AppError,
    middleware::{cors_layer, create_global_rate_limiter, rate_limit_middleware},
    service::spawn_reconciler,
    state::{AppState, SharedStore},
};

pub fn build_router(state: AppState) -> Router {
    let global_rate_limiter = create_global_rate_limiter(state.config.rate_limit_per_minute);
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(http::create_http_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(cors)
        .fallback(|| async { "404 Not Found" })
}

pub async fn start_server() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let store: SharedStore = match config.store_backend {
        StoreBackend::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| AppError::EnvError("REDIS_URL must be set".into()))?;
            Arc::new(RedisStore::connect(redis_url).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.reconcile_interval_secs > 0 {
        spawn_reconciler(
            store.clone(),
            Duration::from_secs(config.reconcile_interval_secs),
            config.max_commit_retries,
        );
    }

    let port = config.port;
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to bind port {port}: {e}")))?;
    tracing::info!("Listening on port {port}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::InternalError(format!("Server error: {e}")))
}
