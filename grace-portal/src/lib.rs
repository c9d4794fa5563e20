use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use grace_shared::clients::db::DbPool;
use grace_shared::middleware::metrics_middleware;

pub mod assets;
pub mod config;
pub mod extractors;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use crate::config::AppConfig;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub metrics: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(routes::pages::index))
        .route("/:page", get(routes::pages::page))
        .route("/register", post(routes::register::register))
        .route("/login", post(routes::login::login))
        .route("/logout", get(routes::logout::logout).post(routes::logout::logout))
        .route("/db-ping", get(routes::health::db_ping))
        .route("/health", get(routes::health::db_ping))
        .route("/metrics", get(routes::health::metrics))
        .nest_service("/static", static_files)
        .fallback(routes::pages::not_found)
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
