use std::sync::Arc;
use std::time::Duration;

use grace_portal::config::AppConfig;
use grace_portal::AppState;
use grace_shared::clients::db::create_lazy_pool;
use grace_shared::middleware::{init_tracing, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing("grace-portal", LogFormat::for_environment(&config.environment));

    let port = config.port;

    let db = create_lazy_pool(&config.database_url, Duration::from_secs(config.db_timeout_secs));
    let metrics = grace_shared::middleware::init_metrics()?;

    if config.is_production() && config.secret_key == AppConfig::default().secret_key {
        tracing::warn!("running in production with the development secret key");
    }
    tracing::info!(
        users_table = ?config.users_table_hint(),
        templates = %config.template_dir.display(),
        "configuration loaded"
    );

    let state = Arc::new(AppState { db, config, metrics });
    let app = grace_portal::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "grace-portal starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
