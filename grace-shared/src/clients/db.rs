use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the pool without touching the database. Connections are opened on
/// first checkout, so the web process starts even when the database is down
/// and the health check reports the failure instead.
pub fn create_lazy_pool(database_url: &str, checkout_timeout: Duration) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(10)
        .min_idle(Some(0))
        .test_on_check_out(true)
        .connection_timeout(checkout_timeout)
        .build_unchecked(manager);

    tracing::info!(timeout_ms = checkout_timeout.as_millis() as u64, "lazy database connection pool created");
    pool
}
