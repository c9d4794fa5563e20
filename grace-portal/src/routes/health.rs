use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;

use grace_shared::types::api::DatabaseHealth;

use crate::models::PingRow;
use crate::AppState;

/// `SELECT 1` against a pooled connection.
pub async fn db_ping(State(state): State<Arc<AppState>>) -> (StatusCode, Json<DatabaseHealth>) {
    let pool = state.db.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<i32, String> {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        diesel::sql_query("SELECT 1 AS value")
            .get_result::<PingRow>(&mut conn)
            .map(|row| row.value)
            .map_err(|e| e.to_string())
    })
    .await;

    let health = match outcome {
        Ok(Ok(1)) => DatabaseHealth::ok(),
        Ok(Ok(other)) => {
            tracing::warn!(value = other, "unexpected ping result");
            DatabaseHealth::unknown()
        }
        Ok(Err(detail)) => {
            tracing::error!(error = %detail, "database ping failed");
            DatabaseHealth::error(detail)
        }
        Err(e) => DatabaseHealth::error(e.to_string()),
    };

    let status = if health.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(health))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}
