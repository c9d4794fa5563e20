pub mod health;
pub mod login;
pub mod logout;
pub mod pages;
pub mod register;

use std::sync::Arc;

use crate::services::account_service::AccountError;
use crate::store::PgUserStore;
use crate::AppState;

/// Runs `f` on a blocking worker with one pooled connection wrapped as a
/// user store. A failed checkout means the store is unavailable.
pub(crate) async fn with_user_store<T, F>(state: &Arc<AppState>, f: F) -> Result<T, AccountError>
where
    F: FnOnce(&mut PgUserStore<'_>) -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.db.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "database connection unavailable");
            AccountError::StoreUnavailable
        })?;
        let mut store = PgUserStore::new(&mut conn);
        f(&mut store)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "account task failed");
        AccountError::Internal(e.to_string())
    })?
}
