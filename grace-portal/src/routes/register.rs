use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;

use crate::services::account_service::{self, AccountError, FormFields, RegistrationForm};
use crate::services::page_service::{self, PageContext};
use crate::AppState;

use super::pages::render_page;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let form = RegistrationForm::from_fields(&FormFields::new(fields));
    let hint = state.config.users_table_hint().map(str::to_string);

    let checked = form.validate().map(|_| ());
    let outcome = match checked {
        Ok(()) => {
            super::with_user_store(&state, move |store| {
                account_service::register(store, &form, hint.as_deref())
            })
            .await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(account) => match page_service::registration_success(&account.display_name) {
            Ok(html) => Html(html).into_response(),
            Err(e) => e.into_response(),
        },
        Err(e) => {
            match &e {
                AccountError::Database(_) | AccountError::Internal(_) | AccountError::Hashing(_) => {
                    tracing::error!(error = %e, "registration failed")
                }
                other => tracing::info!(reason = %other, "registration rejected"),
            }
            let status = e.code().status_code();
            let ctx = PageContext::new().with("error", e.user_message());
            render_page(&state, "register", status, ctx, false).await
        }
    }
}

