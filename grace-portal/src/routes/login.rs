use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::Form;

use crate::services::account_service::{self, FormFields, LoginForm};
use crate::services::session_service::{self, FlashKind, FLASH_COOKIE};
use crate::AppState;

const LOGIN_PAGE: &str = "/login.html";

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let form = match LoginForm::from_fields(&FormFields::new(fields)) {
        Ok(form) => form,
        Err(_) => {
            return session_service::redirect_with_cookies(
                LOGIN_PAGE,
                [session_service::flash_cookie(FlashKind::MissingCredentials)],
            )
        }
    };
    let hint = state.config.users_table_hint().map(str::to_string);

    let outcome = super::with_user_store(&state, move |store| {
        account_service::login(store, &form, hint.as_deref())
    })
    .await;

    let account = match outcome {
        Ok(account) => account,
        Err(e) => {
            if !e.is_authentication_failure() {
                tracing::error!(error = %e, "login failed");
            }
            return session_service::redirect_with_cookies(
                LOGIN_PAGE,
                [session_service::flash_cookie(FlashKind::from(&e))],
            );
        }
    };

    let ttl = state.config.session_ttl;
    let token = match session_service::create_session_token(&account.to_claims(ttl), &state.config.secret_key) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "session token could not be issued");
            return session_service::redirect_with_cookies(
                LOGIN_PAGE,
                [session_service::flash_cookie(FlashKind::ServerError)],
            );
        }
    };

    session_service::redirect_with_cookies(
        account.landing().path(),
        [
            session_service::session_cookie(&token, ttl),
            session_service::clear_cookie(FLASH_COOKIE),
        ],
    )
}
