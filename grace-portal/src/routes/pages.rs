use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use grace_shared::types::auth::SessionClaims;

use crate::extractors::{CurrentSession, Flash};
use crate::services::page_service::{self, PageContext, NOT_FOUND_PAGE};
use crate::services::session_service::{self, FlashKind, FLASH_COOKIE};
use crate::AppState;

pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Flash(flash): Flash,
) -> Response {
    render_page(&state, "index", StatusCode::OK, context(session.as_ref(), flash), flash.is_some()).await
}

/// `GET /<page>.html` for the fixed page list; anything else is a 404.
pub async fn page(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
    CurrentSession(session): CurrentSession,
    Flash(flash): Flash,
) -> Response {
    match file.strip_suffix(".html").filter(|name| page_service::is_known_page(name)) {
        Some(name) => {
            render_page(&state, name, StatusCode::OK, context(session.as_ref(), flash), flash.is_some()).await
        }
        None => not_found(State(state)).await,
    }
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    match page_service::render(&state.config.template_dir, NOT_FOUND_PAGE, &PageContext::new()).await {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Renders `page` with `status`, clearing the flash cookie when one was shown.
pub(crate) async fn render_page(
    state: &AppState,
    page: &str,
    status: StatusCode,
    ctx: PageContext,
    consume_flash: bool,
) -> Response {
    match page_service::render(&state.config.template_dir, page, &ctx).await {
        Ok(html) => {
            let mut response = (status, Html(html)).into_response();
            if consume_flash {
                session_service::append_cookies(&mut response, [session_service::clear_cookie(FLASH_COOKIE)]);
            }
            response
        }
        Err(e) => e.into_response(),
    }
}

fn context(session: Option<&SessionClaims>, flash: Option<FlashKind>) -> PageContext {
    PageContext::new()
        .with_opt("flash", flash.map(|f| f.message()))
        .with_opt("flash_level", flash.map(|f| f.level()))
        .with_opt("user_name", session.map(|s| s.name.clone()))
        .with_opt("user_role", session.and_then(|s| s.role.clone()))
}
