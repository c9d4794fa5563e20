use axum::response::Response;

use crate::services::session_service::{self, FlashKind, SESSION_COOKIE};

pub async fn logout() -> Response {
    session_service::redirect_with_cookies(
        "/login.html",
        [
            session_service::clear_cookie(SESSION_COOKIE),
            session_service::flash_cookie(FlashKind::LoggedOut),
        ],
    )
}
