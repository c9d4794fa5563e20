use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use grace_shared::types::auth::SessionClaims;

use crate::services::session_service::{self, FlashKind, FLASH_COOKIE, SESSION_COOKIE};
use crate::AppState;

/// Identity from the session cookie, if it carries a valid token.
pub struct CurrentSession(pub Option<SessionClaims>);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = session_service::read_cookie(&parts.headers, SESSION_COOKIE)
            .filter(|token| !token.is_empty())
            .and_then(|token| session_service::verify_session_token(token, &state.config.secret_key));
        Ok(Self(claims))
    }
}

/// Pending flash notice. Unknown codes are ignored.
pub struct Flash(pub Option<FlashKind>);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            session_service::read_cookie(&parts.headers, FLASH_COOKIE).and_then(FlashKind::from_code),
        ))
    }
}
