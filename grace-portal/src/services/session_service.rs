use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use grace_shared::errors::AppError;
use grace_shared::types::auth::SessionClaims;

use super::account_service::AccountError;

pub const SESSION_COOKIE: &str = "grace_session";
pub const FLASH_COOKIE: &str = "grace_flash";

/// Flash lifetime; it only has to survive one redirect.
const FLASH_MAX_AGE: i64 = 60;

pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

/// Claims of a valid, unexpired session token.
pub fn verify_session_token(token: &str, secret: &str) -> Option<SessionClaims> {
    match decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "rejected session token");
            None
        }
    }
}

pub fn session_cookie(token: &str, max_age: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

pub fn flash_cookie(kind: FlashKind) -> String {
    format!(
        "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={FLASH_MAX_AGE}",
        kind.code()
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Value of the named cookie across every `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `303 See Other` to `location`, appending one `Set-Cookie` per entry.
pub fn redirect_with_cookies<I>(location: &str, cookies: I) -> Response
where
    I: IntoIterator<Item = String>,
{
    let mut response = Redirect::to(location).into_response();
    append_cookies(&mut response, cookies);
    response
}

pub fn append_cookies<I>(response: &mut Response, cookies: I)
where
    I: IntoIterator<Item = String>,
{
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "dropping malformed cookie"),
        }
    }
}

/// One-shot notice carried across a redirect. Only the code travels in the
/// cookie; the text is looked up when the next page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    MissingCredentials,
    InvalidCredentials,
    StoreUnavailable,
    ServerError,
    LoggedOut,
}

impl FlashKind {
    const ALL: [FlashKind; 5] = [
        Self::MissingCredentials,
        Self::InvalidCredentials,
        Self::StoreUnavailable,
        Self::ServerError,
        Self::LoggedOut,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing",
            Self::InvalidCredentials => "invalid",
            Self::StoreUnavailable => "unavailable",
            Self::ServerError => "error",
            Self::LoggedOut => "logged_out",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "Ingrese su usuario y contraseña.",
            Self::InvalidCredentials => "Usuario o contraseña incorrectos.",
            Self::StoreUnavailable => "El servicio de usuarios no está disponible. Intente más tarde.",
            Self::ServerError => "No se pudo completar la operación. Intente más tarde.",
            Self::LoggedOut => "Sesión cerrada correctamente.",
        }
    }

    /// Bootstrap alert class for the message.
    pub fn level(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "warning",
            Self::InvalidCredentials | Self::StoreUnavailable | Self::ServerError => "danger",
            Self::LoggedOut => "info",
        }
    }
}

impl From<&AccountError> for FlashKind {
    fn from(err: &AccountError) -> Self {
        match err {
            AccountError::Validation(_) => Self::MissingCredentials,
            AccountError::NotFound | AccountError::Inactive | AccountError::InvalidCredentials => {
                Self::InvalidCredentials
            }
            AccountError::StoreUnavailable => Self::StoreUnavailable,
            AccountError::Duplicate
            | AccountError::Hashing(_)
            | AccountError::Internal(_)
            | AccountError::Database(_) => Self::ServerError,
        }
    }
}
