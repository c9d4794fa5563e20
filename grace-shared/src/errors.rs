use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Account errors (registration, login, user store)
/// - E2xxx: Page errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,

    // Accounts (E1xxx)
    InvalidCredentials,
    AccountAlreadyExists,
    UserStoreUnavailable,

    // Pages (E2xxx)
    TemplateUnavailable,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",

            // Accounts
            Self::InvalidCredentials => "E1001",
            Self::AccountAlreadyExists => "E1002",
            Self::UserStoreUnavailable => "E1003",

            // Pages
            Self::TemplateUnavailable => "E2001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::TemplateUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UserStoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    code: ErrorCode,
    message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// HTTP status this error renders with.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Message that is safe to show to an end user. Internal failures never
    /// leak their underlying detail.
    pub fn public_message(&self) -> &str {
        match self.code {
            ErrorCode::InternalError => "internal server error",
            _ => &self.message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code.code(), error = %self.message, "request failed");
        }
        let body = ApiErrorResponse::new(self.code.code(), self.public_message());
        (status, Json(body)).into_response()
    }
}
