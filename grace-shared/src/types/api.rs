use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Outcome of a database round-trip probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Ok,
    Unknown,
    Error,
}

/// Body of the database health endpoint: `{"database": "ok"}`, with a
/// `detail` field only when the probe failed.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub database: DatabaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DatabaseHealth {
    pub fn ok() -> Self {
        Self { database: DatabaseStatus::Ok, detail: None }
    }

    pub fn unknown() -> Self {
        Self { database: DatabaseStatus::Unknown, detail: None }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            database: DatabaseStatus::Error,
            detail: Some(detail.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.database == DatabaseStatus::Ok
    }
}
