use axum::{Json, http::StatusCode, response::IntoResponse};
use scrypt::password_hash;
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum HubError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("no session token supplied")]
    NoSession,

    #[error("session token is not valid")]
    InvalidSession,

    #[error("admin privileges required")]
    Forbidden,

    #[error("missing required fields")]
    MissingFields,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("resource not found")]
    NotFound,

    #[error("the admin account cannot be deleted")]
    ProtectedUser,

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("password hash error: {0}")]
    Hash(#[from] password_hash::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for HubError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            HubError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody::new("INVALID_CREDENTIALS", self.to_string()),
            ),
            HubError::NoSession => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody::new("NO_SESSION", self.to_string()),
            ),
            HubError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody::new("INVALID_SESSION", self.to_string()),
            ),
            HubError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiErrorBody::new("FORBIDDEN", self.to_string()),
            ),
            HubError::MissingFields => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("MISSING_FIELDS", self.to_string()),
            ),
            HubError::DuplicateUsername => (
                StatusCode::CONFLICT,
                ApiErrorBody::new("DUPLICATE_USERNAME", self.to_string()),
            ),
            HubError::NotFound => (
                StatusCode::NOT_FOUND,
                ApiErrorBody::new("NOT_FOUND", self.to_string()),
            ),
            HubError::ProtectedUser => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("PROTECTED_USER", self.to_string()),
            ),
            // Internal causes are logged here and never echoed to the caller.
            HubError::Database(_) | HubError::Hash(_) | HubError::Json(_) => {
                error!(cause = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody::new("INTERNAL_ERROR", "An internal server error occurred."),
                )
            }
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiErrorBody {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
