use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use artisan_auth::AuthError;
use artisan_core::DomainError;
use artisan_infra::StoreError;

/// Message returned for every failed login, whatever the cause.
pub const LOGIN_FAILED: &str = "invalid credentials";

/// Failures surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Login rejected. Carries no detail so every cause looks the same.
    #[error("{}", LOGIN_FAILED)]
    Authentication,

    #[error(transparent)]
    Authorization(AuthError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// Storage or runtime failure; the detail is logged, never returned.
    #[error("internal error: {0}")]
    Persistence(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Authentication => "authentication_failed",
            ApiError::Authorization(AuthError::MissingToken) => "missing_token",
            ApiError::Authorization(AuthError::ExpiredToken) => "expired_token",
            ApiError::Authorization(_) => "invalid_token",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Persistence(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = match &self {
            ApiError::Persistence(detail) => {
                tracing::error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        json_error(self.status(), self.code(), message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::Validation(format!("invalid id: {msg}")),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("record"),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Backend(msg) => ApiError::Persistence(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            e if e.is_token_rejection() => ApiError::Authorization(e),
            AuthError::EmptyPassword => ApiError::Validation("password is required".to_string()),
            e @ AuthError::PasswordTooLong(_) => ApiError::Validation(e.to_string()),
            other => ApiError::Persistence(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
