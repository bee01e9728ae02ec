use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::notifications::service::NotificationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Cooldown active, {remaining_seconds}s remaining")]
    CooldownActive { remaining_seconds: u64 },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::CooldownActive { remaining_seconds } => {
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(serde_json::json!({
                        "error": "Cooldown active",
                        "remainingSeconds": remaining_seconds,
                    })),
                )
                    .into_response();
            }
            AppError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            // Internal details go to the log, never to the client.
            AppError::TokenCreationError(msg) => {
                error!(error = %msg, "Token creation failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::InternalServerError(msg) => {
                error!(error = %msg, "Unexpected failure while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

/// Malformed or mistyped request bodies get the same `{"error": ..}` shape as every other 400.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::MissingVapidKeys => {
                AppError::Configuration(NotificationError::MissingVapidKeys.to_string())
            }
            NotificationError::InvalidInput(msg) => AppError::InvalidInput(msg),
            NotificationError::CooldownActive { remaining_seconds } => {
                AppError::CooldownActive { remaining_seconds }
            }
            NotificationError::DatabaseError(db_err) => AppError::DatabaseError(db_err.to_string()),
        }
    }
}
