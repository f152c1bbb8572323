use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai_client::AiError;
use crate::extract::ExtractError;
use crate::schemas::ValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported resume format. Please upload PDF or DOCX.")]
    UnsupportedFormat,

    #[error("Failed to extract text from resume: {0}")]
    Extraction(#[source] anyhow::Error),

    #[error("Validation failed")]
    Validation(#[from] ValidationError),

    #[error("AI provider is not configured")]
    ProviderUnavailable,

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("Could not derive structured data from the resume")]
    ExtractionUnrecoverable,

    #[error("Rate limit exceeded. Try again in a few minutes.")]
    RateLimited,

    #[error("Synchronization failed: {0}")]
    Sync(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported => AppError::UnsupportedFormat,
            ExtractError::Failed(cause) => AppError::Extraction(cause),
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::MissingCredentials => AppError::ProviderUnavailable,
            AiError::Http(e) => AppError::Provider(e.to_string()),
            AiError::Api { status, message } => {
                AppError::Provider(format!("status {status}: {message}"))
            }
            AiError::EmptyContent => AppError::Provider("response missing content".to_string()),
            AiError::Schema(e) => AppError::Validation(e),
            AiError::NoJson | AiError::Parse(_) | AiError::Unrecoverable => {
                AppError::ExtractionUnrecoverable
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::UnsupportedFormat => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                self.to_string(),
                None,
            ),
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e:?}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    "Could not read text from the uploaded resume".to_string(),
                    None,
                )
            }
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                serde_json::to_value(&e.violations).ok(),
            ),
            AppError::ProviderUnavailable => {
                tracing::error!("AI provider credentials are missing");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PROVIDER_UNAVAILABLE",
                    "Resume parsing is temporarily unavailable".to_string(),
                    None,
                )
            }
            AppError::Provider(msg) => {
                tracing::error!("AI provider error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDER_ERROR",
                    "The AI provider could not process the request".to_string(),
                    None,
                )
            }
            AppError::ExtractionUnrecoverable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_UNRECOVERABLE",
                self.to_string(),
                None,
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                self.to_string(),
                None,
            ),
            AppError::Sync(e) => {
                tracing::error!("Synchronization error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SYNC_FAILED",
                    "Profile synchronization failed; no changes were applied".to_string(),
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
