use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::ExtractError;
use crate::llm_client::LlmError;

/// Shown when an AI operation is attempted before a key is configured.
pub const MISSING_CREDENTIAL_GUIDANCE: &str = "OpenRouter API key is not configured. \
     Set OPENROUTER_API_KEY in the environment or .env file, \
     or PUT /api/v1/settings/api-key, then try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to save resume: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extract(e @ ExtractError::UnsupportedFormat(_)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                e.to_string(),
            ),
            AppError::Extract(e @ ExtractError::ExtractionFailed { .. }) => {
                tracing::warn!("{e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    e.to_string(),
                )
            }
            AppError::Llm(LlmError::MissingCredential) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MISSING_CREDENTIAL",
                MISSING_CREDENTIAL_GUIDANCE.to_string(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "REQUEST_FAILED",
                    format!("Error processing resume: {e}"),
                )
            }
            AppError::Io(e) => {
                tracing::error!("Output error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "OUTPUT_ERROR",
                    "The resume could not be saved".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
