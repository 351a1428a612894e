//! # Error Handling
//!
//! Two error layers live here:
//!
//! - [`TranscriptionError`]: the tagged error kinds that can occur inside the
//!   transcription pipeline (decode failures, missing models, engine faults).
//!   These never escape the pipeline as raw errors — the orchestrator converts
//!   every one of them into a `TranscriptionResult` with `success = false`.
//! - [`AppError`]: transport-level errors returned by HTTP handlers before the
//!   pipeline is ever invoked (bad content type, oversized upload, unknown
//!   language), mapped onto status codes via actix's `ResponseError`.

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Failure modes of the transcription pipeline.
///
/// ## Variants:
/// - **Decode**: input bytes could not be parsed as audio at all (corrupt or
///   unsupported codec). Distinct from the transport content-type allow-list,
///   which is checked before the pipeline runs.
/// - **ModelNotFound**: the resolved language has no model directory on disk.
/// - **EngineUnavailable**: the recognition engine is missing at process
///   level (service was built or started without it).
/// - **Recognition**: the engine raised mid-stream while consuming PCM.
/// - **Io**: temporary-artifact creation/read/delete failures.
#[derive(Debug)]
pub enum TranscriptionError {
    Decode(String),
    ModelNotFound(String),
    EngineUnavailable(String),
    Recognition(String),
    Io(String),
}

impl fmt::Display for TranscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptionError::Decode(msg) => {
                write!(f, "Failed to convert audio to canonical PCM: {}", msg)
            }
            TranscriptionError::ModelNotFound(msg) => {
                write!(f, "Failed to load speech recognition model: {}", msg)
            }
            TranscriptionError::EngineUnavailable(msg) => {
                write!(f, "Speech recognition is not available: {}", msg)
            }
            TranscriptionError::Recognition(msg) => {
                write!(f, "Audio processing failed: {}", msg)
            }
            TranscriptionError::Io(msg) => {
                write!(f, "Audio artifact I/O failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for TranscriptionError {}

impl From<std::io::Error> for TranscriptionError {
    fn from(err: std::io::Error) -> Self {
        TranscriptionError::Io(err.to_string())
    }
}

impl From<hound::Error> for TranscriptionError {
    fn from(err: hound::Error) -> Self {
        TranscriptionError::Io(err.to_string())
    }
}

/// Transport-level errors for the HTTP surface.
///
/// ## HTTP Status Code Mapping:
/// - Internal/ConfigError → 500
/// - BadRequest/ValidationError → 400
/// - NotFound → 404
/// - PayloadTooLarge → 413
#[derive(Debug)]
pub enum AppError {
    /// Server-side problems (blocking pool failures, poisoned locks, etc.)
    Internal(String),

    /// Client sent invalid or malformed data
    BadRequest(String),

    /// Requested resource was not found
    NotFound(String),

    /// Configuration file or environment variable problems
    ConfigError(String),

    /// Uploaded file or form field failed validation rules
    ValidationError(String),

    /// Uploaded file exceeds the configured size limit
    PayloadTooLarge(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type, message) = match self {
            AppError::Internal(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
            AppError::BadRequest(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "bad_request",
                msg.clone(),
            ),
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "not_found",
                msg.clone(),
            ),
            AppError::ConfigError(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                msg.clone(),
            ),
            AppError::ValidationError(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => (
                actix_web::http::StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                msg.clone(),
            ),
        };

        HttpResponse::build(status).json(json!({
            "error": {
                "type": error_type,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        }))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

/// Shorthand for handler results.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_error_messages() {
        let err = TranscriptionError::Decode("no audio track found".to_string());
        assert!(err.to_string().contains("canonical PCM"));

        let err = TranscriptionError::EngineUnavailable("built without vosk".to_string());
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).error_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayloadTooLarge("x".into()).error_response().status(),
            actix_web::http::StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::NotFound("x".into()).error_response().status(),
            actix_web::http::StatusCode::NOT_FOUND
        );
    }
}
