//! Error types for the Brand Server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::extract::ExtractError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timed out: {0}")]
    Timeout(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(name) => {
                AppError::Conflict(format!("Brand '{}' already exists", name))
            }
            other => AppError::Store(other),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Timeout(operation) => {
                tracing::error!("Timed out: {}", operation);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "timeout",
                    "The operation timed out".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {}", e);
                match e {
                    ExtractError::ToolUnavailable { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "extraction_unavailable",
                        "PDF text extraction is not available on this server".to_string(),
                    ),
                    ExtractError::Timeout { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "extraction_timeout",
                        "PDF text extraction timed out".to_string(),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "extraction_failed",
                        "Failed to parse PDF content".to_string(),
                    ),
                }
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                match e {
                    StoreError::Timeout(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "timeout",
                        "Database operation timed out".to_string(),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "database_error",
                        "Database error".to_string(),
                    ),
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) && status.is_client_error() {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = body_json(AppError::NotFound("Brand 'Acme' not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Brand 'Acme' not found");

        let (status, body) = body_json(StoreError::Conflict("Acme".into()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["message"], "Brand 'Acme' already exists");
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_leaked() {
        let err = AppError::Extraction(ExtractError::Failed {
            tool: "pdftotext".into(),
            code: Some(1),
            stderr: "Syntax Error: /srv/uploads/secret.pdf".into(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "extraction_failed");
        assert!(body.get("details").is_none());
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_error_codes() {
        let cases = [
            (
                AppError::Extraction(ExtractError::ToolUnavailable { tool: "pdftotext".into() }),
                "extraction_unavailable",
            ),
            (
                AppError::Extraction(ExtractError::Timeout {
                    tool: "pdftotext".into(),
                    timeout: Duration::from_secs(15),
                }),
                "extraction_timeout",
            ),
            (StoreError::Timeout(Duration::from_secs(5)).into(), "timeout"),
            (AppError::Timeout("PDF upload"), "timeout"),
            (AppError::Internal("boom".into()), "internal_error"),
        ];
        for (err, code) in cases {
            let (status, body) = body_json(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], code);
        }
    }
}
