//! Mapping from failures to HTTP responses
//!
//! Client errors carry enough detail to fix the payload. Server errors carry
//! a fixed message; the detail goes to the log only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::render::{RenderError, TemplateError};
use crate::schema::{ValidationError, Violation};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed upload: {0}")]
    MalformedUpload(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    TemplateNotFound(#[from] TemplateError),

    #[error(transparent)]
    RenderingFailed(#[from] RenderError),

    #[error("render task failed: {0}")]
    RenderTask(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(e) if e.is_malformed() => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::TemplateNotFound(_)
            | ApiError::RenderingFailed(_)
            | ApiError::RenderTask(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(e) if e.is_malformed() => "malformed_input",
            ApiError::Validation(_) => "validation_failed",
            ApiError::MalformedUpload(_) => "malformed_input",
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::TemplateNotFound(TemplateError::Unreadable { .. }) => "templates_unavailable",
            ApiError::TemplateNotFound(_) => "template_not_found",
            ApiError::RenderingFailed(_) | ApiError::RenderTask(_) => "rendering_failed",
        }
    }

    fn into_body(self) -> ErrorResponse {
        let error = self.code();
        match self {
            ApiError::Validation(e) => ErrorResponse {
                error,
                message: e.summary().to_string(),
                violations: Some(e.into_violations()),
            },
            ApiError::TemplateNotFound(TemplateError::Unreadable { .. }) => ErrorResponse {
                error,
                message: "document templates are not available".to_string(),
                violations: None,
            },
            ApiError::TemplateNotFound(_) => ErrorResponse {
                error,
                message: "document template is not available".to_string(),
                violations: None,
            },
            ApiError::RenderingFailed(_) | ApiError::RenderTask(_) => ErrorResponse {
                error,
                message: "document could not be generated".to_string(),
                violations: None,
            },
            other => ErrorResponse {
                error,
                message: other.to_string(),
                violations: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error=%self, code=self.code(), "document generation failed");
        } else {
            tracing::warn!(error=%self, code=self.code(), "request rejected");
        }

        (status, Json(self.into_body())).into_response()
    }
}
