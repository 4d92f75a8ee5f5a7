//! API error handling
//!
//! Every failure answers with the same JSON shape, `{error, message?, details?}`,
//! where `error` is a short fixed string the UI can match on.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bibleverse_llm::LLMError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Shown while the upstream model is still starting
pub const MODEL_LOADING_MESSAGE: &str = "모델이 시작 중입니다. 잠시 후 다시 시도해주세요.";

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("Situation is required")]
    SituationRequired,

    #[error("Invalid situation")]
    ValidationError(String),

    #[error("Invalid request body")]
    InvalidRequestBody(String),

    #[error("Request too large")]
    RequestTooLarge,

    #[error("Method not allowed")]
    MethodNotAllowed,

    // =========================================================================
    // Upstream Errors
    // =========================================================================
    #[error("API key not configured")]
    ApiKeyNotConfigured,

    #[error("Model is loading")]
    ModelLoading,

    #[error("API request failed")]
    UpstreamFailed { status: StatusCode, details: String },

    #[error("Failed to parse response")]
    ParseFailed,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::SituationRequired | Self::ValidationError(_) | Self::InvalidRequestBody(_) => {
                StatusCode::BAD_REQUEST
            }

            // 405 Method Not Allowed
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            // 413 Payload Too Large
            Self::RequestTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // Upstream status passed through
            Self::UpstreamFailed { status, .. } => *status,

            // 503 Service Unavailable
            Self::ModelLoading => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::ApiKeyNotConfigured | Self::ParseFailed | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> Option<String> {
        match self {
            Self::ModelLoading => Some(MODEL_LOADING_MESSAGE.to_string()),
            Self::ValidationError(m) | Self::InvalidRequestBody(m) | Self::Internal(m) => {
                Some(m.clone())
            }
            _ => None,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::UpstreamFailed { details, .. } => Some(details.clone()),
            _ => None,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Short fixed error string
    pub error: String,
    /// Human-readable explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Upstream response body, for passthrough failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            message: err.message(),
            details: err.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<LLMError> for ApiError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::ApiKeyMissing { .. } => Self::ApiKeyNotConfigured,
            LLMError::UpstreamStatus { status: 503, .. } => Self::ModelLoading,
            LLMError::UpstreamStatus { status, body } => Self::UpstreamFailed {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                details: body,
            },
            LLMError::Extraction(_) => Self::ParseFailed,
            LLMError::ConfigurationError { message }
            | LLMError::NetworkError { message }
            | LLMError::InvalidResponse { message } => Self::Internal(message),
        }
    }
}
