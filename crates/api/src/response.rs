//! Standardized API responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::HealthReport;
use tracing::error;
use tracker_core::{ErrorCode, PageMeta};

/// Success envelope for single-record responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Paginated list response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub timestamp: i64,
    pub version: String,
    #[serde(flatten)]
    pub report: HealthReport,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error carrying a status, a JSON body, and an optional `Retry-After`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn with_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            response: ErrorResponse::new(msg, code.code()),
            retry_after: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::Validation, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::NotFound, msg)
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            retry_after,
            ..Self::with_code(ErrorCode::RateLimit, msg)
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::Internal, msg)
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            response: ErrorResponse::new("Validation failed", ErrorCode::Validation.code())
                .with_details(errors),
            ..Self::bad_request("Validation failed")
        }
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.response.error = msg.into();
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        // Add Retry-After header for rate limit responses
        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<tracker_core::Error> for ApiError {
    fn from(err: tracker_core::Error) -> Self {
        match err {
            tracker_core::Error::Validation { message, details } if details.is_empty() => {
                ApiError::validation(vec![message])
            }
            tracker_core::Error::Validation { details, .. } => ApiError::validation(details),
            tracker_core::Error::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            tracker_core::Error::AlreadyExists(what) => {
                ApiError::with_code(ErrorCode::AlreadyExists, format!("{} already exists", what))
            }
            tracker_core::Error::RateLimited(msg) => ApiError::rate_limited(msg, Some(1)),
            err @ tracker_core::Error::Database(_) => {
                error!(error = %err, "Registry operation failed");
                ApiError::with_code(ErrorCode::Database, "Database operation failed")
            }
            err => {
                error!(error = %err, "Request failed");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<registry::RegistryError> for ApiError {
    fn from(err: registry::RegistryError) -> Self {
        tracker_core::Error::from(err).into()
    }
}
