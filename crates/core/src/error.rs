//! Unified error types for the asset tracker.
//!
//! Error codes surfaced to API clients:
//! - VALIDATION_ERROR: malformed input (400)
//! - NOT_FOUND: unknown computer or assignment (404)
//! - ALREADY_EXISTS: duplicate MAC address (409)
//! - DATABASE_ERROR: registry failure (500)
//! - RATE_LIMIT_ERROR: client exceeded its request budget (429)
//! - INTERNAL_ERROR: anything else (500)

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes returned in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    NotFound,
    AlreadyExists,
    Database,
    RateLimit,
    Internal,
}

impl ErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Database => "DATABASE_ERROR",
            Self::RateLimit => "RATE_LIMIT_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::RateLimit => 429,
            Self::Database | Self::Internal => 500,
        }
    }
}

/// Unified error type for the asset tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed one or more validation rules.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            details: Vec::new(),
        }
    }

    /// Create a validation error carrying every violated rule.
    pub fn validation_details(details: Vec<String>) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            details,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the API error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::Validation,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::Database(_) => ErrorCode::Database,
            Self::RateLimited(_) => ErrorCode::RateLimit,
            Self::Serialization(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        self.code().http_status()
    }
}
