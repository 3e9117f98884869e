//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use thiserror::Error;

/// The external dependency an [`StrataError::UpstreamUnavailable`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Upstream {
    /// The durable record store.
    Store,
    /// The key-value cache.
    Cache,
}

impl Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => write!(f, "store"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

/// Unified error type for Strata.
///
/// The first five variants are the outcomes a repository caller can see.
/// `Serialization` is produced by the cache codec only; the repository
/// downgrades it to a cache miss before it can reach a caller.
#[derive(Error, Debug)]
pub enum StrataError {
    /// No matching active record.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Duplicate entry, e.g. an active record already owns the email.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed or empty input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store or cache unreachable, failing, or past its deadline.
    #[error("Upstream unavailable: {upstream} - {message}")]
    UpstreamUnavailable { upstream: Upstream, message: String },

    /// A cached payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::RateLimitExceeded => 429,
            Self::UpstreamUnavailable { .. } => 503,
            Self::Serialization(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a store-unavailable error.
    #[must_use]
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::UpstreamUnavailable {
            upstream: Upstream::Store,
            message: message.into(),
        }
    }

    /// Creates a cache-unavailable error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::UpstreamUnavailable {
            upstream: Upstream::Cache,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for `NotFound`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the upstream this error blames, if any.
    #[must_use]
    pub const fn upstream(&self) -> Option<Upstream> {
        match self {
            Self::UpstreamUnavailable { upstream, .. } => Some(*upstream),
            _ => None,
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StrataError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation, raised by the partial email index
                if db_err.code().is_some_and(|code| code == "23505") {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::store(err.to_string())
            }
            _ => Self::store(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Request trace ID for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `StrataError`.
    ///
    /// Internal failures are reported with a generic message so that raw
    /// driver errors never leave the process.
    #[must_use]
    pub fn from_error(error: &StrataError) -> Self {
        let message = match error {
            StrataError::Serialization(_)
            | StrataError::Configuration(_)
            | StrataError::Internal(_)
            | StrataError::Other(_) => "Internal server error".to_string(),
            StrataError::UpstreamUnavailable { upstream, .. } => {
                format!("Upstream unavailable: {upstream}")
            }
            other => other.to_string(),
        };

        Self {
            code: error.error_code().to_string(),
            message,
            details: None,
            trace_id: None,
        }
    }

    /// Sets the trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&StrataError> for ErrorResponse {
    fn from(error: &StrataError) -> Self {
        Self::from_error(error)
    }
}
