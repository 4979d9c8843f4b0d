//! Waypost error types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Waypost error types
#[derive(Debug, thiserror::Error)]
pub enum WaypostError {
    // Request shape errors
    #[error("unsupported category/action: {category}/{action}")]
    Unsupported { category: String, action: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Selection errors
    #[error("no provider available for capabilities [{}]", .capabilities.join(", "))]
    NoProviderAvailable { capabilities: Vec<String> },

    /// Every candidate for the request is inside an exhausted rate-limit
    /// window, or the upstream itself answered 429.
    #[error("rate limited: {provider}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("provider {provider} timed out after {elapsed:?}")]
    Timeout { provider: String, elapsed: Duration },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse failure category reported on a [`RoutedResponse`](crate::RoutedResponse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown category/action or malformed parameters. Never retried.
    Unsupported,
    /// The upstream call failed (transport, status, decoding, timeout).
    ProviderFailure,
    /// All candidates were rate limited.
    RateLimited,
    /// No registered provider can serve the request.
    NoProviderAvailable,
}

impl WaypostError {
    /// Map this error onto the response-level [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported { .. } | Self::InvalidInput(_) => ErrorKind::Unsupported,
            Self::NoProviderAvailable { .. } | Self::ProviderNotFound(_) => {
                ErrorKind::NoProviderAvailable
            }
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            _ => ErrorKind::ProviderFailure,
        }
    }

    /// Whether a retry against the same provider might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status == 408 || *status >= 500,
            _ => false,
        }
    }

    /// Whether `route_with_fallback` may try another provider after this error.
    ///
    /// Request-shape errors are programming errors and stop immediately.
    pub fn is_fallback_trigger(&self) -> bool {
        !matches!(self, Self::Unsupported { .. } | Self::InvalidInput(_))
    }

    /// Upstream `retry-after` hint, if the error carries one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub(crate) fn unsupported(category: &str, action: &str) -> Self {
        Self::Unsupported {
            category: category.to_string(),
            action: action.to_string(),
        }
    }
}

/// Result type alias for Waypost operations
pub type Result<T> = std::result::Result<T, WaypostError>;
