//! Routed response envelope

use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ErrorKind, WaypostError};

/// `source` reported for responses served from the response cache.
pub const CACHE_SOURCE: &str = "cache";

/// `source` reported for failures raised before or around dispatch.
pub const ROUTER_SOURCE: &str = "router";

/// Structured failure carried by an unsuccessful [`RoutedResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&WaypostError> for RouteFailure {
    fn from(err: &WaypostError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of routing one request. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RouteFailure>,
    /// `"cache"`, `"router"` or the id of the provider that answered.
    pub source: String,
    #[serde(serialize_with = "as_millis")]
    pub response_time: Duration,
    pub cached: bool,
}

impl RoutedResponse {
    pub(crate) fn ok(
        data: Value,
        source: impl Into<String>,
        response_time: Duration,
        cached: bool,
    ) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source: source.into(),
            response_time,
            cached,
        }
    }

    pub(crate) fn failed(err: &WaypostError, response_time: Duration) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(RouteFailure::from(err)),
            source: ROUTER_SOURCE.to_string(),
            response_time,
            cached: false,
        }
    }

    /// Failure kind, if this response is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Failure message, if this response is a failure.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

fn as_millis<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_wire_shape() {
        let resp = RoutedResponse::ok(
            serde_json::json!({"title": "Entropy"}),
            "wiki",
            Duration::from_millis(42),
            false,
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["source"], "wiki");
        assert_eq!(json["responseTime"], 42);
        assert_eq!(json["cached"], false);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_carries_kind_and_message() {
        let err = WaypostError::Http("connection reset".into());
        let resp = RoutedResponse::failed(&err, Duration::from_millis(3));
        assert!(!resp.success);
        assert_eq!(resp.source, ROUTER_SOURCE);
        assert_eq!(resp.error_kind(), Some(ErrorKind::ProviderFailure));
        assert_eq!(resp.error_message(), Some("HTTP error: connection reset"));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"]["kind"], "provider_failure");
    }
}
