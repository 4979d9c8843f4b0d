//! Telemetry metric name constants.
//!
//! Centralised metric names for routing operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `waypost_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider id (e.g. "wikipedia", "github")
//! - `category`: request category (e.g. "research", "weather")
//! - `status`: outcome: "ok" or "error"

/// Total calls dispatched to providers.
///
/// Labels: `provider`, `category`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "waypost_requests_total";

/// Provider dispatch duration in seconds.
///
/// Labels: `provider`, `category`.
pub const REQUEST_DURATION_SECONDS: &str = "waypost_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "waypost_retries_total";

/// Total fallback attempts made by `route_with_fallback`.
///
/// Labels: `provider`.
pub const FALLBACKS_TOTAL: &str = "waypost_fallbacks_total";

/// Total candidates skipped because their window was exhausted.
///
/// Labels: `provider`.
pub const RATE_LIMITED_TOTAL: &str = "waypost_rate_limited_total";

/// Total response cache hits.
///
/// Labels: `category`.
pub const CACHE_HITS_TOTAL: &str = "waypost_cache_hits_total";

/// Total response cache misses.
///
/// Labels: `category`.
pub const CACHE_MISSES_TOTAL: &str = "waypost_cache_misses_total";
