//! Response cache keyed by request fingerprint.
//!
//! [`ResponseCache`] stores successful provider payloads under a
//! deterministic [`fingerprint`] of `(category, action, parameters)`.
//! Failures are never inserted.
//!
//! # Expiry
//!
//! Entries carry an absolute expiry of `insert time + ttl`. Lookups compare
//! against [`tokio::time::Instant`], so paused test time is honoured. An
//! expired entry is dropped on the lookup that finds it and reported as a
//! miss; callers cannot tell it apart from an entry that never existed.
//!
//! Storage is a moka LRU bounded by [`CacheConfig::max_entries`]. Moka's own
//! time-based eviction is not used because it runs on the wall clock.

use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::RoutedRequest;

/// Configuration for the response cache.
///
/// ```rust
/// # use waypost::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

/// In-memory TTL cache of successful payloads.
pub struct ResponseCache {
    entries: Cache<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Cache::new(config.max_entries),
            ttl: config.ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a payload by fingerprint. Expired entries are removed.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key).await?;
        if Instant::now() < entry.expires_at {
            return Some(entry.payload);
        }
        self.entries.invalidate(key).await;
        None
    }

    /// Insert or overwrite a payload, expiring `ttl` from now.
    pub async fn insert(&self, key: String, payload: Value) {
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.insert(key, entry).await;
    }

    /// Fingerprint `request` and look it up. Emits hit/miss metrics.
    pub async fn get_response(&self, request: &RoutedRequest) -> Option<Value> {
        let key = fingerprint(request);
        let hit = self.get(&key).await;
        let category = request.category.clone();
        if hit.is_some() {
            debug!(%key, "cache hit");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "category" => category).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "category" => category).increment(1);
        }
        hit
    }

    /// Fingerprint `request` and store `payload` under it.
    pub async fn insert_response(&self, request: &RoutedRequest, payload: Value) {
        self.insert(fingerprint(request), payload).await;
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate entry count (moka applies writes lazily).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

/// Deterministic cache key for a request.
///
/// JSON of `[category, action, parameters]`. Object keys serialize in sorted
/// order, so two maps with the same contents produce the same key.
pub fn fingerprint(request: &RoutedRequest) -> String {
    Value::Array(vec![
        Value::String(request.category.clone()),
        Value::String(request.action.clone()),
        Value::Object(request.parameters.clone()),
    ])
    .to_string()
}
