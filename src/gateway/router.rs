//! Request router: cache, provider selection, dispatch, fallback.
//!
//! # Routing flow
//!
//! ```text
//! route(request)
//!     │
//!     ▼
//! ResponseCache ── hit ──► RoutedResponse { source: "cache", cached: true }
//!     │ miss
//!     ▼
//! Operation::from_request ── Unsupported / InvalidInput ──► failed response
//!     │
//!     ▼
//! ProviderRegistry::try_acquire(capabilities, tiers, has handler)
//!     │ best candidate, window slot taken
//!     ▼
//! ApiProvider::call ──► record_outcome ──► cache insert (success only)
//! ```
//!
//! Every failure on this path is turned into a `RoutedResponse` with
//! `success = false`; [`Router::route`] never returns an error.
//! [`Router::route_with_fallback`] is the one entry point that hands an
//! error back, and only after every qualifying fallback failed too.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheConfig, ResponseCache};
use crate::providers::{ApiProvider, RetryConfig, RetryingProvider};
use crate::registry::ProviderRegistry;
use crate::telemetry;
use crate::types::{
    CACHE_SOURCE, Category, CostTier, Operation, ProviderDefinition, RoutedRequest,
    RoutedResponse,
};
use crate::{ErrorKind, Result, WaypostError};

/// Router behaviour knobs.
///
/// ```rust
/// # use waypost::{CostTier, RouterConfig};
/// # use std::time::Duration;
/// let config = RouterConfig::new()
///     .allowed_cost_tiers([CostTier::Free, CostTier::Freemium])
///     .dispatch_timeout(Duration::from_secs(10))
///     .batch_concurrency(8);
/// ```
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Cost tiers selection may pick from. Default: all.
    pub allowed_cost_tiers: Vec<CostTier>,
    /// Upper bound on a single provider dispatch. Default: none.
    pub dispatch_timeout: Option<Duration>,
    /// Maximum in-flight requests per `batch_route`. Default: unbounded.
    pub batch_concurrency: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allowed_cost_tiers: CostTier::ALL.to_vec(),
            dispatch_timeout: None,
            batch_concurrency: None,
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed_cost_tiers(mut self, tiers: impl IntoIterator<Item = CostTier>) -> Self {
        self.allowed_cost_tiers = tiers.into_iter().collect();
        self
    }

    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = Some(timeout);
        self
    }

    pub fn batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = Some(limit);
        self
    }
}

/// Successful attempt, before timing is attached.
struct Answer {
    data: Value,
    source: String,
    cached: bool,
}

impl Answer {
    fn into_response(self, elapsed: Duration) -> RoutedResponse {
        RoutedResponse::ok(self.data, self.source, elapsed, self.cached)
    }
}

/// Routes [`RoutedRequest`]s to registered providers.
///
/// Owns the registry, the response cache and the provider handlers. Build
/// one with [`Waypost::builder()`](crate::Waypost::builder) or
/// [`Router::new`], and share it behind an `Arc`.
pub struct Router {
    registry: ProviderRegistry,
    handlers: RwLock<HashMap<String, Arc<dyn ApiProvider>>>,
    cache: ResponseCache,
    config: RouterConfig,
    retry: Option<RetryConfig>,
}

impl Router {
    pub fn new(config: RouterConfig, cache: &CacheConfig, retry: Option<RetryConfig>) -> Self {
        Self {
            registry: ProviderRegistry::new(),
            handlers: RwLock::new(HashMap::new()),
            cache: ResponseCache::new(cache),
            config,
            retry,
        }
    }

    /// Register a descriptor together with the handler that serves it.
    ///
    /// The handler is keyed by `definition.id`. With a retry config set, the
    /// handler is wrapped in a [`RetryingProvider`]. Invalid descriptors are
    /// rejected with [`WaypostError::Configuration`].
    pub fn register(
        &self,
        definition: ProviderDefinition,
        handler: Arc<dyn ApiProvider>,
    ) -> Result<()> {
        definition.validate()?;
        let handler = match &self.retry {
            Some(config) if config.max_attempts > 1 => {
                Arc::new(RetryingProvider::new(handler, config.clone())) as Arc<dyn ApiProvider>
            }
            _ => handler,
        };
        let id = definition.id.clone();
        self.registry.register(definition);
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handler);
        Ok(())
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn handler(&self, id: &str) -> Option<Arc<dyn ApiProvider>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Route one request. Failures come back as `success = false`.
    #[instrument(skip(self, request), fields(category = %request.category, action = %request.action))]
    pub async fn route(&self, request: &RoutedRequest) -> RoutedResponse {
        let start = Instant::now();
        match self.attempt(request, None).await {
            Ok(answer) => answer.into_response(start.elapsed()),
            Err(e) => RoutedResponse::failed(&e, start.elapsed()),
        }
    }

    /// Route, then retry against each qualifying fallback in order.
    ///
    /// A fallback qualifies when it is registered, has a handler, and
    /// advertises the request category (or an alias) or one of the
    /// operation's capability tags. Duplicate ids are tried once.
    /// Unsupported or invalid requests are not retried. When everything
    /// fails, the first attempt's error is returned.
    #[instrument(skip(self, request, fallback_ids), fields(category = %request.category, action = %request.action))]
    pub async fn route_with_fallback<S: AsRef<str>>(
        &self,
        request: &RoutedRequest,
        fallback_ids: &[S],
    ) -> Result<RoutedResponse> {
        let start = Instant::now();
        let original = match self.attempt(request, None).await {
            Ok(answer) => return Ok(answer.into_response(start.elapsed())),
            Err(e) => e,
        };
        if !original.is_fallback_trigger() {
            return Err(original);
        }
        let Ok(operation) = Operation::from_request(request) else {
            return Err(original);
        };

        let mut tried = HashSet::new();
        for id in fallback_ids {
            let id = id.as_ref();
            if !tried.insert(id) {
                continue;
            }
            if !self.qualifies_as_fallback(id, request, &operation) {
                debug!(provider = id, "fallback does not qualify, skipping");
                continue;
            }
            metrics::counter!(telemetry::FALLBACKS_TOTAL, "provider" => id.to_owned())
                .increment(1);
            warn!(provider = id, error = %original, "falling back");
            match self.attempt(request, Some(id)).await {
                Ok(answer) => return Ok(answer.into_response(start.elapsed())),
                Err(e) => warn!(provider = id, error = %e, "fallback failed"),
            }
        }
        Err(original)
    }

    /// Route every request concurrently; results keep input order.
    pub async fn batch_route(&self, requests: &[RoutedRequest]) -> Vec<RoutedResponse> {
        let calls = requests.iter().map(|r| self.route(r));
        match self.config.batch_concurrency {
            Some(limit) => stream::iter(calls).buffered(limit.max(1)).collect().await,
            None => join_all(calls).await,
        }
    }

    async fn attempt(&self, request: &RoutedRequest, pinned: Option<&str>) -> Result<Answer> {
        if let Some(data) = self.cache.get_response(request).await {
            return Ok(Answer {
                data,
                source: CACHE_SOURCE.to_string(),
                cached: true,
            });
        }

        let operation = Operation::from_request(request)?;
        let (provider, handler) = match pinned {
            Some(id) => self.pinned(id)?,
            None => self.select(&operation)?,
        };
        let data = self.dispatch(&provider, handler, &operation).await?;
        self.cache.insert_response(request, data.clone()).await;
        Ok(Answer {
            data,
            source: provider.id.clone(),
            cached: false,
        })
    }

    fn select(
        &self,
        operation: &Operation,
    ) -> Result<(Arc<ProviderDefinition>, Arc<dyn ApiProvider>)> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let provider = self.registry.try_acquire(
            operation.capabilities(),
            &self.config.allowed_cost_tiers,
            |p| handlers.contains_key(&p.id),
        )?;
        handlers
            .get(&provider.id)
            .cloned()
            .map(|h| (provider, h))
            .ok_or_else(|| WaypostError::NoProviderAvailable {
                capabilities: operation
                    .capabilities()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            })
    }

    fn pinned(&self, id: &str) -> Result<(Arc<ProviderDefinition>, Arc<dyn ApiProvider>)> {
        let handler = self
            .handler(id)
            .ok_or_else(|| WaypostError::ProviderNotFound(id.to_string()))?;
        let provider = self.registry.acquire(id)?;
        Ok((provider, handler))
    }

    fn qualifies_as_fallback(&self, id: &str, request: &RoutedRequest, operation: &Operation) -> bool {
        let Ok(provider) = self.registry.get(id) else {
            return false;
        };
        if self.handler(id).is_none() {
            return false;
        }
        provider.has_capability(&request.category)
            || Category::parse(&request.category)
                .is_some_and(|c| provider.has_any_capability(c.names()))
            || provider.has_any_capability(operation.capabilities())
    }

    async fn dispatch(
        &self,
        provider: &ProviderDefinition,
        handler: Arc<dyn ApiProvider>,
        operation: &Operation,
    ) -> Result<Value> {
        let start = Instant::now();
        let call = handler.call(operation);
        let result = match self.config.dispatch_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| {
                    Err(WaypostError::Timeout {
                        provider: provider.id.clone(),
                        elapsed: limit,
                    })
                }),
            None => call.await,
        };
        let elapsed = start.elapsed();

        // The handler turned the operation down without going upstream.
        if result
            .as_ref()
            .is_err_and(|e| e.kind() == ErrorKind::Unsupported)
        {
            self.registry.release(&provider.id);
            debug!(provider = %provider.id, "provider declined operation");
            return result;
        }

        if let Err(e) = self
            .registry
            .record_outcome(&provider.id, elapsed, result.is_ok())
        {
            warn!(provider = %provider.id, error = %e, "failed to record usage");
        }
        Self::record_request(&provider.id, operation.category(), elapsed, result.is_ok());

        match &result {
            Ok(_) => debug!(provider = %provider.id, elapsed_ms = elapsed.as_millis() as u64, "provider call succeeded"),
            Err(e) => warn!(provider = %provider.id, error = %e, "provider call failed"),
        }
        result
    }

    fn record_request(provider: &str, category: Category, elapsed: Duration, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => provider.to_owned(),
            "category" => category.as_str(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => provider.to_owned(),
            "category" => category.as_str(),
        )
        .record(elapsed.as_secs_f64());
    }
}
