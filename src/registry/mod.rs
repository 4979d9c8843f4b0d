//! Provider registry: catalog, usage statistics and rate-limit windows.
//!
//! The registry is the single owner of per-provider mutable state. Every
//! registered id always has a descriptor, a [`ProviderUsageStats`] and a
//! [`RateLimitWindow`]; all three are created under one lock acquisition.
//!
//! # Selection
//!
//! [`ProviderRegistry::select_best`] keeps providers that
//!
//! 1. advertise at least one requested capability,
//! 2. have a cost tier in the allowed set,
//! 3. are not inside an exhausted rate-limit window,
//!
//! then ranks survivors by `reliability - errors / max(requests, 1)`,
//! highest first. The sort is stable, so ties go to the provider that was
//! registered first.
//!
//! # Concurrency
//!
//! State sits behind a single `std::sync::Mutex`. [`ProviderRegistry::try_acquire`]
//! and [`ProviderRegistry::acquire`] check the window and count the call
//! under one acquisition, so a burst never dispatches past the quota. The
//! router reserves a slot before dispatching and reports the outcome with
//! [`ProviderRegistry::record_outcome`] once the call returns.

pub mod catalog;
mod rate_limit;

pub use rate_limit::{RateLimitStatus, RateLimitWindow};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::{Category, CostTier, ProviderDefinition};
use crate::{Result, WaypostError};

/// Cumulative usage for one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderUsageStats {
    pub request_count: u64,
    pub error_count: u64,
    /// Smoothed as `(previous + latest) / 2`, not a true mean.
    pub average_response_time_ms: f64,
    #[serde(skip)]
    pub last_used: Option<Instant>,
}

impl ProviderUsageStats {
    /// `errors / max(requests, 1)`.
    pub fn error_rate(&self) -> f64 {
        self.error_count as f64 / self.request_count.max(1) as f64
    }
}

#[derive(Default)]
struct RegistryState {
    /// Ids in first-registration order; drives tie-breaking.
    order: Vec<String>,
    providers: HashMap<String, Arc<ProviderDefinition>>,
    stats: HashMap<String, ProviderUsageStats>,
    windows: HashMap<String, RateLimitWindow>,
}

impl RegistryState {
    fn in_order(&self) -> impl Iterator<Item = &Arc<ProviderDefinition>> {
        self.order.iter().filter_map(|id| self.providers.get(id))
    }

    fn score(&self, provider: &ProviderDefinition) -> f64 {
        let error_rate = self
            .stats
            .get(&provider.id)
            .map(ProviderUsageStats::error_rate)
            .unwrap_or(0.0);
        provider.reliability - error_rate
    }

    fn is_limited(&self, provider: &ProviderDefinition, now: Instant) -> bool {
        self.windows
            .get(&provider.id)
            .is_some_and(|w| w.is_limited(now, &provider.rate_limit))
    }

    fn rank<S, F>(
        &self,
        capabilities: &[S],
        allowed_tiers: &[CostTier],
        accept: F,
        now: Instant,
    ) -> Result<Vec<Arc<ProviderDefinition>>>
    where
        S: AsRef<str>,
        F: Fn(&ProviderDefinition) -> bool,
    {
        let capable: Vec<&Arc<ProviderDefinition>> = self
            .in_order()
            .filter(|p| p.has_any_capability(capabilities))
            .filter(|p| allowed_tiers.contains(&p.cost))
            .filter(|p| accept(p))
            .collect();

        if capable.is_empty() {
            return Err(no_provider(capabilities));
        }

        let mut scored: Vec<(f64, Arc<ProviderDefinition>)> = Vec::with_capacity(capable.len());
        let mut first_limited = None;
        for provider in capable {
            if self.is_limited(provider, now) {
                metrics::counter!(telemetry::RATE_LIMITED_TOTAL,
                    "provider" => provider.id.clone(),
                )
                .increment(1);
                first_limited.get_or_insert_with(|| provider.id.clone());
                continue;
            }
            scored.push((self.score(provider), Arc::clone(provider)));
        }

        if scored.is_empty() {
            return Err(WaypostError::RateLimited {
                provider: first_limited.unwrap_or_default(),
                retry_after: None,
            });
        }

        // Stable: equal scores keep registration order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        Ok(scored.into_iter().map(|(_, p)| p).collect())
    }

    fn update_stats(&mut self, id: &str, elapsed: Duration, success: bool, now: Instant) {
        let stats = self.stats.entry(id.to_string()).or_default();
        stats.request_count += 1;
        if !success {
            stats.error_count += 1;
        }
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        stats.average_response_time_ms = (stats.average_response_time_ms + elapsed_ms) / 2.0;
        stats.last_used = Some(now);
    }

    fn take_slot(&mut self, provider: &ProviderDefinition, now: Instant) {
        self.windows
            .entry(provider.id.clone())
            .or_default()
            .record(now, &provider.rate_limit);
    }
}

fn no_provider<S: AsRef<str>>(capabilities: &[S]) -> WaypostError {
    WaypostError::NoProviderAvailable {
        capabilities: capabilities
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect(),
    }
}

/// Catalog of providers with usage tracking and fixed-window rate limits.
#[derive(Default)]
pub struct ProviderRegistry {
    state: Mutex<RegistryState>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `providers`, in order.
    pub fn with_providers(providers: impl IntoIterator<Item = ProviderDefinition>) -> Self {
        let registry = Self::new();
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    // Updates are single-step map writes, so a poisoned guard still holds
    // consistent state.
    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite a descriptor.
    ///
    /// Re-registering an id replaces the descriptor but keeps its usage
    /// stats, its rate-limit window and its original position for
    /// tie-breaking.
    pub fn register(&self, provider: ProviderDefinition) {
        let mut state = self.state();
        let id = provider.id.clone();
        if !state.providers.contains_key(&id) {
            state.order.push(id.clone());
        }
        state.stats.entry(id.clone()).or_default();
        state.windows.entry(id.clone()).or_default();
        debug!(provider = %id, capabilities = ?provider.capabilities, "registered provider");
        state.providers.insert(id, Arc::new(provider));
    }

    /// Look up a descriptor by id.
    pub fn get(&self, id: &str) -> Result<Arc<ProviderDefinition>> {
        self.state()
            .providers
            .get(id)
            .cloned()
            .ok_or_else(|| WaypostError::ProviderNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state().providers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All descriptors in registration order.
    pub fn providers(&self) -> Vec<Arc<ProviderDefinition>> {
        self.state().in_order().cloned().collect()
    }

    /// Providers whose category matches `category`. Category aliases
    /// (e.g. `github` for `development`) are treated as equal.
    pub fn list_by_category(&self, category: &str) -> Vec<Arc<ProviderDefinition>> {
        let wanted = Category::parse(category);
        self.state()
            .in_order()
            .filter(|p| {
                p.category == category
                    || (wanted.is_some() && Category::parse(&p.category) == wanted)
            })
            .cloned()
            .collect()
    }

    /// Providers advertising `capability`.
    pub fn list_by_capability(&self, capability: &str) -> Vec<Arc<ProviderDefinition>> {
        self.state()
            .in_order()
            .filter(|p| p.has_capability(capability))
            .cloned()
            .collect()
    }

    /// Highest-ranked eligible provider for `capabilities` (any-of).
    ///
    /// Returns [`WaypostError::NoProviderAvailable`] when nothing advertises
    /// the capabilities in an allowed tier, and [`WaypostError::RateLimited`]
    /// when candidates exist but every one is rate limited. Does not take a
    /// window slot; see [`try_acquire`](Self::try_acquire).
    pub fn select_best<S: AsRef<str>>(
        &self,
        capabilities: &[S],
        allowed_tiers: &[CostTier],
    ) -> Result<Arc<ProviderDefinition>> {
        self.candidates_where(capabilities, allowed_tiers, |_| true)?
            .into_iter()
            .next()
            .ok_or_else(|| no_provider(capabilities))
    }

    /// Eligible providers, best first. Never returns an empty vec.
    ///
    /// `accept` narrows the candidate set before rate limits are consulted
    /// (the router uses it to skip providers without a bound handler).
    pub fn candidates_where<S, F>(
        &self,
        capabilities: &[S],
        allowed_tiers: &[CostTier],
        accept: F,
    ) -> Result<Vec<Arc<ProviderDefinition>>>
    where
        S: AsRef<str>,
        F: Fn(&ProviderDefinition) -> bool,
    {
        self.state()
            .rank(capabilities, allowed_tiers, accept, Instant::now())
    }

    /// Select the best eligible provider and count one call against its
    /// window, atomically.
    ///
    /// Errors as [`candidates_where`](Self::candidates_where). Follow up
    /// with [`record_outcome`](Self::record_outcome), or
    /// [`release`](Self::release) when no upstream call was made.
    pub fn try_acquire<S, F>(
        &self,
        capabilities: &[S],
        allowed_tiers: &[CostTier],
        accept: F,
    ) -> Result<Arc<ProviderDefinition>>
    where
        S: AsRef<str>,
        F: Fn(&ProviderDefinition) -> bool,
    {
        let now = Instant::now();
        let mut state = self.state();
        let best = state
            .rank(capabilities, allowed_tiers, accept, now)?
            .into_iter()
            .next()
            .ok_or_else(|| no_provider(capabilities))?;
        state.take_slot(&best, now);
        Ok(best)
    }

    /// Count one call against `id`'s window unless it is exhausted.
    ///
    /// Cost tiers are not consulted. Fails with `ProviderNotFound` or
    /// `RateLimited`.
    pub fn acquire(&self, id: &str) -> Result<Arc<ProviderDefinition>> {
        let now = Instant::now();
        let mut state = self.state();
        let provider = state
            .providers
            .get(id)
            .cloned()
            .ok_or_else(|| WaypostError::ProviderNotFound(id.to_string()))?;
        if state.is_limited(&provider, now) {
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL, "provider" => id.to_owned())
                .increment(1);
            return Err(WaypostError::RateLimited {
                provider: id.to_string(),
                retry_after: None,
            });
        }
        state.take_slot(&provider, now);
        Ok(provider)
    }

    /// Hand back a slot taken by [`acquire`](Self::acquire) or
    /// [`try_acquire`](Self::try_acquire) for a call that never went
    /// upstream. A window that has since rolled over is left alone.
    pub fn release(&self, id: &str) {
        if let Some(window) = self.state().windows.get_mut(id) {
            window.release(Instant::now());
        }
    }

    /// Record one dispatched call: stats plus the rate-limit window.
    pub fn record_usage(&self, id: &str, elapsed: Duration, success: bool) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state();
        let provider = state
            .providers
            .get(id)
            .cloned()
            .ok_or_else(|| WaypostError::ProviderNotFound(id.to_string()))?;
        state.update_stats(id, elapsed, success, now);
        state.take_slot(&provider, now);
        Ok(())
    }

    /// Record the result of a call whose window slot was already taken.
    pub fn record_outcome(&self, id: &str, elapsed: Duration, success: bool) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state();
        if !state.providers.contains_key(id) {
            return Err(WaypostError::ProviderNotFound(id.to_string()));
        }
        state.update_stats(id, elapsed, success, now);
        Ok(())
    }

    /// Whether `id` is inside an exhausted window. Unknown ids are not limited.
    pub fn is_rate_limited(&self, id: &str) -> bool {
        let state = self.state();
        state
            .providers
            .get(id)
            .is_some_and(|p| state.is_limited(p, Instant::now()))
    }

    /// Usage stats snapshot for `id`.
    pub fn usage(&self, id: &str) -> Option<ProviderUsageStats> {
        self.state().stats.get(id).cloned()
    }

    /// Rate-limit window snapshot for `id`.
    pub fn rate_limit_status(&self, id: &str) -> Option<RateLimitStatus> {
        let state = self.state();
        let provider = state.providers.get(id)?;
        let window = state.windows.get(id)?;
        Some(window.status(Instant::now(), &provider.rate_limit))
    }
}
