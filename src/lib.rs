//! Waypost - API routing and caching core
//!
//! This crate routes structured requests (`category` + `action` +
//! parameters) to one of several registered upstream API providers. It
//! picks the provider by capability, cost tier, reliability and observed
//! error rate, enforces per-provider rate-limit windows, caches successful
//! responses for a configurable TTL, and falls back to alternates when the
//! first choice fails.
//!
//! # Routing Example
//!
//! ```rust,no_run
//! use waypost::{RoutedRequest, Waypost};
//!
//! #[tokio::main]
//! async fn main() -> waypost::Result<()> {
//!     let router = Waypost::builder()
//!         .wikipedia()
//!         .open_meteo()
//!         .github(None)
//!         .build()?;
//!
//!     let response = router
//!         .route(
//!             &RoutedRequest::new("weather", "current")
//!                 .param("latitude", 52.52)
//!                 .param("longitude", 13.41),
//!         )
//!         .await;
//!
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! # Custom Providers
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use waypost::{CacheConfig, CostTier, ProviderDefinition, RateLimit, Waypost};
//!
//! let router = Waypost::builder()
//!     .provider(
//!         ProviderDefinition::new("dictionary", "Dictionary", "research")
//!             .capabilities(["encyclopedia"])
//!             .cost(CostTier::Free)
//!             .reliability(0.9)
//!             .rate_limit(RateLimit::new(30, Duration::from_secs(60))),
//!         Arc::new(Dictionary::default()),
//!     )
//!     .response_cache(CacheConfig::default().ttl(Duration::from_secs(60)))
//!     .build()?;
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod registry;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use error::{ErrorKind, Result, WaypostError};
pub use gateway::{Router, RouterConfig, Waypost, WaypostBuilder};
pub use providers::{ApiProvider, RetryConfig, RetryingProvider};
pub use registry::{ProviderRegistry, ProviderUsageStats, RateLimitStatus};

// Re-export all types
pub use types::{
    AuthType, CACHE_SOURCE, Category, Coordinates, CostTier, DevelopmentOp, ForecastQuery,
    HeadlinesQuery, IssueQuery, IssueState, NewsOp, NewsQuery, NewsSearch, Operation, PaperRef,
    PaperSearch, Priority, ProviderDefinition, ROUTER_SOURCE, RateLimit, RepoRef, RepoSearch,
    ResearchOp, RouteFailure, RoutedRequest, RoutedResponse, TrendingQuery, WeatherOp,
    WikipediaPage, WikipediaSearch,
};

/// Crate version, used in the HTTP user agent.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
