//! Builder for configuring router instances

use std::sync::Arc;
use std::time::Duration;

use super::{Router, RouterConfig};
use crate::cache::CacheConfig;
use crate::providers::{ApiProvider, RetryConfig};
use crate::types::{CostTier, ProviderDefinition};
use crate::{Result, WaypostError};

#[cfg(feature = "integrations")]
use crate::providers::{
    GithubClient, NewsApiClient, OpenMeteoClient, SemanticScholarClient, WeatherGovClient,
    WikipediaClient,
};
#[cfg(feature = "integrations")]
use crate::registry::catalog;

/// Main entry point for creating router instances.
pub struct Waypost;

impl Waypost {
    /// Create a new builder for configuring the router.
    pub fn builder() -> WaypostBuilder {
        WaypostBuilder::new()
    }
}

/// Builder for configuring router instances.
///
/// Providers are registered in call order; on equal scores the earlier
/// one wins selection.
///
/// ```rust,no_run
/// use waypost::{RoutedRequest, Waypost};
///
/// #[tokio::main]
/// async fn main() -> waypost::Result<()> {
///     let router = Waypost::builder().wikipedia().semantic_scholar().build()?;
///
///     let response = router
///         .route(&RoutedRequest::new("research", "get_wikipedia").param("title", "Entropy"))
///         .await;
///     println!("{}", serde_json::to_string_pretty(&response)?);
///     Ok(())
/// }
/// ```
pub struct WaypostBuilder {
    providers: Vec<(ProviderDefinition, Arc<dyn ApiProvider>)>,
    router: RouterConfig,
    cache: CacheConfig,
    retry: Option<RetryConfig>,
    #[cfg(feature = "integrations")]
    builtins: Vec<Builtin>,
}

#[cfg(feature = "integrations")]
enum Builtin {
    NewsApi(String),
    OpenMeteo,
    WeatherGov,
    Github(Option<String>),
    Wikipedia,
    SemanticScholar,
}

impl Default for WaypostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypostBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            router: RouterConfig::default(),
            cache: CacheConfig::default(),
            retry: None,
            #[cfg(feature = "integrations")]
            builtins: Vec::new(),
        }
    }

    /// Register a custom provider with its handler.
    pub fn provider(mut self, definition: ProviderDefinition, handler: Arc<dyn ApiProvider>) -> Self {
        self.providers.push((definition, handler));
        self
    }

    /// Configure NewsAPI (requires an API key).
    #[cfg(feature = "integrations")]
    pub fn newsapi(mut self, api_key: impl Into<String>) -> Self {
        self.builtins.push(Builtin::NewsApi(api_key.into()));
        self
    }

    /// Configure Open-Meteo weather.
    #[cfg(feature = "integrations")]
    pub fn open_meteo(mut self) -> Self {
        self.builtins.push(Builtin::OpenMeteo);
        self
    }

    /// Configure National Weather Service alerts.
    #[cfg(feature = "integrations")]
    pub fn weather_gov(mut self) -> Self {
        self.builtins.push(Builtin::WeatherGov);
        self
    }

    /// Configure GitHub, optionally authenticated.
    #[cfg(feature = "integrations")]
    pub fn github(mut self, token: Option<String>) -> Self {
        self.builtins.push(Builtin::Github(token));
        self
    }

    /// Configure Wikipedia.
    #[cfg(feature = "integrations")]
    pub fn wikipedia(mut self) -> Self {
        self.builtins.push(Builtin::Wikipedia);
        self
    }

    /// Configure Semantic Scholar.
    #[cfg(feature = "integrations")]
    pub fn semantic_scholar(mut self) -> Self {
        self.builtins.push(Builtin::SemanticScholar);
        self
    }

    /// Replace the whole router config.
    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.router = config;
        self
    }

    /// Restrict selection to these cost tiers.
    pub fn allowed_cost_tiers(mut self, tiers: impl IntoIterator<Item = CostTier>) -> Self {
        self.router = self.router.allowed_cost_tiers(tiers);
        self
    }

    /// Bound each provider dispatch.
    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.router = self.router.dispatch_timeout(timeout);
        self
    }

    /// Cap in-flight requests per `batch_route`.
    pub fn batch_concurrency(mut self, limit: usize) -> Self {
        self.router = self.router.batch_concurrency(limit);
        self
    }

    /// Configure the response cache (default: 10,000 entries, 5 minute TTL).
    pub fn response_cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Retry transient provider errors. Off by default.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Build the router.
    ///
    /// Fails when no provider is configured, when a descriptor is invalid,
    /// or when an HTTP client cannot be constructed.
    #[cfg_attr(not(feature = "integrations"), allow(unused_mut))]
    pub fn build(self) -> Result<Router> {
        let mut providers = self.providers;

        #[cfg(feature = "integrations")]
        for builtin in self.builtins {
            providers.push(builtin.into_provider()?);
        }

        if providers.is_empty() {
            return Err(WaypostError::Configuration(
                "no providers configured".to_string(),
            ));
        }

        let router = Router::new(self.router, &self.cache, self.retry);
        for (definition, handler) in providers {
            router.register(definition, handler)?;
        }
        Ok(router)
    }
}

#[cfg(feature = "integrations")]
impl Builtin {
    fn into_provider(self) -> Result<(ProviderDefinition, Arc<dyn ApiProvider>)> {
        let provider: (ProviderDefinition, Arc<dyn ApiProvider>) = match self {
            Builtin::NewsApi(key) => (catalog::newsapi(), Arc::new(NewsApiClient::new(key)?)),
            Builtin::OpenMeteo => (catalog::open_meteo(), Arc::new(OpenMeteoClient::new()?)),
            Builtin::WeatherGov => (catalog::weather_gov(), Arc::new(WeatherGovClient::new()?)),
            Builtin::Github(token) => (catalog::github(), Arc::new(GithubClient::new(token)?)),
            Builtin::Wikipedia => (catalog::wikipedia(), Arc::new(WikipediaClient::new()?)),
            Builtin::SemanticScholar => (
                catalog::semantic_scholar(),
                Arc::new(SemanticScholarClient::new()?),
            ),
        };
        Ok(provider)
    }
}
