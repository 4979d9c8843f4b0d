//! Configuration loading for the `waypost` binary.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.waypost/config.toml` (user)
//! 3. `/etc/waypost/config.toml` (system)
//!
//! With no file found the built-in provider catalog is used. Secrets never
//! live in the file; the binary reads `NEWSAPI_KEY` and `GITHUB_TOKEN` from
//! the environment.
//!
//! ```toml
//! [router]
//! allowed_cost_tiers = ["free", "freemium"]
//! timeout_ms = 10000
//! batch_concurrency = 8
//!
//! [cache]
//! ttl_secs = 120
//!
//! [[providers]]
//! id = "wikipedia"
//! name = "Wikipedia"
//! category = "research"
//! capabilities = ["encyclopedia"]
//! cost = "free"
//! reliability = 0.97
//! rateLimit = { requests = 100, windowMs = 60000 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::providers::{
    ApiProvider, GithubClient, NewsApiClient, OpenMeteoClient, RetryConfig, SemanticScholarClient,
    WeatherGovClient, WikipediaClient,
};
use crate::registry::catalog;
use crate::types::{CostTier, ProviderDefinition};
use crate::{CacheConfig, Result, RouterConfig, Waypost, WaypostBuilder, WaypostError};

/// Binary configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub cache: CacheSection,
    /// Retry is off unless this section is present.
    #[serde(default)]
    pub retry: Option<RetrySection>,
    /// Provider descriptors. Empty means the built-in catalog.
    #[serde(default)]
    providers: Vec<toml::Table>,
}

/// `[router]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouterSection {
    /// Cost tiers selection may pick from (default: all).
    #[serde(default)]
    pub allowed_cost_tiers: Option<Vec<CostTier>>,
    /// Per-dispatch timeout in milliseconds (default: none).
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Maximum in-flight requests per batch (default: unbounded).
    #[serde(default)]
    pub batch_concurrency: Option<usize>,
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry time-to-live in seconds (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum cached entries (default: 10000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> u64 {
    10_000
}

/// `[retry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

/// One `[[providers]]` entry: a descriptor plus the integration serving it.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub definition: ProviderDefinition,
    /// Built-in client name. Defaults to the descriptor id.
    pub client: String,
}

/// Secrets taken from the environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub newsapi_key: Option<String>,
    pub github_token: Option<String>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path that does not exist is an error; otherwise a
    /// missing file yields the default config.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            debug!("no config file found, using built-in catalog");
            return Ok(Self::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            WaypostError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            WaypostError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WaypostError::Configuration(e.to_string()))
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(WaypostError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".waypost").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/waypost/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Configured provider entries, in file order.
    pub fn providers(&self) -> Result<Vec<ProviderEntry>> {
        self.providers
            .iter()
            .map(|table| -> Result<ProviderEntry> {
                let mut table = table.clone();
                let client = match table.remove("client") {
                    Some(toml::Value::String(name)) => Some(name),
                    Some(other) => {
                        return Err(WaypostError::Configuration(format!(
                            "provider client must be a string, got {other}"
                        )));
                    }
                    None => None,
                };
                let definition: ProviderDefinition = toml::Value::Table(table)
                    .try_into()
                    .map_err(|e: toml::de::Error| WaypostError::Configuration(e.to_string()))?;
                Ok(ProviderEntry {
                    client: client.unwrap_or_else(|| definition.id.clone()),
                    definition,
                })
            })
            .collect()
    }

    pub fn router_config(&self) -> RouterConfig {
        let mut config = RouterConfig::new();
        if let Some(tiers) = &self.router.allowed_cost_tiers {
            config = config.allowed_cost_tiers(tiers.iter().copied());
        }
        if let Some(ms) = self.router.timeout_ms {
            config = config.dispatch_timeout(Duration::from_millis(ms));
        }
        if let Some(limit) = self.router.batch_concurrency {
            config = config.batch_concurrency(limit);
        }
        config
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.cache.ttl_secs))
            .max_entries(self.cache.max_entries)
    }

    pub fn retry_config(&self) -> Option<RetryConfig> {
        self.retry.as_ref().map(|r| {
            RetryConfig::new()
                .max_attempts(r.max_attempts)
                .initial_delay(Duration::from_millis(r.initial_delay_ms))
                .max_delay(Duration::from_millis(r.max_delay_ms))
        })
    }

    /// Turn the config into a router builder.
    ///
    /// Without `[[providers]]` entries the built-in catalog is registered;
    /// NewsAPI only when a key is available. Configured entries are mapped
    /// to built-in clients by name, pointed at `baseUrl` when it is set.
    pub fn into_builder(self, credentials: &Credentials) -> Result<WaypostBuilder> {
        let mut builder = Waypost::builder()
            .router_config(self.router_config())
            .response_cache(self.cache_config());
        if let Some(retry) = self.retry_config() {
            builder = builder.retry(retry);
        }

        let entries = self.providers()?;
        if entries.is_empty() {
            if let Some(key) = &credentials.newsapi_key {
                builder = builder.newsapi(key.clone());
            } else {
                debug!("NEWSAPI_KEY not set, skipping newsapi");
            }
            return Ok(builder
                .open_meteo()
                .weather_gov()
                .github(credentials.github_token.clone())
                .wikipedia()
                .semantic_scholar());
        }

        for entry in entries {
            let Some(handler) = client_for(&entry, credentials)? else {
                continue;
            };
            builder = builder.provider(entry.definition, handler);
        }
        Ok(builder)
    }
}

fn client_for(entry: &ProviderEntry, credentials: &Credentials) -> Result<Option<Arc<dyn ApiProvider>>> {
    let base_url = Some(entry.definition.base_url.as_str()).filter(|u| !u.is_empty());
    let handler: Arc<dyn ApiProvider> = match entry.client.as_str() {
        catalog::NEWSAPI => {
            let Some(key) = credentials.newsapi_key.clone() else {
                warn!(provider = %entry.definition.id, "NEWSAPI_KEY not set, skipping provider");
                return Ok(None);
            };
            match base_url {
                Some(url) => Arc::new(NewsApiClient::with_base_url(key, url)?),
                None => Arc::new(NewsApiClient::new(key)?),
            }
        }
        catalog::OPEN_METEO => match base_url {
            Some(url) => Arc::new(OpenMeteoClient::with_base_url(url)?),
            None => Arc::new(OpenMeteoClient::new()?),
        },
        catalog::WEATHER_GOV => match base_url {
            Some(url) => Arc::new(WeatherGovClient::with_base_url(url)?),
            None => Arc::new(WeatherGovClient::new()?),
        },
        catalog::GITHUB => {
            let token = credentials.github_token.clone();
            match base_url {
                Some(url) => Arc::new(GithubClient::with_base_url(token, url)?),
                None => Arc::new(GithubClient::new(token)?),
            }
        }
        catalog::WIKIPEDIA => match base_url {
            Some(url) => Arc::new(WikipediaClient::with_base_url(url)?),
            None => Arc::new(WikipediaClient::new()?),
        },
        catalog::SEMANTIC_SCHOLAR => match base_url {
            Some(url) => Arc::new(SemanticScholarClient::with_base_url(url)?),
            None => Arc::new(SemanticScholarClient::new()?),
        },
        other => {
            return Err(WaypostError::Configuration(format!(
                "unknown client '{other}' for provider '{}'",
                entry.definition.id
            )));
        }
    };
    Ok(Some(handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.providers().unwrap().is_empty());
        assert!(config.retry_config().is_none());
        assert_eq!(config.cache_config().ttl, Duration::from_secs(300));
        assert_eq!(config.router_config().allowed_cost_tiers, CostTier::ALL.to_vec());
    }

    #[test]
    fn parses_sections() {
        let config = Config::from_toml_str(
            r#"
            [router]
            allowed_cost_tiers = ["free"]
            timeout_ms = 2500
            batch_concurrency = 4

            [cache]
            ttl_secs = 60
            max_entries = 50

            [retry]
            max_attempts = 2
            "#,
        )
        .unwrap();

        let router = config.router_config();
        assert_eq!(router.allowed_cost_tiers, vec![CostTier::Free]);
        assert_eq!(router.dispatch_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(router.batch_concurrency, Some(4));

        let cache = config.cache_config();
        assert_eq!(cache.ttl, Duration::from_secs(60));
        assert_eq!(cache.max_entries, 50);

        let retry = config.retry_config().unwrap();
        assert_eq!(retry.max_attempts, 2);
        assert_eq!(retry.initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn parses_provider_entries_in_either_case() {
        let config = Config::from_toml_str(
            r#"
            [[providers]]
            id = "wiki-mirror"
            name = "Wiki mirror"
            category = "research"
            client = "wikipedia"
            baseUrl = "http://localhost:8080"
            capabilities = ["encyclopedia"]
            cost = "free"
            reliability = 0.9
            rateLimit = { requests = 5, windowMs = 1000 }

            [[providers]]
            id = "github"
            name = "GitHub"
            category = "development"
            capabilities = ["repositories"]
            cost = "freemium"
            reliability = 0.99
            rate_limit = { requests = 60, window_ms = 3600000 }
            "#,
        )
        .unwrap();

        let entries = config.providers().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].client, "wikipedia");
        assert_eq!(entries[0].definition.base_url, "http://localhost:8080");
        assert_eq!(entries[0].definition.rate_limit.requests, 5);
        assert_eq!(entries[1].client, "github");
        assert_eq!(entries[1].definition.rate_limit.window_ms, 3_600_000);
    }

    #[test]
    fn unknown_client_is_rejected() {
        let config = Config::from_toml_str(
            r#"
            [[providers]]
            id = "mystery"
            name = "Mystery"
            category = "news"
            cost = "free"
            reliability = 0.5
            "#,
        )
        .unwrap();
        let err = config.into_builder(&Credentials::default()).err().unwrap();
        assert!(matches!(err, WaypostError::Configuration(_)));
    }

    #[test]
    fn newsapi_entry_skipped_without_key() {
        let config = Config::from_toml_str(
            r#"
            [[providers]]
            id = "newsapi"
            name = "NewsAPI"
            category = "news"
            capabilities = ["news"]
            cost = "freemium"
            reliability = 0.95
            "#,
        )
        .unwrap();
        // The only entry is skipped, so building fails for lack of providers.
        let builder = config.into_builder(&Credentials::default()).unwrap();
        assert!(matches!(
            builder.build(),
            Err(WaypostError::Configuration(_))
        ));
    }

    #[test]
    fn default_config_builds_builtin_catalog() {
        let router = Config::default()
            .into_builder(&Credentials::default())
            .unwrap()
            .build()
            .unwrap();
        assert!(router.registry().contains(catalog::WIKIPEDIA));
        assert!(router.registry().contains(catalog::GITHUB));
        assert!(router.registry().contains(catalog::WEATHER_GOV));
        assert!(!router.registry().contains(catalog::NEWSAPI));
    }

    #[test]
    fn load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 7").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.cache.ttl_secs, 7);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/waypost.toml"))).unwrap_err();
        assert!(matches!(err, WaypostError::Configuration(_)));
    }
}
