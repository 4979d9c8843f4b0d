//! Descriptors for the built-in integrations.
//!
//! These match the clients in [`crate::providers`]; register them together
//! (the builder does this for you) or use them as a template for custom
//! providers.

use std::time::Duration;

use crate::types::{AuthType, CostTier, ProviderDefinition, RateLimit};

pub const NEWSAPI: &str = "newsapi";
pub const OPEN_METEO: &str = "open-meteo";
pub const GITHUB: &str = "github";
pub const WIKIPEDIA: &str = "wikipedia";
pub const SEMANTIC_SCHOLAR: &str = "semantic-scholar";
pub const WEATHER_GOV: &str = "weather-gov";

pub fn newsapi() -> ProviderDefinition {
    ProviderDefinition::new(NEWSAPI, "NewsAPI", "news")
        .base_url("https://newsapi.org")
        .auth(AuthType::ApiKey)
        .capabilities(["news", "headlines", "news_search"])
        .cost(CostTier::Freemium)
        .reliability(0.92)
        .rate_limit(RateLimit::new(100, Duration::from_secs(24 * 3600)))
        .documentation("https://newsapi.org/docs")
}

pub fn open_meteo() -> ProviderDefinition {
    ProviderDefinition::new(OPEN_METEO, "Open-Meteo", "weather")
        .base_url("https://api.open-meteo.com")
        .capabilities(["weather", "current_weather", "forecast"])
        .cost(CostTier::Free)
        .reliability(0.95)
        .rate_limit(RateLimit::new(600, Duration::from_secs(60)))
        .documentation("https://open-meteo.com/en/docs")
}

pub fn weather_gov() -> ProviderDefinition {
    ProviderDefinition::new(WEATHER_GOV, "National Weather Service", "weather")
        .base_url("https://api.weather.gov")
        .capabilities(["weather_alerts"])
        .cost(CostTier::Free)
        .reliability(0.93)
        .rate_limit(RateLimit::new(60, Duration::from_secs(60)))
        .documentation("https://www.weather.gov/documentation/services-web-api")
}

pub fn github() -> ProviderDefinition {
    ProviderDefinition::new(GITHUB, "GitHub REST API", "development")
        .base_url("https://api.github.com")
        .auth(AuthType::Bearer)
        .capabilities(["repositories", "code_search", "issues", "trending"])
        .cost(CostTier::Freemium)
        .reliability(0.98)
        .rate_limit(RateLimit::new(60, Duration::from_secs(3600)))
        .documentation("https://docs.github.com/en/rest")
        .health_endpoint("/rate_limit")
}

pub fn wikipedia() -> ProviderDefinition {
    ProviderDefinition::new(WIKIPEDIA, "Wikipedia", "research")
        .base_url("https://en.wikipedia.org")
        .capabilities(["encyclopedia"])
        .cost(CostTier::Free)
        .reliability(0.97)
        .rate_limit(RateLimit::new(100, Duration::from_secs(60)))
        .documentation("https://www.mediawiki.org/wiki/API:REST_API")
}

pub fn semantic_scholar() -> ProviderDefinition {
    ProviderDefinition::new(SEMANTIC_SCHOLAR, "Semantic Scholar", "research")
        .base_url("https://api.semanticscholar.org")
        .capabilities(["papers", "academic_search", "citations", "related_papers"])
        .cost(CostTier::Free)
        .reliability(0.9)
        .rate_limit(RateLimit::new(100, Duration::from_secs(300)))
        .documentation("https://api.semanticscholar.org/api-docs/graph")
}

/// All built-in descriptors, in default registration order.
pub fn defaults() -> Vec<ProviderDefinition> {
    vec![
        newsapi(),
        open_meteo(),
        weather_gov(),
        github(),
        wikipedia(),
        semantic_scholar(),
    ]
}
