//! Provider descriptors

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, WaypostError};

/// Pricing model of an upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Free,
    Paid,
    Freemium,
}

impl CostTier {
    /// Every tier, in declaration order.
    pub const ALL: [CostTier; 3] = [CostTier::Free, CostTier::Paid, CostTier::Freemium];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::Free => "free",
            CostTier::Paid => "paid",
            CostTier::Freemium => "freemium",
        }
    }
}

/// How a provider authenticates requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    ApiKey,
    Bearer,
    Oauth,
}

/// Fixed-window request quota: at most `requests` calls per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests: u32,
    #[serde(rename = "windowMs", alias = "window_ms")]
    pub window_ms: u64,
}

impl RateLimit {
    pub fn new(requests: u32, window: Duration) -> Self {
        Self {
            requests,
            window_ms: window.as_millis() as u64,
        }
    }

    /// Length of one window.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new(60, Duration::from_secs(60))
    }
}

/// Static descriptor of a registered provider.
///
/// Immutable once registered. Field names follow the registration format
/// (`baseUrl`, `rateLimit`, ...); snake_case aliases are accepted as well.
///
/// ```rust
/// # use waypost::{CostTier, ProviderDefinition, RateLimit};
/// # use std::time::Duration;
/// let wiki = ProviderDefinition::new("wiki", "Wikipedia", "research")
///     .capabilities(["encyclopedia"])
///     .cost(CostTier::Free)
///     .reliability(0.97)
///     .rate_limit(RateLimit::new(100, Duration::from_secs(60)));
/// assert!(wiki.has_capability("encyclopedia"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, alias = "base_url")]
    pub base_url: String,
    #[serde(default, alias = "requires_auth")]
    pub requires_auth: bool,
    #[serde(default, alias = "auth_type")]
    pub auth_type: AuthType,
    #[serde(default, alias = "rate_limit")]
    pub rate_limit: RateLimit,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub cost: CostTier,
    pub reliability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, alias = "health_endpoint", skip_serializing_if = "Option::is_none")]
    pub health_endpoint: Option<String>,
}

impl ProviderDefinition {
    /// Create a free, fully reliable descriptor with no capabilities.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            base_url: String::new(),
            requires_auth: false,
            auth_type: AuthType::None,
            rate_limit: RateLimit::default(),
            capabilities: Vec::new(),
            cost: CostTier::Free,
            reliability: 1.0,
            documentation: None,
            health_endpoint: None,
        }
    }

    pub fn capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn cost(mut self, cost: CostTier) -> Self {
        self.cost = cost;
        self
    }

    /// Set the reliability score, clamped to `[0, 1]`.
    pub fn reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability.clamp(0.0, 1.0);
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn auth(mut self, auth_type: AuthType) -> Self {
        self.requires_auth = auth_type != AuthType::None;
        self.auth_type = auth_type;
        self
    }

    pub fn documentation(mut self, url: impl Into<String>) -> Self {
        self.documentation = Some(url.into());
        self
    }

    pub fn health_endpoint(mut self, path: impl Into<String>) -> Self {
        self.health_endpoint = Some(path.into());
        self
    }

    /// Whether this provider advertises `capability`.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Whether this provider advertises at least one of `capabilities`.
    pub fn has_any_capability<S: AsRef<str>>(&self, capabilities: &[S]) -> bool {
        capabilities.iter().any(|c| self.has_capability(c.as_ref()))
    }

    /// Check a descriptor loaded from configuration.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(WaypostError::Configuration(
                "provider id must not be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reliability) {
            return Err(WaypostError::Configuration(format!(
                "provider {}: reliability {} outside [0, 1]",
                self.id, self.reliability
            )));
        }
        if self.rate_limit.requests == 0 || self.rate_limit.window_ms == 0 {
            return Err(WaypostError::Configuration(format!(
                "provider {}: rate limit must allow at least one request per non-empty window",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reliability_is_clamped() {
        let def = ProviderDefinition::new("a", "A", "news").reliability(1.7);
        assert_eq!(def.reliability, 1.0);
        let def = ProviderDefinition::new("a", "A", "news").reliability(-0.2);
        assert_eq!(def.reliability, 0.0);
    }

    #[test]
    fn deserializes_registration_format() {
        let json = serde_json::json!({
            "id": "wiki",
            "name": "Wikipedia",
            "category": "research",
            "baseUrl": "https://en.wikipedia.org",
            "requiresAuth": false,
            "authType": "none",
            "rateLimit": { "requests": 100, "windowMs": 60000 },
            "capabilities": ["encyclopedia"],
            "cost": "free",
            "reliability": 0.97,
            "documentation": "https://www.mediawiki.org/wiki/API"
        });
        let def: ProviderDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.rate_limit.window(), Duration::from_secs(60));
        assert_eq!(def.cost, CostTier::Free);
        assert!(def.has_capability("encyclopedia"));
        assert!(def.validate().is_ok());
    }

    #[test]
    fn accepts_snake_case_aliases() {
        let json = serde_json::json!({
            "id": "gh",
            "name": "GitHub",
            "category": "development",
            "base_url": "https://api.github.com",
            "rate_limit": { "requests": 10, "window_ms": 1000 },
            "cost": "freemium",
            "reliability": 0.9
        });
        let def: ProviderDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.base_url, "https://api.github.com");
        assert_eq!(def.rate_limit.requests, 10);
    }

    #[test]
    fn validate_rejects_zero_quota() {
        let def = ProviderDefinition::new("a", "A", "news")
            .rate_limit(RateLimit::new(0, Duration::from_secs(1)));
        assert!(matches!(
            def.validate(),
            Err(WaypostError::Configuration(_))
        ));
    }

    #[test]
    fn auth_sets_requires_auth() {
        let def = ProviderDefinition::new("a", "A", "news").auth(AuthType::ApiKey);
        assert!(def.requires_auth);
    }
}
