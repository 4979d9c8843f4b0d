//! National Weather Service client for active alerts at a point.
//!
//! No API key, but the service requires a `User-Agent` (set by the shared
//! client). Coverage is limited to US territory; elsewhere the feed is empty.
//! See: <https://www.weather.gov/documentation/services-web-api>

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::{Value, json};

use super::http::{build_client, endpoint, send_json};
use super::traits::{ApiProvider, unsupported};
use crate::Result;
use crate::registry::catalog;
use crate::types::{Coordinates, Operation, WeatherOp};

const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// Client for the NWS alerts API.
#[derive(Clone)]
pub struct WeatherGovClient {
    http: Client,
    base_url: String,
}

impl WeatherGovClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            base_url: base_url.into(),
        })
    }

    /// Alerts currently in effect at `at`.
    pub async fn alerts(&self, at: Coordinates) -> Result<Value> {
        let url = endpoint(&self.base_url, &["alerts", "active"])?;
        // The API rejects points with more than four decimal places.
        let point = format!("{:.4},{:.4}", at.latitude, at.longitude);
        let request = self
            .http
            .get(url)
            .header(ACCEPT, "application/geo+json")
            .query(&[("point", point.as_str())]);
        let body = send_json(request, catalog::WEATHER_GOV).await?;
        let alerts: Vec<Value> = body["features"]
            .as_array()
            .map(|features| features.iter().map(summarize_alert).collect())
            .unwrap_or_default();
        Ok(json!({
            "latitude": at.latitude,
            "longitude": at.longitude,
            "count": alerts.len(),
            "alerts": alerts,
        }))
    }
}

fn summarize_alert(feature: &Value) -> Value {
    let p = &feature["properties"];
    json!({
        "id": p["id"],
        "event": p["event"],
        "headline": p["headline"],
        "severity": p["severity"],
        "urgency": p["urgency"],
        "area": p["areaDesc"],
        "effective": p["effective"],
        "expires": p["expires"],
        "description": p["description"],
        "instruction": p["instruction"],
        "sender": p["senderName"],
    })
}

#[async_trait]
impl ApiProvider for WeatherGovClient {
    fn name(&self) -> &str {
        catalog::WEATHER_GOV
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::Weather(WeatherOp::Alerts(at)) => self.alerts(*at).await,
            other => Err(unsupported(other)),
        }
    }
}
