//! Open-Meteo client for current conditions and daily forecasts.
//!
//! No API key. Alerts are served by
//! [`WeatherGovClient`](super::WeatherGovClient) instead.
//! See: <https://open-meteo.com/en/docs>

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::http::{build_client, endpoint, send_json};
use super::traits::{ApiProvider, unsupported};
use crate::Result;
use crate::registry::catalog;
use crate::types::{Coordinates, ForecastQuery, Operation, WeatherOp};

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,wind_speed_10m,weather_code";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code";

/// Client for the Open-Meteo forecast API.
#[derive(Clone)]
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
}

impl OpenMeteoClient {
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

    pub async fn current(&self, at: Coordinates) -> Result<Value> {
        let body = self
            .forecast_endpoint(at, &[("current", CURRENT_FIELDS.to_string())])
            .await?;
        Ok(json!({
            "latitude": body["latitude"],
            "longitude": body["longitude"],
            "units": body["current_units"],
            "current": body["current"],
        }))
    }

    pub async fn forecast(&self, query: &ForecastQuery) -> Result<Value> {
        let body = self
            .forecast_endpoint(
                query.coordinates(),
                &[
                    ("daily", DAILY_FIELDS.to_string()),
                    ("forecast_days", query.days.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;
        Ok(json!({
            "latitude": body["latitude"],
            "longitude": body["longitude"],
            "units": body["daily_units"],
            "daily": body["daily"],
        }))
    }

    async fn forecast_endpoint(&self, at: Coordinates, extra: &[(&str, String)]) -> Result<Value> {
        let url = endpoint(&self.base_url, &["v1", "forecast"])?;
        let mut params = vec![
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
        ];
        params.extend_from_slice(extra);
        send_json(self.http.get(url).query(&params), catalog::OPEN_METEO).await
    }
}

#[async_trait]
impl ApiProvider for OpenMeteoClient {
    fn name(&self) -> &str {
        catalog::OPEN_METEO
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::Weather(WeatherOp::Current(at)) => self.current(*at).await,
            Operation::Weather(WeatherOp::Forecast(query)) => self.forecast(query).await,
            other => Err(unsupported(other)),
        }
    }
}
