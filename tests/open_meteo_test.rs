//! Open-Meteo client tests against a wiremock upstream.

#![cfg(feature = "integrations")]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waypost::providers::{OpenMeteoClient, WeatherGovClient};
use waypost::registry::catalog;
use waypost::{Coordinates, ErrorKind, ForecastQuery, RoutedRequest, Waypost};

#[tokio::test]
async fn current_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "generationtime_ms": 0.1,
            "current_units": { "temperature_2m": "°C" },
            "current": { "time": "2025-01-01T12:00", "temperature_2m": 3.4 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenMeteoClient::with_base_url(server.uri()).unwrap();
    let result = client
        .current(Coordinates {
            latitude: 52.52,
            longitude: 13.41,
        })
        .await
        .unwrap();

    assert_eq!(result["current"]["temperature_2m"], 3.4);
    assert_eq!(result["units"]["temperature_2m"], "°C");
    assert!(result.get("generationtime_ms").is_none());
}

#[tokio::test]
async fn forecast_passes_days_and_timezone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "3"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 48.85,
            "longitude": 2.35,
            "daily_units": { "temperature_2m_max": "°C" },
            "daily": { "time": ["2025-01-01", "2025-01-02", "2025-01-03"] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenMeteoClient::with_base_url(server.uri()).unwrap();
    let result = client
        .forecast(&ForecastQuery {
            latitude: 48.85,
            longitude: 2.35,
            days: 3,
        })
        .await
        .unwrap();
    assert_eq!(result["daily"]["time"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn alerts_route_past_open_meteo() {
    let meteo = MockServer::start().await;
    let nws = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&meteo)
        .await;
    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .and(query_param("point", "52.5200,13.4100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": []
        })))
        .expect(1)
        .mount(&nws)
        .await;

    let router = Waypost::builder()
        .provider(
            catalog::open_meteo(),
            Arc::new(OpenMeteoClient::with_base_url(meteo.uri()).unwrap()),
        )
        .provider(
            catalog::weather_gov(),
            Arc::new(WeatherGovClient::with_base_url(nws.uri()).unwrap()),
        )
        .build()
        .unwrap();

    let resp = router
        .route(
            &RoutedRequest::new("weather", "alerts")
                .param("latitude", 52.52)
                .param("longitude", 13.41),
        )
        .await;
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.source, catalog::WEATHER_GOV);
    assert_eq!(resp.data.unwrap()["count"], 0);
}

#[tokio::test]
async fn out_of_range_days_never_reach_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let router = Waypost::builder()
        .provider(
            catalog::open_meteo(),
            Arc::new(OpenMeteoClient::with_base_url(server.uri()).unwrap()),
        )
        .build()
        .unwrap();

    let resp = router
        .route(
            &RoutedRequest::new("weather", "forecast")
                .param("latitude", 52.52)
                .param("longitude", 13.41)
                .param("days", 30),
        )
        .await;
    assert!(!resp.success);
    assert_eq!(resp.error_kind(), Some(ErrorKind::Unsupported));
}
