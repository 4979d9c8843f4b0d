//! NewsAPI client tests against a wiremock upstream.

#![cfg(feature = "integrations")]

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waypost::providers::NewsApiClient;
use waypost::providers::traits::ApiProvider;
use waypost::{HeadlinesQuery, NewsQuery, Operation, RoutedRequest, WaypostError};

fn articles_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 1,
        "articles": [{
            "source": { "id": null, "name": "Example Times" },
            "author": "Reporter",
            "title": "Rust 2024 ships",
            "description": "The edition is out.",
            "url": "https://example.com/rust",
            "publishedAt": "2025-02-20T12:00:00Z"
        }]
    })
}

#[tokio::test]
async fn headlines_default_to_us_with_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(header("X-Api-Key", "news-key"))
        .and(query_param("country", "us"))
        .and(query_param("category", "technology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::with_base_url("news-key", server.uri()).unwrap();
    let result = client
        .get_headlines(&HeadlinesQuery {
            category: Some("technology".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(result["total"], 1);
    let article = &result["articles"][0];
    assert_eq!(article["source"], "Example Times");
    assert_eq!(article["published_at"], "2025-02-20T12:00:00Z");
    assert!(article.get("author").is_none());
}

#[tokio::test]
async fn get_news_with_query_searches_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "rust"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::with_base_url("news-key", server.uri()).unwrap();
    let result = client
        .get_news(&NewsQuery {
            query: Some("rust".into()),
            page_size: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(result["articles"][0]["title"], "Rust 2024 ships");
}

#[tokio::test]
async fn search_operation_passes_language_and_sort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "webassembly"))
        .and(query_param("language", "en"))
        .and(query_param("sortBy", "popularity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::with_base_url("news-key", server.uri()).unwrap();
    let op = Operation::from_request(
        &RoutedRequest::new("news", "search")
            .param("query", "webassembly")
            .param("language", "en")
            .param("sort_by", "popularity"),
    )
    .unwrap();
    assert!(client.call(&op).await.is_ok());
}

#[tokio::test]
async fn rejected_key_is_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid"
        })))
        .mount(&server)
        .await;

    let client = NewsApiClient::with_base_url("bad-key", server.uri()).unwrap();
    let err = client
        .get_headlines(&HeadlinesQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WaypostError::AuthenticationFailed(ref p) if p == "newsapi"));
    assert!(!err.is_transient());
}
