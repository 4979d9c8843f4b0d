//! Semantic Scholar client tests against a wiremock upstream.

#![cfg(feature = "integrations")]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waypost::providers::{SemanticScholarClient, WikipediaClient};
use waypost::registry::catalog;
use waypost::{PaperRef, RoutedRequest, Waypost};

fn paper(id: &str, title: &str) -> serde_json::Value {
    json!({
        "paperId": id,
        "title": title,
        "year": 2017,
        "authors": [{ "authorId": "1", "name": "A. Author" }, { "authorId": "2", "name": "B. Author" }],
        "url": format!("https://www.semanticscholar.org/paper/{id}"),
        "citationCount": 100
    })
}

#[tokio::test]
async fn search_papers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .and(query_param("query", "attention"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 5000,
            "data": [paper("p1", "Attention Is All You Need"), paper("p2", "Other")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SemanticScholarClient::with_base_url(server.uri()).unwrap();
    let result = client.search_papers("attention", 2).await.unwrap();

    assert_eq!(result["total"], 5000);
    let first = &result["papers"][0];
    assert_eq!(first["paper_id"], "p1");
    assert_eq!(first["authors"], json!(["A. Author", "B. Author"]));
    assert_eq!(first["citations"], 100);
}

#[tokio::test]
async fn citations_unwrap_citing_papers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/p1/citations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "citingPaper": paper("c1", "Follow-up") }]
        })))
        .mount(&server)
        .await;

    let client = SemanticScholarClient::with_base_url(server.uri()).unwrap();
    let result = client
        .citations(&PaperRef {
            paper_id: "p1".into(),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(result["paper_id"], "p1");
    assert_eq!(result["papers"][0]["title"], "Follow-up");
}

#[tokio::test]
async fn related_routes_to_references() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/p1/references"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "citedPaper": paper("r1", "Prior work") }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = Waypost::builder()
        .provider(
            catalog::semantic_scholar(),
            Arc::new(SemanticScholarClient::with_base_url(server.uri()).unwrap()),
        )
        .build()
        .unwrap();

    let resp = router
        .route(&RoutedRequest::new("research", "get_related").param("paper_id", "p1"))
        .await;
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.source, catalog::SEMANTIC_SCHOLAR);
    assert_eq!(resp.data.unwrap()["papers"][0]["paper_id"], "r1");
}

#[tokio::test]
async fn research_category_splits_across_providers() {
    let wiki = MockServer::start().await;
    let scholar = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Entropy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Entropy" })))
        .mount(&wiki)
        .await;
    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0, "data": [] })))
        .mount(&scholar)
        .await;

    let router = Waypost::builder()
        .provider(
            catalog::wikipedia(),
            Arc::new(WikipediaClient::with_base_url(wiki.uri()).unwrap()),
        )
        .provider(
            catalog::semantic_scholar(),
            Arc::new(SemanticScholarClient::with_base_url(scholar.uri()).unwrap()),
        )
        .build()
        .unwrap();

    let responses = router
        .batch_route(&[
            RoutedRequest::new("knowledge", "get_wikipedia").param("title", "Entropy"),
            RoutedRequest::new("research", "search_papers").param("query", "entropy"),
        ])
        .await;

    assert_eq!(responses[0].source, catalog::WIKIPEDIA);
    assert_eq!(responses[1].source, catalog::SEMANTIC_SCHOLAR);
}
