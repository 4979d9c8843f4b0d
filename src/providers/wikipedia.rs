//! Wikipedia client: page summaries and full-text search.
//!
//! See: <https://www.mediawiki.org/wiki/API:REST_API>

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::http::{build_client, endpoint, send_json};
use super::traits::{ApiProvider, unsupported};
use crate::Result;
use crate::registry::catalog;
use crate::types::{Operation, ResearchOp};

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Client for the Wikipedia REST and Action APIs.
#[derive(Clone)]
pub struct WikipediaClient {
    http: Client,
    base_url: String,
}

impl WikipediaClient {
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

    /// Summary of the page titled `title`.
    pub async fn page_summary(&self, title: &str) -> Result<Value> {
        let title = title.trim().replace(' ', "_");
        let url = endpoint(&self.base_url, &["api", "rest_v1", "page", "summary", &title])?;
        let body = send_json(self.http.get(url), catalog::WIKIPEDIA).await?;

        Ok(json!({
            "title": body["title"],
            "description": body["description"],
            "extract": body["extract"],
            "url": body["content_urls"]["desktop"]["page"],
            "thumbnail": body["thumbnail"]["source"],
        }))
    }

    /// Full-text search over article titles and bodies.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Value> {
        let url = endpoint(&self.base_url, &["w", "api.php"])?;
        let limit = limit.to_string();
        let request = self.http.get(url).query(&[
            ("action", "query"),
            ("list", "search"),
            ("format", "json"),
            ("srsearch", query),
            ("srlimit", limit.as_str()),
        ]);
        let body = send_json(request, catalog::WIKIPEDIA).await?;

        let results: Vec<Value> = body["query"]["search"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .map(|hit| {
                        json!({
                            "title": hit["title"],
                            "pageid": hit["pageid"],
                            "snippet": hit["snippet"],
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({ "query": query, "results": results }))
    }
}

#[async_trait]
impl ApiProvider for WikipediaClient {
    fn name(&self) -> &str {
        catalog::WIKIPEDIA
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::Research(ResearchOp::GetWikipedia(page)) => {
                self.page_summary(&page.title).await
            }
            Operation::Research(ResearchOp::SearchWikipedia(search)) => {
                self.search(&search.query, search.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
                    .await
            }
            other => Err(unsupported(other)),
        }
    }
}
