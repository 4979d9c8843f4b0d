//! NewsAPI client for headlines and article search.
//!
//! See: <https://newsapi.org/docs/endpoints>

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::http::{build_client, endpoint, send_json};
use super::traits::{ApiProvider, unsupported};
use crate::Result;
use crate::registry::catalog;
use crate::types::{HeadlinesQuery, NewsOp, NewsQuery, NewsSearch, Operation};

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_COUNTRY: &str = "us";

/// Client for NewsAPI (`X-Api-Key` authentication).
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            http: build_client()?,
            base_url: base_url.into(),
        })
    }

    /// Free-text query when given, otherwise headlines for the filters.
    pub async fn get_news(&self, query: &NewsQuery) -> Result<Value> {
        match &query.query {
            Some(q) => {
                self.everything(&[("q", q.clone())], query.page_size)
                    .await
            }
            None => {
                self.get_headlines(&HeadlinesQuery {
                    country: query.country.clone(),
                    category: query.category.clone(),
                    page_size: query.page_size,
                })
                .await
            }
        }
    }

    pub async fn get_headlines(&self, query: &HeadlinesQuery) -> Result<Value> {
        let mut params = vec![(
            "country",
            query
                .country
                .clone()
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        )];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        self.fetch(&["v2", "top-headlines"], params, query.page_size)
            .await
    }

    pub async fn search(&self, search: &NewsSearch) -> Result<Value> {
        let mut params = vec![("q", search.query.clone())];
        if let Some(language) = &search.language {
            params.push(("language", language.clone()));
        }
        if let Some(sort_by) = &search.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        self.everything(&params, search.page_size).await
    }

    async fn everything(&self, params: &[(&str, String)], page_size: Option<u32>) -> Result<Value> {
        self.fetch(&["v2", "everything"], params.to_vec(), page_size)
            .await
    }

    async fn fetch(
        &self,
        path: &[&str],
        mut params: Vec<(&str, String)>,
        page_size: Option<u32>,
    ) -> Result<Value> {
        if let Some(size) = page_size {
            params.push(("pageSize", size.to_string()));
        }
        let url = endpoint(&self.base_url, path)?;
        let request = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .query(&params);
        let body = send_json(request, catalog::NEWSAPI).await?;

        let articles: Vec<Value> = body["articles"]
            .as_array()
            .map(|articles| {
                articles
                    .iter()
                    .map(|a| {
                        json!({
                            "title": a["title"],
                            "description": a["description"],
                            "source": a["source"]["name"],
                            "url": a["url"],
                            "published_at": a["publishedAt"],
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({ "total": body["totalResults"], "articles": articles }))
    }
}

#[async_trait]
impl ApiProvider for NewsApiClient {
    fn name(&self) -> &str {
        catalog::NEWSAPI
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::News(op) => match op {
                NewsOp::GetNews(query) => self.get_news(query).await,
                NewsOp::GetHeadlines(query) => self.get_headlines(query).await,
                NewsOp::Search(search) => self.search(search).await,
            },
            other => Err(unsupported(other)),
        }
    }
}
