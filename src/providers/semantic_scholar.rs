//! Semantic Scholar Graph API client: paper search, citations, references.
//!
//! `get_related` is answered with the paper's references.
//! See: <https://api.semanticscholar.org/api-docs/graph>

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::http::{build_client, endpoint, send_json};
use super::traits::{ApiProvider, unsupported};
use crate::Result;
use crate::registry::catalog;
use crate::types::{Operation, PaperRef, ResearchOp};

const DEFAULT_BASE_URL: &str = "https://api.semanticscholar.org";
const DEFAULT_LIMIT: u32 = 10;
const PAPER_FIELDS: &str = "title,year,authors,url,citationCount";

/// Client for the Semantic Scholar Graph API.
#[derive(Clone)]
pub struct SemanticScholarClient {
    http: Client,
    base_url: String,
}

impl SemanticScholarClient {
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

    pub async fn search_papers(&self, query: &str, limit: u32) -> Result<Value> {
        let url = endpoint(&self.base_url, &["graph", "v1", "paper", "search"])?;
        let limit = limit.to_string();
        let request = self.http.get(url).query(&[
            ("query", query),
            ("limit", limit.as_str()),
            ("fields", PAPER_FIELDS),
        ]);
        let body = send_json(request, catalog::SEMANTIC_SCHOLAR).await?;
        let papers: Vec<Value> = body["data"]
            .as_array()
            .map(|data| data.iter().map(summarize_paper).collect())
            .unwrap_or_default();
        Ok(json!({ "total": body["total"], "papers": papers }))
    }

    pub async fn citations(&self, paper: &PaperRef) -> Result<Value> {
        self.edges(paper, "citations", "citingPaper").await
    }

    pub async fn references(&self, paper: &PaperRef) -> Result<Value> {
        self.edges(paper, "references", "citedPaper").await
    }

    async fn edges(&self, paper: &PaperRef, edge: &str, key: &str) -> Result<Value> {
        let url = endpoint(
            &self.base_url,
            &["graph", "v1", "paper", &paper.paper_id, edge],
        )?;
        let limit = paper.limit.unwrap_or(DEFAULT_LIMIT).to_string();
        let request = self
            .http
            .get(url)
            .query(&[("fields", PAPER_FIELDS), ("limit", limit.as_str())]);
        let body = send_json(request, catalog::SEMANTIC_SCHOLAR).await?;
        let papers: Vec<Value> = body["data"]
            .as_array()
            .map(|data| data.iter().map(|edge| summarize_paper(&edge[key])).collect())
            .unwrap_or_default();
        Ok(json!({ "paper_id": paper.paper_id, "papers": papers }))
    }
}

fn summarize_paper(paper: &Value) -> Value {
    let authors: Vec<Value> = paper["authors"]
        .as_array()
        .map(|authors| authors.iter().map(|a| a["name"].clone()).collect())
        .unwrap_or_default();
    json!({
        "paper_id": paper["paperId"],
        "title": paper["title"],
        "year": paper["year"],
        "authors": authors,
        "citations": paper["citationCount"],
        "url": paper["url"],
    })
}

#[async_trait]
impl ApiProvider for SemanticScholarClient {
    fn name(&self) -> &str {
        catalog::SEMANTIC_SCHOLAR
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::Research(ResearchOp::SearchPapers(search)) => {
                self.search_papers(&search.query, search.limit.unwrap_or(DEFAULT_LIMIT))
                    .await
            }
            Operation::Research(ResearchOp::GetCitations(paper)) => self.citations(paper).await,
            Operation::Research(ResearchOp::GetRelated(paper)) => self.references(paper).await,
            other => Err(unsupported(other)),
        }
    }
}
