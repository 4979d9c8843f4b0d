//! GitHub REST API client: repository search, lookup, issues, trending.
//!
//! Works unauthenticated (60 requests/hour); a token raises the quota.
//! See: <https://docs.github.com/en/rest>

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{Value, json};

use super::http::{build_client, endpoint, send_json};
use super::traits::{ApiProvider, unsupported};
use crate::Result;
use crate::registry::catalog;
use crate::types::{DevelopmentOp, IssueQuery, Operation, RepoRef, RepoSearch, TrendingQuery};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_PER_PAGE: u32 = 10;
/// Star floor for the trending query.
const TRENDING_MIN_STARS: u32 = 1000;

/// Client for the GitHub REST API.
#[derive(Clone)]
pub struct GithubClient {
    token: Option<String>,
    http: Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(token: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            token,
            http: build_client()?,
            base_url: base_url.into(),
        })
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn search_repos(&self, search: &RepoSearch) -> Result<Value> {
        let per_page = search.per_page.unwrap_or(DEFAULT_PER_PAGE);
        self.repo_search(&search.query, search.sort.as_deref(), per_page)
            .await
    }

    pub async fn get_repo(&self, repo: &RepoRef) -> Result<Value> {
        let url = endpoint(&self.base_url, &["repos", &repo.owner, &repo.repo])?;
        let body = send_json(self.get(url), catalog::GITHUB).await?;
        Ok(summarize_repo(&body))
    }

    pub async fn get_issues(&self, query: &IssueQuery) -> Result<Value> {
        let url = endpoint(
            &self.base_url,
            &["repos", &query.owner, &query.repo, "issues"],
        )?;
        let request = self.get(url).query(&[("state", query.state.as_str())]);
        let body = send_json(request, catalog::GITHUB).await?;

        let issues: Vec<Value> = body
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|issue| {
                        json!({
                            "number": issue["number"],
                            "title": issue["title"],
                            "state": issue["state"],
                            "user": issue["user"]["login"],
                            "url": issue["html_url"],
                            "is_pull_request": issue.get("pull_request").is_some(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({ "issues": issues }))
    }

    /// Most-starred repositories above a star floor, optionally by language.
    pub async fn trending(&self, query: &TrendingQuery) -> Result<Value> {
        let mut q = format!("stars:>{TRENDING_MIN_STARS}");
        if let Some(language) = &query.language {
            q.push_str(&format!(" language:{language}"));
        }
        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
        self.repo_search(&q, Some("stars"), per_page).await
    }

    async fn repo_search(&self, q: &str, sort: Option<&str>, per_page: u32) -> Result<Value> {
        let url = endpoint(&self.base_url, &["search", "repositories"])?;
        let per_page = per_page.to_string();
        let mut params = vec![("q", q), ("per_page", per_page.as_str())];
        if let Some(sort) = sort {
            params.push(("sort", sort));
            params.push(("order", "desc"));
        }
        let body = send_json(self.get(url).query(&params), catalog::GITHUB).await?;

        let items: Vec<Value> = body["items"]
            .as_array()
            .map(|items| items.iter().map(summarize_repo).collect())
            .unwrap_or_default();
        Ok(json!({ "total": body["total_count"], "items": items }))
    }
}

fn summarize_repo(repo: &Value) -> Value {
    json!({
        "full_name": repo["full_name"],
        "description": repo["description"],
        "language": repo["language"],
        "stars": repo["stargazers_count"],
        "forks": repo["forks_count"],
        "open_issues": repo["open_issues_count"],
        "url": repo["html_url"],
    })
}

#[async_trait]
impl ApiProvider for GithubClient {
    fn name(&self) -> &str {
        catalog::GITHUB
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        match operation {
            Operation::Development(op) => match op {
                DevelopmentOp::SearchRepos(search) => self.search_repos(search).await,
                DevelopmentOp::GetRepo(repo) => self.get_repo(repo).await,
                DevelopmentOp::GetIssues(query) => self.get_issues(query).await,
                DevelopmentOp::Trending(query) => self.trending(query).await,
            },
            other => Err(unsupported(other)),
        }
    }
}
