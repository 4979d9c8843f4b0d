//! Typed operations, one variant per category/action pair.
//!
//! A [`RoutedRequest`] carries a category, an action and an untyped
//! parameter map. [`Operation::from_request`] validates all three up front
//! so providers only ever see well-formed input:
//!
//! - unknown category or action → [`WaypostError::Unsupported`]
//! - missing or ill-typed parameters → [`WaypostError::InvalidInput`]
//!
//! Each operation also names the capability tags a provider must advertise
//! (any one of them) to be eligible for it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RoutedRequest;
use crate::{Result, WaypostError};

/// Request category. Some categories answer to more than one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    News,
    Weather,
    Development,
    Research,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::News,
        Category::Weather,
        Category::Development,
        Category::Research,
    ];

    /// Resolve a category name or alias.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.names().contains(&name))
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        self.names()[0]
    }

    /// Canonical name followed by aliases.
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Category::News => &["news"],
            Category::Weather => &["weather"],
            Category::Development => &["development", "github"],
            Category::Research => &["research", "knowledge"],
        }
    }
}

// ============================================================================
// Parameter shapes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlinesQuery {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSearch {
    pub query: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_forecast_days")]
    pub days: u8,
}

fn default_forecast_days() -> u8 {
    7
}

impl ForecastQuery {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSearch {
    pub query: String,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueQuery {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub state: IssueState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSearch {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikipediaPage {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikipediaSearch {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRef {
    pub paper_id: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NewsOp {
    GetNews(NewsQuery),
    GetHeadlines(HeadlinesQuery),
    Search(NewsSearch),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOp {
    Current(Coordinates),
    Forecast(ForecastQuery),
    Alerts(Coordinates),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DevelopmentOp {
    SearchRepos(RepoSearch),
    GetRepo(RepoRef),
    GetIssues(IssueQuery),
    Trending(TrendingQuery),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResearchOp {
    SearchPapers(PaperSearch),
    GetWikipedia(WikipediaPage),
    SearchWikipedia(WikipediaSearch),
    GetCitations(PaperRef),
    GetRelated(PaperRef),
}

/// A validated request, tagged by category and action.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    News(NewsOp),
    Weather(WeatherOp),
    Development(DevelopmentOp),
    Research(ResearchOp),
}

impl Operation {
    /// Validate a request into a typed operation.
    pub fn from_request(request: &RoutedRequest) -> Result<Self> {
        let category = Category::parse(&request.category)
            .ok_or_else(|| WaypostError::unsupported(&request.category, &request.action))?;
        let unsupported = || WaypostError::unsupported(&request.category, &request.action);

        let op = match category {
            Category::News => Operation::News(match request.action.as_str() {
                "get_news" => NewsOp::GetNews(params(request)?),
                "get_headlines" => NewsOp::GetHeadlines(params(request)?),
                "search" => {
                    let p: NewsSearch = params(request)?;
                    non_empty(request, "query", &p.query)?;
                    NewsOp::Search(p)
                }
                _ => return Err(unsupported()),
            }),
            Category::Weather => Operation::Weather(match request.action.as_str() {
                "current" => WeatherOp::Current(coordinates(request)?),
                "alerts" => WeatherOp::Alerts(coordinates(request)?),
                "forecast" => {
                    let p: ForecastQuery = params(request)?;
                    check_coordinates(request, p.coordinates())?;
                    if !(1..=16).contains(&p.days) {
                        return Err(invalid(request, "days must be between 1 and 16"));
                    }
                    WeatherOp::Forecast(p)
                }
                _ => return Err(unsupported()),
            }),
            Category::Development => Operation::Development(match request.action.as_str() {
                "search_repos" => {
                    let p: RepoSearch = params(request)?;
                    non_empty(request, "query", &p.query)?;
                    DevelopmentOp::SearchRepos(p)
                }
                "get_repo" => {
                    let p: RepoRef = params(request)?;
                    non_empty(request, "owner", &p.owner)?;
                    non_empty(request, "repo", &p.repo)?;
                    DevelopmentOp::GetRepo(p)
                }
                "get_issues" => {
                    let p: IssueQuery = params(request)?;
                    non_empty(request, "owner", &p.owner)?;
                    non_empty(request, "repo", &p.repo)?;
                    DevelopmentOp::GetIssues(p)
                }
                "trending" => DevelopmentOp::Trending(params(request)?),
                _ => return Err(unsupported()),
            }),
            Category::Research => Operation::Research(match request.action.as_str() {
                "search_papers" => {
                    let p: PaperSearch = params(request)?;
                    non_empty(request, "query", &p.query)?;
                    ResearchOp::SearchPapers(p)
                }
                "get_wikipedia" => {
                    let p: WikipediaPage = params(request)?;
                    non_empty(request, "title", &p.title)?;
                    ResearchOp::GetWikipedia(p)
                }
                "search_wikipedia" => {
                    let p: WikipediaSearch = params(request)?;
                    non_empty(request, "query", &p.query)?;
                    ResearchOp::SearchWikipedia(p)
                }
                "get_citations" => {
                    let p: PaperRef = params(request)?;
                    non_empty(request, "paper_id", &p.paper_id)?;
                    ResearchOp::GetCitations(p)
                }
                "get_related" => {
                    let p: PaperRef = params(request)?;
                    non_empty(request, "paper_id", &p.paper_id)?;
                    ResearchOp::GetRelated(p)
                }
                _ => return Err(unsupported()),
            }),
        };
        Ok(op)
    }

    pub fn category(&self) -> Category {
        match self {
            Operation::News(_) => Category::News,
            Operation::Weather(_) => Category::Weather,
            Operation::Development(_) => Category::Development,
            Operation::Research(_) => Category::Research,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Operation::News(NewsOp::GetNews(_)) => "get_news",
            Operation::News(NewsOp::GetHeadlines(_)) => "get_headlines",
            Operation::News(NewsOp::Search(_)) => "search",
            Operation::Weather(WeatherOp::Current(_)) => "current",
            Operation::Weather(WeatherOp::Forecast(_)) => "forecast",
            Operation::Weather(WeatherOp::Alerts(_)) => "alerts",
            Operation::Development(DevelopmentOp::SearchRepos(_)) => "search_repos",
            Operation::Development(DevelopmentOp::GetRepo(_)) => "get_repo",
            Operation::Development(DevelopmentOp::GetIssues(_)) => "get_issues",
            Operation::Development(DevelopmentOp::Trending(_)) => "trending",
            Operation::Research(ResearchOp::SearchPapers(_)) => "search_papers",
            Operation::Research(ResearchOp::GetWikipedia(_)) => "get_wikipedia",
            Operation::Research(ResearchOp::SearchWikipedia(_)) => "search_wikipedia",
            Operation::Research(ResearchOp::GetCitations(_)) => "get_citations",
            Operation::Research(ResearchOp::GetRelated(_)) => "get_related",
        }
    }

    /// Capability tags that qualify a provider for this operation (any-of).
    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            Operation::News(NewsOp::GetNews(_)) => &["news"],
            Operation::News(NewsOp::GetHeadlines(_)) => &["headlines", "news"],
            Operation::News(NewsOp::Search(_)) => &["news_search", "news"],
            Operation::Weather(WeatherOp::Current(_)) => &["current_weather", "weather"],
            Operation::Weather(WeatherOp::Forecast(_)) => &["forecast"],
            Operation::Weather(WeatherOp::Alerts(_)) => &["weather_alerts"],
            Operation::Development(DevelopmentOp::SearchRepos(_)) => {
                &["repositories", "code_search"]
            }
            Operation::Development(DevelopmentOp::GetRepo(_)) => &["repositories"],
            Operation::Development(DevelopmentOp::GetIssues(_)) => &["issues"],
            Operation::Development(DevelopmentOp::Trending(_)) => &["trending"],
            Operation::Research(ResearchOp::SearchPapers(_)) => &["papers", "academic_search"],
            Operation::Research(ResearchOp::GetWikipedia(_))
            | Operation::Research(ResearchOp::SearchWikipedia(_)) => &["encyclopedia"],
            Operation::Research(ResearchOp::GetCitations(_)) => &["citations"],
            Operation::Research(ResearchOp::GetRelated(_)) => &["related_papers", "citations"],
        }
    }
}

fn params<T: DeserializeOwned>(request: &RoutedRequest) -> Result<T> {
    serde_json::from_value(Value::Object(request.parameters.clone()))
        .map_err(|e| invalid(request, &e.to_string()))
}

fn coordinates(request: &RoutedRequest) -> Result<Coordinates> {
    let c: Coordinates = params(request)?;
    check_coordinates(request, c)?;
    Ok(c)
}

fn check_coordinates(request: &RoutedRequest, c: Coordinates) -> Result<()> {
    if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) {
        return Err(invalid(request, "coordinates out of range"));
    }
    Ok(())
}

fn non_empty(request: &RoutedRequest, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(request, &format!("{field} must not be empty")));
    }
    Ok(())
}

fn invalid(request: &RoutedRequest, detail: &str) -> WaypostError {
    WaypostError::InvalidInput(format!("{}/{}: {detail}", request.category, request.action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_aliases_resolve() {
        assert_eq!(Category::parse("github"), Some(Category::Development));
        assert_eq!(Category::parse("knowledge"), Some(Category::Research));
        assert_eq!(Category::parse("sports"), None);
        assert_eq!(Category::Development.as_str(), "development");
    }

    #[test]
    fn parses_wikipedia_lookup() {
        let req = RoutedRequest::new("research", "get_wikipedia").param("title", "Entropy");
        let op = Operation::from_request(&req).unwrap();
        assert_eq!(
            op,
            Operation::Research(ResearchOp::GetWikipedia(WikipediaPage {
                title: "Entropy".into()
            }))
        );
        assert_eq!(op.capabilities(), &["encyclopedia"]);
        assert_eq!(op.action(), "get_wikipedia");
    }

    #[test]
    fn github_alias_parses_issues_with_default_state() {
        let req = RoutedRequest::new("github", "get_issues")
            .param("owner", "rust-lang")
            .param("repo", "rust");
        match Operation::from_request(&req).unwrap() {
            Operation::Development(DevelopmentOp::GetIssues(q)) => {
                assert_eq!(q.state, IssueState::Open);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_unsupported() {
        let req = RoutedRequest::new("sports", "scores");
        assert!(matches!(
            Operation::from_request(&req),
            Err(WaypostError::Unsupported { .. })
        ));
    }

    #[test]
    fn unknown_action_is_unsupported() {
        let req = RoutedRequest::new("weather", "tomorrow");
        let err = Operation::from_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "unsupported category/action: weather/tomorrow");
    }

    #[test]
    fn missing_parameter_is_invalid_input() {
        let req = RoutedRequest::new("research", "get_wikipedia");
        assert!(matches!(
            Operation::from_request(&req),
            Err(WaypostError::InvalidInput(_))
        ));
    }

    #[test]
    fn blank_parameter_is_invalid_input() {
        let req = RoutedRequest::new("news", "search").param("query", "  ");
        assert!(matches!(
            Operation::from_request(&req),
            Err(WaypostError::InvalidInput(_))
        ));
    }

    #[test]
    fn forecast_days_default_and_bounds() {
        let req = RoutedRequest::new("weather", "forecast")
            .param("latitude", 59.33)
            .param("longitude", 18.07);
        match Operation::from_request(&req).unwrap() {
            Operation::Weather(WeatherOp::Forecast(q)) => assert_eq!(q.days, 7),
            other => panic!("unexpected operation {other:?}"),
        }

        let req = req.param("days", 30);
        assert!(matches!(
            Operation::from_request(&req),
            Err(WaypostError::InvalidInput(_))
        ));
    }

    #[test]
    fn coordinates_out_of_range_rejected() {
        let req = RoutedRequest::new("weather", "current")
            .param("latitude", 123.0)
            .param("longitude", 0.0);
        assert!(matches!(
            Operation::from_request(&req),
            Err(WaypostError::InvalidInput(_))
        ));
    }
}
