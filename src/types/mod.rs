//! Public types for the Waypost API.

mod operation;
mod provider;
mod request;
mod response;

pub use operation::{
    Category, Coordinates, DevelopmentOp, ForecastQuery, HeadlinesQuery, IssueQuery, IssueState,
    NewsOp, NewsQuery, NewsSearch, Operation, PaperRef, PaperSearch, RepoRef, RepoSearch,
    ResearchOp, TrendingQuery, WeatherOp, WikipediaPage, WikipediaSearch,
};
pub use provider::{AuthType, CostTier, ProviderDefinition, RateLimit};
pub use request::{Priority, RoutedRequest};
pub use response::{CACHE_SOURCE, ROUTER_SOURCE, RouteFailure, RoutedResponse};
