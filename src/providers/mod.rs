//! Provider trait, retry decorator, and built-in upstream integrations.
//!
//! The integrations are plain `reqwest` clients, one per upstream. Each one
//! also exposes its endpoints as inherent methods for direct use.

pub mod retry;
pub mod traits;

#[cfg(feature = "integrations")]
mod http;
#[cfg(feature = "integrations")]
pub mod github;
#[cfg(feature = "integrations")]
pub mod newsapi;
#[cfg(feature = "integrations")]
pub mod open_meteo;
#[cfg(feature = "integrations")]
pub mod semantic_scholar;
#[cfg(feature = "integrations")]
pub mod weather_gov;
#[cfg(feature = "integrations")]
pub mod wikipedia;

pub use retry::{RetryConfig, RetryingProvider};
pub use traits::ApiProvider;

#[cfg(feature = "integrations")]
pub use github::GithubClient;
#[cfg(feature = "integrations")]
pub use newsapi::NewsApiClient;
#[cfg(feature = "integrations")]
pub use open_meteo::OpenMeteoClient;
#[cfg(feature = "integrations")]
pub use semantic_scholar::SemanticScholarClient;
#[cfg(feature = "integrations")]
pub use weather_gov::WeatherGovClient;
#[cfg(feature = "integrations")]
pub use wikipedia::WikipediaClient;
