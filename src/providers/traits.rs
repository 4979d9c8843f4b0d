//! Provider trait for upstream API integrations.
//!
//! A provider receives an already-validated [`Operation`] and returns a
//! JSON payload or an error. Selection, caching, rate limiting and usage
//! accounting all happen in the [`Router`](crate::Router); providers only
//! talk to their upstream.
//!
//! # Error contract
//!
//! - Return [`WaypostError::Unsupported`] for operations outside what the
//!   provider advertises. The router does not fall back on it.
//! - Map transport and status failures onto `Http`, `Api`,
//!   `AuthenticationFailed`, `NotFound` or `RateLimited` so retry and
//!   fallback can classify them.
//!
//! # Example
//!
//! ```ignore
//! #[async_trait]
//! impl ApiProvider for Dictionary {
//!     fn name(&self) -> &str { "dictionary" }
//!
//!     async fn call(&self, operation: &Operation) -> Result<Value> {
//!         match operation {
//!             Operation::Research(ResearchOp::GetWikipedia(page)) => self.lookup(&page.title).await,
//!             other => Err(WaypostError::Unsupported {
//!                 category: other.category().as_str().into(),
//!                 action: other.action().into(),
//!             }),
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::types::Operation;

/// An upstream integration serving one or more operations.
#[async_trait]
pub trait ApiProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Execute `operation` against the upstream API.
    async fn call(&self, operation: &Operation) -> Result<Value>;
}

/// Error for an operation the provider does not implement.
pub fn unsupported(operation: &Operation) -> crate::WaypostError {
    crate::WaypostError::unsupported(operation.category().as_str(), operation.action())
}
