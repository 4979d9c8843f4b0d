//! Caching subsystem.
//!
//! - [`response::ResponseCache`]: TTL cache of successful provider
//!   payloads keyed by request [`fingerprint`]. Owned by the
//!   [`Router`](crate::Router); a hit bypasses provider selection, rate
//!   limiting and usage accounting entirely.

pub mod response;

pub use response::{CacheConfig, ResponseCache, fingerprint};
