//! Router and its builder

mod builder;
mod router;

pub use builder::{Waypost, WaypostBuilder};
pub use router::{Router, RouterConfig};
