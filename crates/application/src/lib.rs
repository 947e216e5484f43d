//! Application layer - queries and client-side state
//!
//! Sits between the presentation surface and the backend adapter. The query
//! layer caches backend reads and keeps them consistent across mutations;
//! the state stores hold what the user is looking at (filters, view mode,
//! inbox selection).

pub mod error;
pub mod ports;
pub mod query;
pub mod state;

pub use error::ApplicationError;
pub use ports::*;
pub use query::{CacheStats, PlanningQueries, QueryCache, QueryCacheConfig, QueryKey, QuerySnapshot};
pub use state::{InboxState, SearchFilterStore, ViewMode};
