//! Query layer
//!
//! Backend reads are cached under hierarchical [`QueryKey`]s and served from
//! the cache while younger than the stale time. Mutations invalidate the
//! keys they affect; bulk inbox actions update cached pages optimistically
//! and roll back if the backend refuses.

mod cache;
mod key;
mod planning;

pub use cache::{CacheStats, QueryCache, QueryCacheConfig, QuerySnapshot};
pub use key::QueryKey;
pub use planning::PlanningQueries;
