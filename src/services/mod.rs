pub mod mutation;
pub mod query_cache;

pub use mutation::MutationCoordinator;
pub use query_cache::{CacheView, DEFAULT_STALE_TIME, QueryCache};
