pub mod engine;
pub mod match_cache;
pub mod tree_registry;

pub use engine::{CancelFlag, MatchingEngine};
pub use match_cache::{
    CacheStats, ClosestMatchCache, EngineCacheStats, HydrationCache, MatchKey,
};
pub use tree_registry::{ColorTree, SharedMetric, TreeRegistry};
