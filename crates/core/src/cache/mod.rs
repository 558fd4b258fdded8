//! Multi-tier audit cache.
//!
//! - [`memory`]: bounded LRU map, fastest tier
//! - [`filesystem`]: content-hashed JSON files surviving restarts
//! - [`distributed`]: optional shared key/value store with TTL
//! - [`freshness`]: age classification that drives refresh decisions
//! - [`tiered`]: lookup with promotion and write-through across the tiers

pub mod distributed;
pub mod filesystem;
pub mod freshness;
pub mod hash;
pub mod memory;
pub mod tiered;

pub use distributed::{CacheMetadata, DistributedCache, NullDistributedCache};
pub use filesystem::{FsCache, FsCacheOptions, SweepReport};
pub use freshness::{CacheStatus, DataSource, Freshness, FreshnessPolicy, RefreshAction};
pub use memory::{CacheEntry, CacheStats, LruCache, MemoryCache};
pub use tiered::{FilesystemStats, TierHit, TierStats, TieredCache};
