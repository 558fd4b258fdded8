//! The three cache tiers behind one lookup/write-through facade.
//!
//! Lookup order is memory, filesystem, distributed. A hit in a slower tier is
//! copied into every faster tier before it is returned. Tier failures are
//! logged and treated as misses.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::distributed::{self, DistributedCache, NullDistributedCache, meta_key};
use super::filesystem::{FsCache, FsCacheOptions, SweepReport};
use super::freshness::DataSource;
use super::memory::{CacheStats, MemoryCache};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::model::AuditRecord;

/// A record found in one of the tiers.
#[derive(Debug, Clone)]
pub struct TierHit {
    pub record: Arc<AuditRecord>,
    pub timestamp: DateTime<Utc>,
    pub source: DataSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilesystemStats {
    pub enabled: bool,
    pub files: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierStats {
    pub memory: CacheStats,
    pub filesystem: FilesystemStats,
    pub distributed: bool,
}

#[derive(Debug, Clone)]
pub struct TieredCache {
    memory: MemoryCache,
    filesystem: FsCache,
    distributed: Arc<dyn DistributedCache>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl TieredCache {
    pub fn new(
        memory: MemoryCache, filesystem: FsCache, distributed: Arc<dyn DistributedCache>, max_age: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { memory, filesystem, distributed, max_age, clock }
    }

    /// Build all tiers from configuration. Pass `None` for `distributed` to
    /// run without a shared tier.
    pub async fn from_config(
        config: &AppConfig, clock: Arc<dyn Clock>, distributed: Option<Arc<dyn DistributedCache>>,
    ) -> Self {
        let memory = MemoryCache::new(config.memory_capacity, clock.clone());
        let filesystem = if config.filesystem_enabled {
            let options = FsCacheOptions {
                max_age: config.max_age(),
                capacity: config.persistent_capacity,
                cleanup_delay: config.post_write_cleanup_delay(),
            };
            FsCache::open(&config.cache_dir, options).await
        } else {
            FsCache::disabled()
        };
        let distributed = distributed.unwrap_or_else(|| Arc::new(NullDistributedCache));

        tracing::info!(
            memory_capacity = config.memory_capacity,
            filesystem = filesystem.is_enabled(),
            distributed = distributed.is_enabled(),
            "Audit cache tiers ready"
        );

        Self::new(memory, filesystem, distributed, config.max_age(), clock)
    }

    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn filesystem(&self) -> &FsCache {
        &self.filesystem
    }

    pub fn distributed(&self) -> &Arc<dyn DistributedCache> {
        &self.distributed
    }

    fn kv_ttl_secs(&self) -> u64 {
        self.max_age.as_secs().max(1)
    }

    /// Find `key` in the fastest tier that has it, promoting lower-tier hits.
    pub async fn lookup(&self, key: &str) -> Option<TierHit> {
        if let Some((record, timestamp)) = self.memory.get(key).await {
            return Some(TierHit { record, timestamp, source: DataSource::Memory });
        }

        match self.filesystem.get(key).await {
            Ok(Some((record, timestamp))) => {
                let record = Arc::new(record);
                self.memory.insert(key, record.clone()).await;
                return Some(TierHit { record, timestamp, source: DataSource::Filesystem });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, error = %e, tier = "filesystem", "Cache read failed; treating as miss"),
        }

        if !self.distributed.is_enabled() {
            return None;
        }

        match distributed::read_record(self.distributed.as_ref(), key).await {
            Ok(Some(record)) => {
                let timestamp = record.timestamp;
                let record = Arc::new(record);
                self.memory.insert(key, record.clone()).await;
                if let Err(e) = self.filesystem.set(key, &record).await {
                    tracing::warn!(key, error = %e, tier = "filesystem", "Promotion write failed");
                }
                Some(TierHit { record, timestamp, source: DataSource::Distributed })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, tier = "distributed", "Cache read failed; treating as miss");
                None
            }
        }
    }

    /// Store a freshly generated record in every enabled tier.
    pub async fn write_through(&self, key: &str, record: Arc<AuditRecord>) {
        self.memory.insert(key, record.clone()).await;

        if let Err(e) = self.filesystem.set(key, &record).await {
            tracing::warn!(key, error = %e, tier = "filesystem", "Cache write failed");
        }

        if self.distributed.is_enabled() {
            let now = self.clock.now();
            if let Err(e) =
                distributed::write_record(self.distributed.as_ref(), key, &record, self.kv_ttl_secs(), now).await
            {
                tracing::warn!(key, error = %e, tier = "distributed", "Cache write failed");
            }
        }
    }

    /// Drop `key` from every tier. Returns whether a local tier held it.
    pub async fn invalidate(&self, key: &str) -> bool {
        let in_memory = self.memory.remove(key).await;

        let on_disk = match self.filesystem.remove(key).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(key, error = %e, tier = "filesystem", "Cache delete failed");
                false
            }
        };

        if self.distributed.is_enabled() {
            for k in [key.to_string(), meta_key(key)] {
                if let Err(e) = self.distributed.delete(&k).await {
                    tracing::warn!(key = %k, error = %e, tier = "distributed", "Cache delete failed");
                }
            }
        }

        in_memory || on_disk
    }

    pub async fn sweep_memory(&self) -> usize {
        self.memory.sweep(self.max_age).await
    }

    pub async fn sweep_filesystem(&self) -> Option<SweepReport> {
        match self.filesystem.sweep(SystemTime::now()).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, tier = "filesystem", "Sweep failed");
                None
            }
        }
    }

    pub async fn stats(&self) -> TierStats {
        let files = match self.filesystem.file_count().await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, tier = "filesystem", "Cannot count cache files");
                0
            }
        };

        TierStats {
            memory: self.memory.stats().await,
            filesystem: FilesystemStats { enabled: self.filesystem.is_enabled(), files },
            distributed: self.distributed.is_enabled(),
        }
    }
}
