//! Bounded in-process tier with least-recently-accessed eviction.
//!
//! [`LruCache`] is the plain data structure and takes `now` explicitly;
//! [`MemoryCache`] is the shared, clock-driven handle the orchestrator uses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::model::AuditRecord;

/// One memory-tier slot.
///
/// `timestamp` is when the data was generated and never changes;
/// `last_accessed` only orders eviction and is always `>= timestamp`.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    seq: u64,
}

/// Occupancy figures for observability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub utilization_percent: f64,
}

/// Capacity-bounded map evicting the entry with the smallest `last_accessed`.
///
/// Ties on `last_accessed` go to the entry touched longest ago (lowest
/// sequence number), so eviction order is deterministic.
#[derive(Debug)]
pub struct LruCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    capacity: usize,
    next_seq: u64,
}

impl<T: Clone> LruCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity), capacity: capacity.max(1), next_seq: 0 }
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Look up a key, marking it most recently used.
    ///
    /// Returns the generation timestamp unchanged.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<(T, DateTime<Utc>)> {
        let seq = self.bump();
        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = now.max(entry.timestamp);
        entry.seq = seq;
        Some((entry.data.clone(), entry.timestamp))
    }

    /// Insert or replace a key. Evicts one entry only when the key is new and
    /// the cache is full.
    pub fn set(&mut self, key: impl Into<String>, data: T, timestamp: DateTime<Utc>, now: DateTime<Utc>) {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_one();
        }

        let seq = self.bump();
        let entry = CacheEntry { data, timestamp, last_accessed: now.max(timestamp), seq };
        self.entries.insert(key, entry);
    }

    fn evict_one(&mut self) -> Option<String> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.last_accessed, entry.seq))
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&victim);
        Some(victim)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every entry whose age exceeds `max_age`. Returns how many went.
    pub fn cleanup_old_entries(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let before = self.entries.len();
        self.entries.retain(|_, entry| now.signed_duration_since(entry.timestamp) <= max_age);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.entries.len();
        let utilization_percent = (size as f64 / self.capacity as f64 * 1000.0).round() / 10.0;
        CacheStats { size, capacity: self.capacity, utilization_percent }
    }
}

/// Shared memory tier holding whole records behind `Arc`.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: Arc<Mutex<LruCache<Arc<AuditRecord>>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self { inner: Arc::new(Mutex::new(LruCache::new(capacity))), clock }
    }

    pub async fn get(&self, key: &str) -> Option<(Arc<AuditRecord>, DateTime<Utc>)> {
        let now = self.clock.now();
        self.inner.lock().await.get(key, now)
    }

    /// Store a record under its own generation timestamp.
    pub async fn insert(&self, key: &str, record: Arc<AuditRecord>) {
        let now = self.clock.now();
        let timestamp = record.timestamp;
        self.inner.lock().await.set(key, record, timestamp, now);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.has(key)
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.inner.lock().await.delete(key)
    }

    /// Age-based sweep against the current clock.
    pub async fn sweep(&self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let removed = self.inner.lock().await.cleanup_old_entries(max_age, now);
        if removed > 0 {
            tracing::info!(removed, tier = "memory", "Swept expired audit entries");
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }
}
