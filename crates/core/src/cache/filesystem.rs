//! Durable tier: one JSON file per cache key.
//!
//! File names come from [`cache_file_name`], so keys never leak into paths.
//! Freshness is read from the record's own `timestamp`, while sweeps use
//! file modification times.
//!
//! If the directory cannot be created at startup the tier stays disabled for
//! the life of the process and every operation is a no-op.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::hash::{RECORD_EXTENSION, cache_file_name};
use crate::Error;
use crate::model::AuditRecord;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Extension of in-flight writes; leftovers mean a write never reached its rename.
const TMP_EXTENSION: &str = "tmp";

/// Sweep and capacity settings.
#[derive(Debug, Clone, Copy)]
pub struct FsCacheOptions {
    pub max_age: Duration,
    pub capacity: usize,
    /// Delay before the sweep that follows a write. `Duration::ZERO` disables it.
    pub cleanup_delay: Duration,
}

/// Files removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub expired: usize,
    pub over_capacity: usize,
    /// Temporary files abandoned by interrupted writes.
    pub orphaned: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.expired + self.over_capacity + self.orphaned
    }
}

#[derive(Debug)]
struct FsInner {
    dir: PathBuf,
    enabled: bool,
    options: FsCacheOptions,
    cleanup_pending: AtomicBool,
    sweeping: AtomicBool,
}

/// Handle to the filesystem tier. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FsCache {
    inner: Arc<FsInner>,
}

struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FsCache {
    /// Open the tier at `dir`, creating the directory if needed.
    ///
    /// Never fails: a directory that cannot be created yields a disabled tier.
    pub async fn open(dir: impl Into<PathBuf>, options: FsCacheOptions) -> Self {
        let dir = dir.into();
        let enabled = match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "Cannot create audit cache directory; filesystem tier disabled");
                false
            }
        };
        Self::build(dir, enabled, options)
    }

    /// A tier that ignores every operation.
    pub fn disabled() -> Self {
        let options = FsCacheOptions { max_age: Duration::ZERO, capacity: 0, cleanup_delay: Duration::ZERO };
        Self::build(PathBuf::new(), false, options)
    }

    fn build(dir: PathBuf, enabled: bool, options: FsCacheOptions) -> Self {
        let inner = FsInner {
            dir,
            enabled,
            options,
            cleanup_pending: AtomicBool::new(false),
            sweeping: AtomicBool::new(false),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.inner.dir.join(cache_file_name(key))
    }

    /// Read a record and its generation timestamp.
    pub async fn get(&self, key: &str) -> Result<Option<(AuditRecord, DateTime<Utc>)>, Error> {
        if !self.inner.enabled {
            return Ok(None);
        }

        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: AuditRecord = serde_json::from_slice(&bytes)?;
        let timestamp = record.timestamp;
        Ok(Some((record, timestamp)))
    }

    /// Replace the file for `key` with `record`.
    ///
    /// The record is written to a temporary file in the same directory and
    /// renamed into place, so readers never observe a partial file.
    pub async fn set(&self, key: &str, record: &AuditRecord) -> Result<(), Error> {
        if !self.inner.enabled {
            return Ok(());
        }

        let target = self.path_for(key);
        let bytes = serde_json::to_vec(record)?;
        let tmp = target.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        self.schedule_cleanup();
        Ok(())
    }

    /// Delete the file for `key`. Returns whether a file was removed.
    pub async fn remove(&self, key: &str) -> Result<bool, Error> {
        if !self.inner.enabled {
            return Ok(false);
        }

        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.enabled && tokio::fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Number of record files currently on disk.
    pub async fn file_count(&self) -> Result<usize, Error> {
        if !self.inner.enabled {
            return Ok(0);
        }
        Ok(self.list_records().await?.len())
    }

    /// Debounced sweep shortly after a write. At most one is pending at a time.
    fn schedule_cleanup(&self) {
        let delay = self.inner.options.cleanup_delay;
        if delay.is_zero() || self.inner.cleanup_pending.swap(true, Ordering::AcqRel) {
            return;
        }

        let cache = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            cache.inner.cleanup_pending.store(false, Ordering::Release);
            if let Err(e) = cache.sweep(SystemTime::now()).await {
                tracing::warn!(error = %e, "Post-write audit cache sweep failed");
            }
        });
    }

    /// Two-phase sweep.
    ///
    /// 1. Remove files whose modification time is older than `max_age`.
    /// 2. If more than `capacity` files remain, remove the oldest by
    ///    modification time until the cap holds.
    ///
    /// Temporary files older than `max_age` are removed along the way.
    ///
    /// Returns `None` when the tier is disabled or another sweep is running.
    pub async fn sweep(&self, now: SystemTime) -> Result<Option<SweepReport>, Error> {
        if !self.inner.enabled {
            return Ok(None);
        }
        if self.inner.sweeping.swap(true, Ordering::AcqRel) {
            tracing::debug!("Filesystem sweep already running; skipping");
            return Ok(None);
        }
        let _guard = SweepGuard(&self.inner.sweeping);

        let mut files = self.list_records().await?;
        let mut report = SweepReport::default();

        let max_age = self.inner.options.max_age;
        for (path, modified) in self.list_files(TMP_EXTENSION).await? {
            if now.duration_since(modified).unwrap_or_default() > max_age && remove_quietly(&path).await {
                report.orphaned += 1;
            }
        }

        let mut kept = Vec::with_capacity(files.len());
        for (path, modified) in files.drain(..) {
            let age = now.duration_since(modified).unwrap_or_default();
            if age > max_age {
                if remove_quietly(&path).await {
                    report.expired += 1;
                }
            } else {
                kept.push((path, modified));
            }
        }

        let capacity = self.inner.options.capacity;
        if kept.len() > capacity {
            kept.sort_by_key(|(_, modified)| *modified);
            let excess = kept.len() - capacity;
            for (path, _) in kept.iter().take(excess) {
                if remove_quietly(path).await {
                    report.over_capacity += 1;
                }
            }
        }

        if report.total() > 0 {
            tracing::info!(
                removed = report.total(),
                expired = report.expired,
                over_capacity = report.over_capacity,
                orphaned = report.orphaned,
                tier = "filesystem",
                "Swept audit cache files"
            );
        }

        Ok(Some(report))
    }

    async fn list_records(&self) -> Result<Vec<(PathBuf, SystemTime)>, Error> {
        self.list_files(RECORD_EXTENSION).await
    }

    async fn list_files(&self, extension: &str) -> Result<Vec<(PathBuf, SystemTime)>, Error> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.inner.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
                continue;
            }
            match entry.metadata().await.and_then(|meta| meta.modified()) {
                Ok(modified) => files.push((path, modified)),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Cannot stat audit cache file"),
            }
        }

        Ok(files)
    }
}

async fn remove_quietly(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot remove audit cache file");
            false
        }
    }
}
