//! Optional cross-instance tier.
//!
//! The backend is a capability: deployments without one get
//! [`NullDistributedCache`], so call sites never branch on presence.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::{AuditRecord, ScoreSnapshot};

/// Remote key/value store with server-side TTL.
#[async_trait]
pub trait DistributedCache: Send + Sync + Debug {
    /// Whether this backend actually stores anything.
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), Error>;

    async fn delete(&self, key: &str) -> Result<(), Error>;
}

/// Backend used when no distributed store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDistributedCache;

#[async_trait]
impl DistributedCache for NullDistributedCache {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn expire(&self, _key: &str, _ttl_secs: u64) -> Result<(), Error> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), Error> {
        Ok(())
    }
}

/// Companion entry stored next to each record for analytics and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub cached_at: DateTime<Utc>,
    pub url: String,
    pub domain: String,
    pub score_snapshot: ScoreSnapshot,
}

impl CacheMetadata {
    pub fn for_record(record: &AuditRecord, cached_at: DateTime<Utc>) -> Self {
        Self {
            cached_at,
            url: record.url.clone(),
            domain: crate::url::extract_domain(&record.url),
            score_snapshot: record.score_snapshot(),
        }
    }
}

/// Key of the metadata companion for `key`.
pub fn meta_key(key: &str) -> String {
    format!("{key}:meta")
}

pub(crate) async fn read_record(
    backend: &dyn DistributedCache, key: &str,
) -> Result<Option<AuditRecord>, Error> {
    match backend.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Store a record with `ttl_secs`, then its metadata with twice that TTL.
pub(crate) async fn write_record(
    backend: &dyn DistributedCache, key: &str, record: &AuditRecord, ttl_secs: u64, now: DateTime<Utc>,
) -> Result<(), Error> {
    let body = serde_json::to_string(record)?;
    backend.set(key, &body).await?;
    backend.expire(key, ttl_secs).await?;

    let meta = serde_json::to_string(&CacheMetadata::for_record(record, now))?;
    let meta_key = meta_key(key);
    backend.set(&meta_key, &meta).await?;
    backend.expire(&meta_key, ttl_secs.saturating_mul(2)).await?;
    Ok(())
}
