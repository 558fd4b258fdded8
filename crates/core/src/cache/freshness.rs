//! Freshness classification of cached records.
//!
//! Pure functions over the age of a record; no state is kept between lookups.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Age class of a cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// `age < fresh`: serve as is.
    Fresh,
    /// `fresh <= age < stale`: serve and refresh in the background.
    Stale,
    /// `age >= stale`: serve and refresh immediately.
    Expired,
}

/// What the orchestrator should do after serving a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    None,
    Background,
    Immediate,
}

impl Freshness {
    pub fn refresh_action(self) -> RefreshAction {
        match self {
            Freshness::Fresh => RefreshAction::None,
            Freshness::Stale => RefreshAction::Background,
            Freshness::Expired => RefreshAction::Immediate,
        }
    }
}

/// The two windows that split ages into [`Freshness`] classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub fresh: Duration,
    pub stale: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self { fresh: Duration::from_secs(30 * 60), stale: Duration::from_secs(24 * 60 * 60) }
    }
}

impl FreshnessPolicy {
    pub fn new(fresh: Duration, stale: Duration) -> Self {
        Self { fresh, stale }
    }

    pub fn classify_age(&self, age: Duration) -> Freshness {
        if age < self.fresh {
            Freshness::Fresh
        } else if age < self.stale {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    /// Classify a record generated at `timestamp`. Timestamps in the future
    /// count as age zero.
    pub fn classify(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Freshness {
        self.classify_age(age_of(timestamp, now))
    }
}

/// Non-negative age of `timestamp` at `now`.
pub fn age_of(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(timestamp).to_std().unwrap_or_default()
}

/// How a lookup was answered, as reported to callers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    HitFresh,
    HitStale,
    HitExpired,
    Miss,
    Forced,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::HitFresh => "hit_fresh",
            CacheStatus::HitStale => "hit_stale",
            CacheStatus::HitExpired => "hit_expired",
            CacheStatus::Miss => "miss",
            CacheStatus::Forced => "forced",
        }
    }
}

impl From<Freshness> for CacheStatus {
    fn from(freshness: Freshness) -> Self {
        match freshness {
            Freshness::Fresh => CacheStatus::HitFresh,
            Freshness::Stale => CacheStatus::HitStale,
            Freshness::Expired => CacheStatus::HitExpired,
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the returned record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Memory,
    Filesystem,
    Distributed,
    Generated,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Memory => "memory",
            DataSource::Filesystem => "filesystem",
            DataSource::Distributed => "distributed",
            DataSource::Generated => "generated",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fresh_boundary() {
        let policy = FreshnessPolicy::default();
        assert_eq!(policy.classify_age(Duration::ZERO), Freshness::Fresh);
        assert_eq!(policy.classify_age(policy.fresh - MS), Freshness::Fresh);
        assert_eq!(policy.classify_age(policy.fresh), Freshness::Stale);
    }

    #[test]
    fn test_stale_boundary() {
        let policy = FreshnessPolicy::default();
        assert_eq!(policy.classify_age(policy.stale - MS), Freshness::Stale);
        assert_eq!(policy.classify_age(policy.stale), Freshness::Expired);
        assert_eq!(policy.classify_age(Duration::from_secs(8 * 86_400)), Freshness::Expired);
    }

    #[test]
    fn test_classify_timestamps() {
        let policy = FreshnessPolicy::default();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert_eq!(policy.classify(now - chrono::Duration::minutes(10), now), Freshness::Fresh);
        assert_eq!(policy.classify(now - chrono::Duration::hours(2), now), Freshness::Stale);
        assert_eq!(policy.classify(now - chrono::Duration::days(8), now), Freshness::Expired);
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let policy = FreshnessPolicy::default();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(policy.classify(now + chrono::Duration::hours(5), now), Freshness::Fresh);
    }

    #[test]
    fn test_refresh_actions() {
        assert_eq!(Freshness::Fresh.refresh_action(), RefreshAction::None);
        assert_eq!(Freshness::Stale.refresh_action(), RefreshAction::Background);
        assert_eq!(Freshness::Expired.refresh_action(), RefreshAction::Immediate);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(CacheStatus::from(Freshness::Stale).as_str(), "hit_stale");
        assert_eq!(CacheStatus::Forced.to_string(), "forced");
        assert_eq!(DataSource::Filesystem.to_string(), "filesystem");
        assert_eq!(serde_json::to_value(CacheStatus::HitExpired).unwrap(), "hit_expired");
    }
}
