//! Core types and shared functionality for siteaudit.
//!
//! This crate provides:
//! - The audit record model and the canonical 0-100 score scale
//! - URL normalization and cache keys
//! - The memory, filesystem and distributed cache tiers with freshness policy
//! - The audit orchestrator and its collaborator traits
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod model;
pub mod service;
pub mod url;

pub use cache::{CacheStatus, DataSource, DistributedCache, TieredCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use maintenance::{CacheMaintenance, MaintenanceSchedule};
pub use model::AuditRecord;
pub use service::{AuditHit, AuditService, Recommender, ServiceOptions, SiteAnalyzer};
