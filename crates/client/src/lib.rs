//! Collaborator implementations for siteaudit.
//!
//! This crate provides the deterministic site analyzers, the model-backed
//! recommender with its local fallback, the REST key/value client for the
//! distributed cache tier, and the wiring that assembles them into an
//! [`siteaudit_core::AuditService`] for the server and CLI.

pub mod analyze;
pub mod compose;
pub mod kv;
pub mod llm;

pub use analyze::{MockAnalyzer, detect_technologies, inspect_html};
pub use compose::build_service;
pub use kv::{KvError, RestKvCache};
pub use llm::{LlmConfig, LlmError, LlmRecommender, local_report};
