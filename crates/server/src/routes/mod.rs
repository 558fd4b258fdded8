//! HTTP handlers.

pub mod audit;
pub mod report;
pub mod stats;
