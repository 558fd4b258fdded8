//! Recently generated audits, newest first.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::AuditRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub domain: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub performance: u8,
    pub seo: u8,
}

impl HistoryEntry {
    fn from_record(record: &AuditRecord) -> Self {
        Self {
            domain: crate::url::extract_domain(&record.url),
            url: record.url.clone(),
            timestamp: record.timestamp,
            performance: record.performance.score,
            seo: record.seo.score,
        }
    }
}

/// Bounded, de-duplicated by URL.
#[derive(Debug)]
pub struct AuditHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl AuditHistory {
    pub fn new(capacity: usize) -> Self {
        Self { entries: Mutex::new(VecDeque::with_capacity(capacity)), capacity: capacity.max(1) }
    }

    pub fn record(&self, record: &AuditRecord) {
        let entry = HistoryEntry::from_record(record);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|existing| existing.url != entry.url);
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    pub fn latest(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().take(limit).cloned().collect()
    }
}
