//! Canonical 0-100 score scale.

use serde::{Deserialize, Serialize};

use super::AuditRecord;

/// Bring an analyzer score onto the 0-100 integer scale.
///
/// Values at or below 1.0 are read as fractions, anything larger as already
/// being a percentage. Non-finite input maps to 0.
pub fn normalize_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    let percent = if raw <= 1.0 { raw * 100.0 } else { raw };
    percent.round().clamp(0.0, 100.0) as u8
}

/// The four headline scores of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    pub performance: u8,
    pub seo: u8,
    pub accessibility: u8,
    pub best_practices: u8,
}

impl ScoreSnapshot {
    pub fn average(&self) -> f64 {
        let total = u32::from(self.performance)
            + u32::from(self.seo)
            + u32::from(self.accessibility)
            + u32::from(self.best_practices);
        f64::from(total) / 4.0
    }
}

impl AuditRecord {
    pub fn score_snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            performance: self.performance.score,
            seo: self.seo.score,
            accessibility: self.accessibility.score,
            best_practices: self.best_practices.score,
        }
    }
}
