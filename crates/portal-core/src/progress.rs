//! Per-category consumption tracking.
//!
//! Category keys are stored exactly as given: "Math" and "math" are distinct
//! entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display bar growth per mastery level, in percent
pub const DISPLAY_PERCENT_PER_LEVEL: u64 = 10;

/// Mastery level for a consumption count. Unbounded.
pub fn mastery_level(count: u64) -> u64 {
    count
}

/// Progress bar width for a consumption count, saturating at 100
pub fn display_percent(count: u64) -> u64 {
    count.saturating_mul(DISPLAY_PERCENT_PER_LEVEL).min(100)
}

/// Aggregate ledger figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub distinct_categories: usize,
    pub total_sessions: u64,
}

/// Mapping from category to consumption count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressLedger {
    counts: BTreeMap<String, u64>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a category, initialising it on first use. Returns the new count.
    pub fn record_consumption(&mut self, category: &str) -> u64 {
        let count = self.counts.entry(category.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn count(&self, category: &str) -> u64 {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn mastery_level(&self, category: &str) -> u64 {
        mastery_level(self.count(category))
    }

    pub fn display_percent(&self, category: &str) -> u64 {
        display_percent(self.count(category))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            distinct_categories: self.counts.len(),
            total_sessions: self.counts.values().sum(),
        }
    }
}
