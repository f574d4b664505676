// src/core/history.rs

//! Storage seam for completed scans. The orchestrator only sees the
//! `HistoryStore` trait, so the concurrency discipline (append-only,
//! no lost updates) and testability are explicit rather than incidental.

use crate::core::models::ScanRecord;
use std::sync::RwLock;

/// Append-only store of completed scan records.
pub trait HistoryStore: Send + Sync {
    /// Appends one immutable record.
    fn append(&self, record: ScanRecord);

    /// Most recent records first, at most `limit` of them.
    fn recent(&self, limit: usize) -> Vec<ScanRecord>;

    /// Number of stored records.
    fn count(&self) -> usize;
}

/// In-memory history backed by an RwLock-guarded vector. Appends take the
/// write lock, reads clone under the read lock, so concurrent scans never
/// lose updates.
#[derive(Default)]
pub struct InMemoryHistory {
    records: RwLock<Vec<ScanRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, record: ScanRecord) {
        self.records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
    }

    fn recent(&self, limit: usize) -> Vec<ScanRecord> {
        let records = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.iter().rev().take(limit).cloned().collect()
    }

    fn count(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Grade, RiskLevel};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(url: &str) -> ScanRecord {
        ScanRecord {
            scan_id: Uuid::new_v4(),
            url: url.to_string(),
            overall_grade: Grade::B,
            risk_score: 18,
            risk_level: RiskLevel::Minimal,
            http_grade: Grade::B,
            ssl_grade: Grade::A,
            dns_grade: Grade::C,
            critical_issues_count: 0,
            high_issues_count: 1,
            medium_issues_count: 2,
            recommendations: vec!["[DNS] SPF Record Missing: add one".to_string(); 3],
            scan_duration_ms: 1200,
            scanned_at: Utc::now(),
        }
    }

    #[test]
    fn recent_returns_newest_first() {
        let store = InMemoryHistory::new();
        store.append(record("https://first.example"));
        store.append(record("https://second.example"));
        store.append(record("https://third.example"));

        let recent = store.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].url, "https://third.example");
        assert_eq!(recent[1].url, "https://second.example");
    }

    #[test]
    fn count_tracks_appends() {
        let store = InMemoryHistory::new();
        assert_eq!(store.count(), 0);
        store.append(record("https://example.com"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        use std::sync::Arc;
        let store = Arc::new(InMemoryHistory::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    store.append(record(&format!("https://{}-{}.example", i, j)));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count(), 400);
    }
}
