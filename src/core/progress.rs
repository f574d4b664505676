// src/core/progress.rs

//! In-memory registry of scan progress snapshots.
//!
//! Each scan owns its entry: only the orchestrator task running that scan
//! mutates it, readers get eventually-consistent clones. Terminal entries
//! stay stable until the retention sweep removes them.

use crate::core::models::{ScanProgress, ScanState};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub struct ProgressTracker {
    scans: RwLock<HashMap<Uuid, ScanProgress>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self { scans: RwLock::new(HashMap::new()) }
    }

    /// Registers a new scan in the PENDING state and returns its id.
    pub fn create(&self, url: &str) -> Uuid {
        let scan_id = Uuid::new_v4();
        let now = Utc::now();
        let progress = ScanProgress {
            scan_id,
            url: url.to_string(),
            state: ScanState::Pending,
            current_phase: "Queued".to_string(),
            progress_percentage: 0,
            started_at: now,
            last_update: now,
            error: None,
        };
        self.scans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(scan_id, progress);
        debug!(%scan_id, url, "Scan progress entry created.");
        scan_id
    }

    /// Moves a scan into RUNNING and publishes a phase label and
    /// percentage. Updates never lower the percentage (concurrent
    /// sub-checks may report completion out of order) and terminal
    /// entries are left untouched.
    pub fn advance(&self, scan_id: Uuid, phase: &str, percentage: u8) {
        let mut scans = self
            .scans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(progress) = scans.get_mut(&scan_id) {
            if progress.state.is_terminal() {
                return;
            }
            progress.state = ScanState::Running;
            if percentage >= progress.progress_percentage {
                progress.progress_percentage = percentage;
                progress.current_phase = phase.to_string();
            }
            progress.last_update = Utc::now();
        }
    }

    /// Marks a scan COMPLETED at 100%. Idempotent: a completed entry
    /// keeps returning the same snapshot.
    pub fn complete(&self, scan_id: Uuid) {
        let mut scans = self
            .scans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(progress) = scans.get_mut(&scan_id) {
            if progress.state.is_terminal() {
                return;
            }
            progress.state = ScanState::Completed;
            progress.current_phase = "Complete".to_string();
            progress.progress_percentage = 100;
            progress.last_update = Utc::now();
        }
    }

    /// Marks a scan FAILED with a reason.
    pub fn fail(&self, scan_id: Uuid, error: &str) {
        let mut scans = self
            .scans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(progress) = scans.get_mut(&scan_id) {
            if progress.state.is_terminal() {
                return;
            }
            progress.state = ScanState::Failed;
            progress.current_phase = "Failed".to_string();
            progress.error = Some(error.to_string());
            progress.last_update = Utc::now();
        }
    }

    /// Snapshot of a scan's progress, or `None` for unknown ids.
    pub fn get(&self, scan_id: Uuid) -> Option<ScanProgress> {
        self.scans
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&scan_id)
            .cloned()
    }

    /// Removes terminal entries whose last update is older than the
    /// retention window. Returns how many entries were removed.
    pub fn prune_terminal(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut scans = self
            .scans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = scans.len();
        scans.retain(|_, p| !(p.state.is_terminal() && p.last_update < cutoff));
        before - scans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_reaches_completed() {
        let tracker = ProgressTracker::new();
        let id = tracker.create("https://example.com");
        assert_eq!(tracker.get(id).unwrap().state, ScanState::Pending);

        tracker.advance(id, "headers", 10);
        let p = tracker.get(id).unwrap();
        assert_eq!(p.state, ScanState::Running);
        assert_eq!(p.current_phase, "headers");

        tracker.complete(id);
        let p = tracker.get(id).unwrap();
        assert_eq!(p.state, ScanState::Completed);
        assert_eq!(p.progress_percentage, 100);
    }

    #[test]
    fn percentage_never_decreases() {
        let tracker = ProgressTracker::new();
        let id = tracker.create("https://example.com");
        tracker.advance(id, "dns", 70);
        tracker.advance(id, "headers", 40);
        let p = tracker.get(id).unwrap();
        assert_eq!(p.progress_percentage, 70);
        assert_eq!(p.current_phase, "dns");
    }

    #[test]
    fn terminal_state_is_stable() {
        let tracker = ProgressTracker::new();
        let id = tracker.create("https://example.com");
        tracker.complete(id);
        let first = tracker.get(id).unwrap();

        // Late updates after completion must not change the snapshot.
        tracker.advance(id, "dns", 70);
        tracker.fail(id, "too late");
        let second = tracker.get(id).unwrap();
        assert_eq!(first.state, second.state);
        assert_eq!(first.progress_percentage, second.progress_percentage);
        assert_eq!(first.current_phase, second.current_phase);
        assert!(second.error.is_none());
    }

    #[test]
    fn failure_records_the_reason() {
        let tracker = ProgressTracker::new();
        let id = tracker.create("https://unreachable.example");
        tracker.fail(id, "could not resolve host");
        let p = tracker.get(id).unwrap();
        assert_eq!(p.state, ScanState::Failed);
        assert_eq!(p.error.as_deref(), Some("could not resolve host"));
    }

    #[test]
    fn unknown_id_returns_none() {
        let tracker = ProgressTracker::new();
        assert!(tracker.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn prune_removes_only_expired_terminal_entries() {
        let tracker = ProgressTracker::new();
        let done = tracker.create("https://done.example");
        tracker.complete(done);
        let running = tracker.create("https://running.example");
        tracker.advance(running, "headers", 10);

        // Zero retention: every terminal entry is already expired.
        std::thread::sleep(std::time::Duration::from_millis(5));
        let removed = tracker.prune_terminal(Duration::zero());
        assert_eq!(removed, 1);
        assert!(tracker.get(done).is_none());
        assert!(tracker.get(running).is_some());
    }
}
