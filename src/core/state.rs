//! Shared in-memory pipeline bookkeeping.
//!
//! A best-effort cache, not the source of truth: the store's
//! `analysis_status` column is authoritative. Everything here sits behind a
//! single mutex per the shared-resource policy.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// One failed analysis awaiting retry
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,

    /// Failed attempts recorded for this candidate so far
    pub retry_count: u32,

    pub error: String,
}

#[derive(Default)]
struct Inner {
    completed: HashSet<i64>,
    failures: HashMap<i64, FailureInfo>,
}

/// Completed-set and failure-table cache shared by monitor and workers
#[derive(Default)]
pub struct PipelineState {
    inner: Mutex<Inner>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_completed(&self, candidate_id: i64) {
        let mut inner = self.inner.lock().expect("pipeline state poisoned");
        inner.completed.insert(candidate_id);
        inner.failures.remove(&candidate_id);
    }

    pub fn is_completed(&self, candidate_id: i64) -> bool {
        self.inner
            .lock()
            .expect("pipeline state poisoned")
            .completed
            .contains(&candidate_id)
    }

    /// Forget a candidate entirely (operator-triggered re-analysis)
    pub fn forget(&self, candidate_id: i64) {
        let mut inner = self.inner.lock().expect("pipeline state poisoned");
        inner.completed.remove(&candidate_id);
        inner.failures.remove(&candidate_id);
    }

    pub fn record_failure(&self, candidate_id: i64, retry_count: u32, error: String) {
        let mut inner = self.inner.lock().expect("pipeline state poisoned");
        inner.failures.insert(
            candidate_id,
            FailureInfo {
                failed_at: Utc::now(),
                retry_count,
                error,
            },
        );
    }

    /// Remove and return failures that are due for retry: older than
    /// `retry_delay` and still under `max_retries`. The returned retry
    /// count is already incremented for the next attempt.
    pub fn take_due_retries(
        &self,
        now: DateTime<Utc>,
        retry_delay: std::time::Duration,
        max_retries: u32,
    ) -> Vec<(i64, u32)> {
        let delay = Duration::from_std(retry_delay).unwrap_or_default();
        let mut inner = self.inner.lock().expect("pipeline state poisoned");

        let due: Vec<i64> = inner
            .failures
            .iter()
            .filter(|(_, info)| now - info.failed_at > delay && info.retry_count < max_retries)
            .map(|(id, _)| *id)
            .collect();

        due.into_iter()
            .filter_map(|id| inner.failures.remove(&id).map(|info| (id, info.retry_count + 1)))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.inner
            .lock()
            .expect("pipeline state poisoned")
            .completed
            .len()
    }

    pub fn failed_count(&self) -> usize {
        self.inner
            .lock()
            .expect("pipeline state poisoned")
            .failures
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn test_completed_clears_failure() {
        let state = PipelineState::new();
        state.record_failure(1, 0, "store unreachable".to_string());
        assert_eq!(state.failed_count(), 1);

        state.record_completed(1);
        assert!(state.is_completed(1));
        assert_eq!(state.failed_count(), 0);
    }

    #[test]
    fn test_retries_due_after_delay() {
        let state = PipelineState::new();
        state.record_failure(1, 0, "boom".to_string());

        // Not due yet
        let due = state.take_due_retries(Utc::now(), StdDuration::from_secs(300), 3);
        assert!(due.is_empty());

        // Due once the clock passes the delay
        let later = Utc::now() + Duration::seconds(301);
        let due = state.take_due_retries(later, StdDuration::from_secs(300), 3);
        assert_eq!(due, vec![(1, 1)]);
        assert_eq!(state.failed_count(), 0);
    }

    #[test]
    fn test_exhausted_failures_stay() {
        let state = PipelineState::new();
        state.record_failure(1, 3, "boom".to_string());

        let later = Utc::now() + Duration::seconds(301);
        let due = state.take_due_retries(later, StdDuration::from_secs(300), 3);
        assert!(due.is_empty());
        assert_eq!(state.failed_count(), 1);
    }

    #[test]
    fn test_forget_for_reanalysis() {
        let state = PipelineState::new();
        state.record_completed(1);
        state.forget(1);
        assert!(!state.is_completed(1));
    }
}
