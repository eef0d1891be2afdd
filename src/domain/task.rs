//! In-memory analysis tasks.
//!
//! Tasks are transient: they exist only inside the queue and are never
//! persisted. The store's `auto_score_triggered` flag plus the conditional
//! status claim guarantee at most one outstanding task per candidate.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Highest priority, used for manual and retry enqueues
pub const PRIORITY_URGENT: u8 = 0;

/// Retries re-enter the queue just behind manual requests
pub const PRIORITY_RETRY: u8 = 1;

/// Interviews completed less than an hour ago
pub const PRIORITY_FRESH: u8 = 1;

/// Interviews completed less than six hours ago
pub const PRIORITY_RECENT: u8 = 3;

/// Everything older
pub const PRIORITY_NORMAL: u8 = 5;

/// A request to analyze one candidate's completed interview
#[derive(Debug, Clone)]
pub struct AnalysisTask {
    pub candidate_id: i64,

    /// Lower value dequeues first
    pub priority: u8,

    /// How many times this candidate's analysis has already failed
    pub retry_count: u32,

    pub created_at: DateTime<Utc>,
}

impl AnalysisTask {
    pub fn new(candidate_id: i64, priority: u8) -> Self {
        Self {
            candidate_id,
            priority,
            retry_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

/// Queue entry ordered by (priority, enqueue sequence).
///
/// The sequence number gives a deterministic FIFO tie-break between tasks
/// of equal priority.
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub task: AnalysisTask,
    pub seq: u64,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.task.priority == other.task.priority && self.seq == other.seq
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.task.priority, self.seq).cmp(&(other.task.priority, other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(priority: u8, seq: u64) -> QueuedTask {
        QueuedTask {
            task: AnalysisTask::new(1, priority),
            seq,
        }
    }

    #[test]
    fn test_priority_orders_first() {
        assert!(queued(1, 99) < queued(5, 0));
    }

    #[test]
    fn test_fifo_tie_break() {
        assert!(queued(3, 1) < queued(3, 2));
    }
}
