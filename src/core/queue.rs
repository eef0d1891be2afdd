//! Thread-safe priority queue of pending analysis tasks.
//!
//! Tasks dequeue in strict priority order (lower value first) with FIFO
//! tie-breaking via a monotone enqueue sequence. Dequeue blocks with a
//! timeout so workers can observe shutdown between waits.
//!
//! The queue itself does no idempotency bookkeeping: enqueue gating happens
//! at the store via `try_claim_for_enqueue` before a task is pushed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout, Instant};

use crate::domain::task::QueuedTask;
use crate::domain::AnalysisTask;

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<QueuedTask>>,
    next_seq: u64,
}

/// Priority queue keyed by (priority, enqueue order)
#[derive(Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a task; assigns the FIFO sequence number
    pub async fn push(&self, task: AnalysisTask) {
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Reverse(QueuedTask { task, seq }));
        drop(state);
        self.notify.notify_one();
    }

    /// Pop the most urgent task if one is available
    pub async fn try_pop(&self) -> Option<AnalysisTask> {
        let mut state = self.state.lock().await;
        state.heap.pop().map(|Reverse(queued)| queued.task)
    }

    /// Pop with a bounded wait. Returns None on timeout so the caller can
    /// re-check its shutdown signal.
    pub async fn pop_timeout(&self, wait: Duration) -> Option<AnalysisTask> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.notify.notified();

            if let Some(task) = self.try_pop().await {
                return Some(task);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            if timeout(remaining, notified).await.is_err() {
                // Timed out waiting; one last check in case of a late push
                return self.try_pop().await;
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.heap.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_priority_order() {
        let queue = TaskQueue::new();
        queue.push(AnalysisTask::new(1, 5)).await;
        queue.push(AnalysisTask::new(2, 1)).await;
        queue.push(AnalysisTask::new(3, 3)).await;

        assert_eq!(queue.try_pop().await.unwrap().candidate_id, 2);
        assert_eq!(queue.try_pop().await.unwrap().candidate_id, 3);
        assert_eq!(queue.try_pop().await.unwrap().candidate_id, 1);
        assert!(queue.try_pop().await.is_none());
    }

    #[tokio::test]
    async fn test_fifo_within_priority() {
        let queue = TaskQueue::new();
        for id in 1..=4 {
            queue.push(AnalysisTask::new(id, 2)).await;
        }
        for expected in 1..=4 {
            assert_eq!(queue.try_pop().await.unwrap().candidate_id, expected);
        }
    }

    #[tokio::test]
    async fn test_pop_timeout_returns_none_when_empty() {
        let queue = TaskQueue::new();
        let popped = queue.pop_timeout(Duration::from_millis(20)).await;
        assert!(popped.is_none());
    }

    #[tokio::test]
    async fn test_pop_timeout_wakes_on_push() {
        let queue = std::sync::Arc::new(TaskQueue::new());

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop_timeout(Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(AnalysisTask::new(42, 1)).await;

        let task = waiter.await.unwrap().unwrap();
        assert_eq!(task.candidate_id, 42);
    }
}
