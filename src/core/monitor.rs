//! Recovery monitor.
//!
//! A single periodic loop with independent passes per cycle: sweep
//! in-progress interviews through the completion detector, enqueue
//! newly-completed candidates, requeue stale processing rows, and schedule
//! backoff-delayed retries for failed tasks. A failing pass is logged and
//! never stops the loop or the other passes.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MonitorConfig;
use crate::core::completion::CompletionDetector;
use crate::core::queue::TaskQueue;
use crate::core::state::PipelineState;
use crate::domain::task::{PRIORITY_FRESH, PRIORITY_NORMAL, PRIORITY_RECENT, PRIORITY_RETRY};
use crate::domain::{AnalysisTask, CandidateRecord};
use crate::store::CandidateStore;

/// Periodic producer feeding the task queue
pub struct RecoveryMonitor {
    config: MonitorConfig,
    store: Arc<CandidateStore>,
    queue: Arc<TaskQueue>,
    state: Arc<PipelineState>,
    detector: CompletionDetector,
}

impl RecoveryMonitor {
    pub fn new(
        config: MonitorConfig,
        store: Arc<CandidateStore>,
        queue: Arc<TaskQueue>,
        state: Arc<PipelineState>,
        detector: CompletionDetector,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            state,
            detector,
        }
    }

    /// Run until shutdown. Each tick executes every pass even if an
    /// earlier one fails.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        debug!(interval = ?self.config.interval, "Recovery monitor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Recovery monitor stopped");
    }

    /// One monitor cycle; also callable directly from tests
    pub async fn run_cycle(&self) {
        if let Err(e) = self.sweep_completions().await {
            error!(error = %e, "Completion sweep failed");
        }
        if let Err(e) = self.scan_pending().await {
            error!(error = %e, "Pending scan failed");
        }
        if let Err(e) = self.scan_stale().await {
            error!(error = %e, "Stale scan failed");
        }
        if let Err(e) = self.scan_retries().await {
            error!(error = %e, "Retry scan failed");
        }
    }

    /// Run the completion detector over interviews that show activity but
    /// no completion stamp, so abandoned sessions still finish.
    #[instrument(skip(self))]
    async fn sweep_completions(&self) -> Result<()> {
        let now = Utc::now();
        for candidate_id in self.store.fetch_in_progress().await? {
            self.detector.evaluate(&self.store, candidate_id, now).await?;
        }
        Ok(())
    }

    /// Enqueue newly-completed candidates, gated by the idempotency flag
    #[instrument(skip(self))]
    async fn scan_pending(&self) -> Result<()> {
        let candidates = self.store.fetch_pending(self.config.batch_size).await?;
        for candidate in candidates {
            if self.state.is_completed(candidate.id) {
                continue;
            }
            // Flag flip happens-before the push; losers skip
            if !self.store.try_claim_for_enqueue(candidate.id).await? {
                continue;
            }

            let priority = self.recency_priority(&candidate);
            self.queue
                .push(AnalysisTask::new(candidate.id, priority))
                .await;
            info!(
                candidate_id = candidate.id,
                name = %candidate.name,
                priority,
                "Queued analysis"
            );
        }
        Ok(())
    }

    /// Reset processing rows that outlived the staleness threshold
    #[instrument(skip(self))]
    async fn scan_stale(&self) -> Result<()> {
        let threshold = ChronoDuration::from_std(self.config.stale_threshold)
            .unwrap_or_else(|_| ChronoDuration::seconds(3600));
        let stale = self.store.fetch_stale(threshold, Utc::now()).await?;
        for candidate_id in stale {
            warn!(candidate_id, "Stale analysis; resetting for retry");
            self.store.reset_for_retry(candidate_id).await?;
        }
        Ok(())
    }

    /// Re-enqueue failed tasks whose retry delay has elapsed
    #[instrument(skip(self))]
    async fn scan_retries(&self) -> Result<()> {
        let due = self.state.take_due_retries(
            Utc::now(),
            self.config.retry_delay,
            self.config.max_retries,
        );
        for (candidate_id, retry_count) in due {
            info!(candidate_id, retry_count, "Retrying analysis");
            self.queue
                .push(AnalysisTask::new(candidate_id, PRIORITY_RETRY).with_retry_count(retry_count))
                .await;
        }
        Ok(())
    }

    /// More recent completions are more urgent. The cutoffs are tunable
    /// configuration, not business rules.
    fn recency_priority(&self, candidate: &CandidateRecord) -> u8 {
        let Some(completed_at) = candidate.completed_at else {
            return PRIORITY_NORMAL;
        };
        let age_hours = (Utc::now() - completed_at).num_hours();
        if age_hours < self.config.fresh_cutoff_hours {
            PRIORITY_FRESH
        } else if age_hours < self.config.recent_cutoff_hours {
            PRIORITY_RECENT
        } else {
            PRIORITY_NORMAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompletionConfig, ServiceConfig};
    use crate::domain::AnalysisStatus;

    async fn fixture() -> (RecoveryMonitor, Arc<CandidateStore>, Arc<TaskQueue>) {
        let config = ServiceConfig::default();
        let store = Arc::new(CandidateStore::open_in_memory().unwrap());
        let queue = Arc::new(TaskQueue::new());
        let state = Arc::new(PipelineState::new());
        let monitor = RecoveryMonitor::new(
            config.monitor.clone(),
            store.clone(),
            queue.clone(),
            state,
            CompletionDetector::new(CompletionConfig::default()),
        );
        (monitor, store, queue)
    }

    async fn seed_completed(store: &CandidateStore, id: i64, hours_ago: i64) {
        store
            .insert(&CandidateRecord::new(id, "Dana Reyes", "Backend Engineer"))
            .await
            .unwrap();
        store
            .mark_completed(id, Utc::now() - ChronoDuration::hours(hours_ago))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pending_scan_enqueues_once() {
        let (monitor, store, queue) = fixture().await;
        seed_completed(&store, 1, 0).await;

        monitor.run_cycle().await;
        assert_eq!(queue.len().await, 1);

        // Second cycle: flag already set, nothing new
        monitor.run_cycle().await;
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_recency_priority_bands() {
        let (monitor, store, queue) = fixture().await;
        seed_completed(&store, 1, 12).await;
        seed_completed(&store, 2, 0).await;
        seed_completed(&store, 3, 3).await;

        monitor.run_cycle().await;
        assert_eq!(queue.len().await, 3);

        // Dequeue order follows the recency bands: fresh, recent, old
        assert_eq!(queue.try_pop().await.unwrap().candidate_id, 2);
        assert_eq!(queue.try_pop().await.unwrap().candidate_id, 3);
        assert_eq!(queue.try_pop().await.unwrap().candidate_id, 1);
    }

    #[tokio::test]
    async fn test_stale_reset_flows_back_through_pending() {
        let (monitor, store, queue) = fixture().await;
        seed_completed(&store, 1, 3).await;
        store.try_claim_for_enqueue(1).await.unwrap();
        store
            .claim_for_processing(1, Utc::now() - ChronoDuration::hours(2))
            .await
            .unwrap();

        monitor.run_cycle().await;

        // Stale row was reset and the pending scan picked it up again in a
        // later cycle
        monitor.run_cycle().await;
        assert_eq!(queue.len().await, 1);
        let record = store.fetch_required(1).await.unwrap();
        assert!(record.auto_score_triggered);
        assert_eq!(record.analysis_status, Some(AnalysisStatus::Retry));
    }
}
