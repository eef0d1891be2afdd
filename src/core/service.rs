//! Analysis service facade.
//!
//! One service instance owns the queue, the shared pipeline state, the
//! publisher and the background tasks. Collaborators reach the pipeline
//! only through the operations here; there are no process-wide singletons.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::{RemoteScorer, ScoringStrategy};
use crate::config::ServiceConfig;
use crate::core::completion::CompletionDetector;
use crate::core::monitor::RecoveryMonitor;
use crate::core::publisher::{AnalysisUpdate, ResultPublisher};
use crate::core::queue::TaskQueue;
use crate::core::state::PipelineState;
use crate::core::worker::{run_worker, WorkerContext};
use crate::domain::task::PRIORITY_URGENT;
use crate::domain::{AnalysisTask, InterviewSignal};
use crate::store::CandidateStore;

/// Health/ops snapshot exposed to collaborators
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub is_running: bool,
    pub queue_size: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub active_workers: usize,
}

/// The interview-analysis pipeline service
pub struct AnalysisService {
    config: ServiceConfig,
    store: Arc<CandidateStore>,
    queue: Arc<TaskQueue>,
    state: Arc<PipelineState>,
    publisher: Arc<ResultPublisher>,
    detector: CompletionDetector,
    worker_ctx: Arc<WorkerContext>,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    running: AtomicBool,
}

impl AnalysisService {
    /// Build a service over an opened store
    pub fn new(config: ServiceConfig, store: Arc<CandidateStore>) -> Self {
        let queue = Arc::new(TaskQueue::new());
        let state = Arc::new(PipelineState::new());
        let publisher = Arc::new(ResultPublisher::new(store.clone()));
        let detector = CompletionDetector::new(config.completion.clone());

        let remote: Option<Arc<dyn ScoringStrategy>> =
            config.scoring.remote_url.as_ref().map(|url| {
                Arc::new(RemoteScorer::new(
                    url.clone(),
                    config.scoring.remote_api_key.clone(),
                    config.scoring.timeout,
                )) as Arc<dyn ScoringStrategy>
            });

        let worker_ctx = Arc::new(WorkerContext::new(
            &config,
            store.clone(),
            queue.clone(),
            state.clone(),
            publisher.clone(),
            remote,
        ));

        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            store,
            queue,
            state,
            publisher,
            detector,
            worker_ctx,
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Spawn the recovery monitor and the worker pool
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Analysis service already running");
            return;
        }

        let mut handles = self.handles.lock().await;

        let monitor = RecoveryMonitor::new(
            self.config.monitor.clone(),
            self.store.clone(),
            self.queue.clone(),
            self.state.clone(),
            self.detector.clone(),
        );
        handles.push(tokio::spawn(monitor.run(self.shutdown_tx.subscribe())));

        for worker_id in 0..self.config.workers {
            let ctx = self.worker_ctx.clone();
            let shutdown = self.shutdown_tx.subscribe();
            handles.push(tokio::spawn(run_worker(worker_id, ctx, shutdown)));
        }

        info!(workers = self.config.workers, "Analysis service started");
    }

    /// Cooperative stop: no new scheduling, workers finish their current
    /// task, then everything joins.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping analysis service");

        let _ = self.shutdown_tx.send(true);
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        // Reset so the service can be started again
        let _ = self.shutdown_tx.send(false);

        info!("Analysis service stopped");
    }

    /// Explicit start/completion signal from the live session handler.
    /// A completion signal runs the detector immediately rather than
    /// waiting for the next monitor sweep.
    pub async fn notify_interview_signal(
        &self,
        candidate_id: i64,
        signal: InterviewSignal,
    ) -> Result<()> {
        self.store
            .record_signal(candidate_id, signal, Utc::now())
            .await?;
        if signal == InterviewSignal::Completed {
            self.detector
                .evaluate(&self.store, candidate_id, Utc::now())
                .await?;
        }
        Ok(())
    }

    /// Manual/forced re-analysis entry point. Resets the candidate to
    /// pending, clears the idempotency flag and enqueues at top priority.
    /// Returns false for unknown candidates.
    pub async fn enqueue_analysis(&self, candidate_id: i64) -> Result<bool> {
        if self.store.fetch(candidate_id).await?.is_none() {
            return Ok(false);
        }

        self.store.reset_for_reanalysis(candidate_id).await?;
        self.state.forget(candidate_id);

        if !self.store.try_claim_for_enqueue(candidate_id).await? {
            // Lost to a concurrent enqueue; that task will do the work
            return Ok(true);
        }
        self.queue
            .push(AnalysisTask::new(candidate_id, PRIORITY_URGENT))
            .await;
        info!(candidate_id, "Manually queued analysis");
        Ok(true)
    }

    /// Read the short-lived notification for a candidate. Absence means
    /// "no update since last poll", not "no analysis".
    pub fn poll_update(&self, candidate_id: i64) -> Option<AnalysisUpdate> {
        self.publisher.poll_update(candidate_id)
    }

    pub async fn stats(&self) -> ServiceStats {
        ServiceStats {
            is_running: self.running.load(Ordering::SeqCst),
            queue_size: self.queue.len().await,
            completed_count: self.state.completed_count(),
            failed_count: self.state.failed_count(),
            active_workers: self
                .worker_ctx
                .active_workers
                .load(Ordering::SeqCst),
        }
    }

    pub fn store(&self) -> &Arc<CandidateStore> {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CandidateRecord;

    async fn service() -> AnalysisService {
        let store = Arc::new(CandidateStore::open_in_memory().unwrap());
        store
            .insert(&CandidateRecord::new(1, "Dana Reyes", "Backend Engineer"))
            .await
            .unwrap();
        AnalysisService::new(ServiceConfig::default(), store)
    }

    #[tokio::test]
    async fn test_stats_when_idle() {
        let service = service().await;
        let stats = service.stats().await;
        assert!(!stats.is_running);
        assert_eq!(stats.queue_size, 0);
        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.active_workers, 0);
    }

    #[tokio::test]
    async fn test_enqueue_analysis_unknown_candidate() {
        let service = service().await;
        assert!(!service.enqueue_analysis(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_enqueue_analysis_resets_and_queues() {
        let service = service().await;
        assert!(service.enqueue_analysis(1).await.unwrap());

        let stats = service.stats().await;
        assert_eq!(stats.queue_size, 1);

        let record = service.store().fetch_required(1).await.unwrap();
        assert!(record.auto_score_triggered);
        assert_eq!(
            record.analysis_status,
            Some(crate::domain::AnalysisStatus::Pending)
        );
    }

    #[tokio::test]
    async fn test_completion_signal_marks_record() {
        let service = service().await;
        service
            .notify_interview_signal(1, InterviewSignal::Started)
            .await
            .unwrap();
        service
            .notify_interview_signal(1, InterviewSignal::Completed)
            .await
            .unwrap();

        let record = service.store().fetch_required(1).await.unwrap();
        assert!(record.completed_at.is_some());
        assert!(record.started_at.is_some());
    }
}
