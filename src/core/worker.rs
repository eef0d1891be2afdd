//! Analysis workers.
//!
//! A fixed set of tasks dequeue with a bounded wait, claim the candidate
//! row, run the validation gate and a scoring strategy, and hand the result
//! to the publisher. Errors are recorded and logged; nothing propagates out
//! of a worker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::adapters::ScoringStrategy;
use crate::analysis::{RuleBasedScorer, ValidationGate, ValidationOutcome};
use crate::config::ServiceConfig;
use crate::core::publisher::ResultPublisher;
use crate::core::queue::TaskQueue;
use crate::core::state::PipelineState;
use crate::domain::{AnalysisResult, AnalysisTask, AnalysisStatus, Verdict};
use crate::store::CandidateStore;

/// Everything one worker needs, shared across the pool
pub struct WorkerContext {
    pub store: Arc<CandidateStore>,
    pub queue: Arc<TaskQueue>,
    pub state: Arc<PipelineState>,
    pub publisher: Arc<ResultPublisher>,
    pub gate: ValidationGate,
    pub scorer: RuleBasedScorer,
    pub remote: Option<Arc<dyn ScoringStrategy>>,
    pub dequeue_timeout: Duration,
    pub max_retries: u32,
    pub active_workers: Arc<AtomicUsize>,
}

impl WorkerContext {
    pub fn new(
        config: &ServiceConfig,
        store: Arc<CandidateStore>,
        queue: Arc<TaskQueue>,
        state: Arc<PipelineState>,
        publisher: Arc<ResultPublisher>,
        remote: Option<Arc<dyn ScoringStrategy>>,
    ) -> Self {
        Self {
            store,
            queue,
            state,
            publisher,
            gate: ValidationGate::new(config.validation.clone()),
            scorer: RuleBasedScorer::new(),
            remote,
            dequeue_timeout: config.dequeue_timeout,
            max_retries: config.monitor.max_retries,
            active_workers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Worker loop: runs until the shutdown signal flips, finishing any task
/// already in flight.
pub async fn run_worker(
    worker_id: usize,
    ctx: Arc<WorkerContext>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(worker_id, "Analysis worker started");

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let Some(task) = ctx.queue.pop_timeout(ctx.dequeue_timeout).await else {
            continue;
        };

        ctx.active_workers.fetch_add(1, Ordering::SeqCst);
        let candidate_id = task.candidate_id;
        if let Err(e) = process_task(&ctx, &task).await {
            error!(candidate_id, error = %e, "Analysis failed");
            record_failure(&ctx, &task, &e).await;
        }
        ctx.active_workers.fetch_sub(1, Ordering::SeqCst);
    }

    debug!(worker_id, "Analysis worker stopped");
}

/// Process one task end to end. Validation rejection is a classified
/// outcome handled inline, not an error.
async fn process_task(ctx: &WorkerContext, task: &AnalysisTask) -> Result<()> {
    let candidate_id = task.candidate_id;
    info!(candidate_id, retry_count = task.retry_count, "Processing analysis");

    // Row-level exclusivity: losing the conditional claim means another
    // worker owns the candidate or the analysis is already terminal
    if !ctx.store.claim_for_processing(candidate_id, Utc::now()).await? {
        debug!(candidate_id, "Claim lost; skipping");
        return Ok(());
    }

    let candidate = ctx
        .store
        .fetch_required(candidate_id)
        .await
        .context("Loading candidate for analysis")?;
    let transcript = ctx
        .store
        .fetch_transcript(candidate_id)
        .await
        .context("Loading transcript for analysis")?;

    let result = match ctx.gate.validate(&transcript) {
        ValidationOutcome::Invalid { reason, issues } => {
            warn!(candidate_id, %reason, "Interview rejected by validation gate");
            ctx.gate.invalid_result(&reason, &issues, &transcript)
        }
        ValidationOutcome::Valid { valid_answers, total_questions } => {
            debug!(candidate_id, valid_answers, total_questions, "Transcript validated");
            score(ctx, &candidate, &transcript).await
        }
    };

    ctx.publisher
        .publish(candidate_id, &result)
        .await
        .context("Publishing analysis result")?;
    ctx.state.record_completed(candidate_id);

    info!(
        candidate_id,
        overall = result.overall_score,
        method = %result.method,
        "Analysis completed"
    );
    Ok(())
}

/// Run the configured strategy. Remote errors fall back to the rule-based
/// engine in an explicit branch; they never fail the task.
async fn score(
    ctx: &WorkerContext,
    candidate: &crate::domain::CandidateRecord,
    transcript: &[crate::domain::TranscriptEntry],
) -> AnalysisResult {
    if let Some(remote) = &ctx.remote {
        match remote.score(candidate, transcript).await {
            Ok(result) => return result,
            Err(e) => {
                warn!(
                    candidate_id = candidate.id,
                    strategy = remote.name(),
                    error = %e,
                    "Remote scoring failed, using rule-based engine"
                );
            }
        }
    }
    ctx.scorer.analyze(candidate, transcript)
}

/// Record a task failure: store status, in-memory failure table, and the
/// manual-review verdict once retries are exhausted.
async fn record_failure(ctx: &WorkerContext, task: &AnalysisTask, error: &anyhow::Error) {
    let candidate_id = task.candidate_id;

    if task.retry_count >= ctx.max_retries {
        warn!(
            candidate_id,
            retry_count = task.retry_count,
            "Retries exhausted; flagging for manual review"
        );
        if let Err(e) = ctx
            .store
            .save_status_fallback(candidate_id, AnalysisStatus::Failed, Verdict::Review, Utc::now())
            .await
        {
            error!(candidate_id, error = %e, "Failed to flag exhausted task");
        }
    } else if let Err(e) = ctx.store.mark_failed(candidate_id).await {
        error!(candidate_id, error = %e, "Failed to mark candidate failed");
    }

    ctx.state
        .record_failure(candidate_id, task.retry_count, error.to_string());
}
