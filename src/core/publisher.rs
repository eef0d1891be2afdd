//! Result publishing: transactional persistence plus polling notifications.
//!
//! The write path is two-tier behind one contract: a full transactional
//! save retried a fixed number of times, then a degraded write of only the
//! status columns so a scored candidate can never stay stuck in
//! `processing`. Polling clients read a short-lived notification keyed by
//! candidate id.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::{AnalysisResult, AnalysisStatus, Verdict};
use crate::store::CandidateStore;

/// Notification TTL for polling clients
const UPDATE_TTL: Duration = Duration::from_secs(300);

/// Attempts for the transactional write before degrading
const SAVE_ATTEMPTS: u32 = 3;

/// Pause between save attempts
const SAVE_RETRY_PAUSE: Duration = Duration::from_millis(500);

/// Scores pushed to polling clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScores {
    pub overall: f64,
    pub technical: f64,
    pub communication: f64,
    pub problem_solving: f64,
    pub cultural_fit: f64,
}

/// Short-lived notification written after a successful persist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisUpdate {
    pub candidate_id: i64,
    pub scores: UpdateScores,
    pub verdict: Verdict,
    pub recommendation: Option<String>,
    pub method: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

/// Persists verdicts and feeds the notification cache
pub struct ResultPublisher {
    store: Arc<CandidateStore>,
    updates: Cache<i64, AnalysisUpdate>,
}

impl ResultPublisher {
    pub fn new(store: Arc<CandidateStore>) -> Self {
        Self {
            store,
            updates: Cache::builder().time_to_live(UPDATE_TTL).build(),
        }
    }

    /// Derive the terminal status and verdict for a result
    fn classify(result: &AnalysisResult) -> (AnalysisStatus, Verdict) {
        if result.is_invalid() {
            (AnalysisStatus::Invalid, Verdict::Invalid)
        } else {
            (
                AnalysisStatus::Completed,
                Verdict::from_overall(result.overall_score),
            )
        }
    }

    /// Persist a result and, on success, publish the notification.
    ///
    /// Falls back to the minimal status write after exhausting the
    /// transactional retries; the fallback path skips the notification
    /// since the scores were not durably written.
    pub async fn publish(&self, candidate_id: i64, result: &AnalysisResult) -> Result<()> {
        let (status, verdict) = Self::classify(result);

        let mut last_error = None;
        for attempt in 1..=SAVE_ATTEMPTS {
            match self
                .store
                .save_result(candidate_id, result, status, verdict, Utc::now())
                .await
            {
                Ok(()) => {
                    info!(
                        candidate_id,
                        overall = result.overall_score,
                        verdict = verdict.as_str(),
                        method = %result.method,
                        "Analysis result persisted"
                    );
                    self.push_update(candidate_id, result, verdict);
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        candidate_id,
                        attempt,
                        error = %e,
                        "Result save failed"
                    );
                    last_error = Some(e);
                    tokio::time::sleep(SAVE_RETRY_PAUSE).await;
                }
            }
        }

        // Degraded write: status and verdict only, so the candidate is
        // never left with completed_at set but status stuck in processing
        error!(
            candidate_id,
            error = %last_error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            "Transactional save exhausted; writing minimal status"
        );
        self.store
            .save_status_fallback(candidate_id, status, verdict, Utc::now())
            .await?;
        Ok(())
    }

    fn push_update(&self, candidate_id: i64, result: &AnalysisResult, verdict: Verdict) {
        self.updates.insert(
            candidate_id,
            AnalysisUpdate {
                candidate_id,
                scores: UpdateScores {
                    overall: result.overall_score,
                    technical: result.technical_score,
                    communication: result.communication_score,
                    problem_solving: result.problem_solving_score,
                    cultural_fit: result.cultural_fit_score,
                },
                verdict,
                recommendation: result.recommendations.first().cloned(),
                method: result.method.clone(),
                published_at: Utc::now(),
            },
        );
    }

    /// Read the notification for a candidate, if one is still live.
    /// Absence means "no update since last poll", not "no analysis".
    pub fn poll_update(&self, candidate_id: i64) -> Option<AnalysisUpdate> {
        self.updates.get(&candidate_id)
    }
}
