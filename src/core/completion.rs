//! Completion detection for in-progress interviews.
//!
//! The single authoritative definition of "the interview is finished".
//! Rules are evaluated in priority order and the first satisfied rule wins;
//! callers must not re-derive completion from progress fields themselves.

use chrono::{DateTime, Duration, Utc};

use crate::config::CompletionConfig;
use crate::domain::CandidateRecord;
use crate::store::{CandidateStore, StoreError};

/// Which rule declared the interview finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// Explicit completion signal from the capture layer
    ExplicitSignal,

    /// Denormalized progress reached 100%
    ProgressComplete,

    /// Every asked question has an answer
    AllAnswered,

    /// Absolute answer-count floor reached, independent of total
    AnswerFloor,

    /// Session exceeded the hard duration cap
    TimeCap,

    /// No activity within the inactivity window with enough answers given
    Inactivity,
}

impl CompletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitSignal => "explicit_signal",
            Self::ProgressComplete => "progress_complete",
            Self::AllAnswered => "all_answered",
            Self::AnswerFloor => "answer_floor",
            Self::TimeCap => "time_cap",
            Self::Inactivity => "inactivity",
        }
    }
}

/// Ordered-rule completion detector
#[derive(Debug, Clone)]
pub struct CompletionDetector {
    config: CompletionConfig,
}

impl CompletionDetector {
    pub fn new(config: CompletionConfig) -> Self {
        Self { config }
    }

    /// Evaluate the rule list against a record. Returns None both when no
    /// rule fires and when the interview is already marked complete.
    pub fn check(&self, record: &CandidateRecord, now: DateTime<Utc>) -> Option<CompletionReason> {
        if record.completed_at.is_some() {
            return None;
        }

        if record.completion_signal {
            return Some(CompletionReason::ExplicitSignal);
        }
        if record.progress_percent >= 100.0 {
            return Some(CompletionReason::ProgressComplete);
        }
        if record.total_questions > 0 && record.answered_questions >= record.total_questions {
            return Some(CompletionReason::AllAnswered);
        }
        if record.answered_questions >= self.config.answer_floor {
            return Some(CompletionReason::AnswerFloor);
        }
        if let Some(started_at) = record.started_at {
            if now - started_at > Duration::from_std(self.config.max_duration).unwrap_or_default()
            {
                return Some(CompletionReason::TimeCap);
            }
        }
        if let Some(last_activity) = record.last_activity_at {
            let window =
                Duration::from_std(self.config.inactivity_window).unwrap_or_default();
            if now - last_activity > window
                && record.answered_questions >= self.config.inactivity_min_answers
            {
                return Some(CompletionReason::Inactivity);
            }
        }

        None
    }

    /// Run the detector against the stored record and mark it completed
    /// when a rule fires. Safe to call redundantly.
    pub async fn evaluate(
        &self,
        store: &CandidateStore,
        candidate_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<CompletionReason>, StoreError> {
        let record = store.fetch_required(candidate_id).await?;
        let Some(reason) = self.check(&record, now) else {
            return Ok(None);
        };

        // mark_completed is conditional on completed_at still being NULL,
        // so a concurrent evaluation cannot double-stamp
        if store.mark_completed(candidate_id, now).await? {
            tracing::info!(
                candidate_id,
                reason = reason.as_str(),
                "Interview marked complete"
            );
            Ok(Some(reason))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> CompletionDetector {
        CompletionDetector::new(CompletionConfig::default())
    }

    fn record() -> CandidateRecord {
        let mut r = CandidateRecord::new(1, "Dana Reyes", "Backend Engineer");
        r.started_at = Some(Utc::now());
        r.last_activity_at = Some(Utc::now());
        r
    }

    #[test]
    fn test_already_complete_is_noop() {
        let mut r = record();
        r.completed_at = Some(Utc::now());
        r.completion_signal = true;
        assert_eq!(detector().check(&r, Utc::now()), None);
    }

    #[test]
    fn test_explicit_signal_wins_over_progress() {
        let mut r = record();
        r.completion_signal = true;
        r.progress_percent = 100.0;
        assert_eq!(
            detector().check(&r, Utc::now()),
            Some(CompletionReason::ExplicitSignal)
        );
    }

    #[test]
    fn test_progress_complete() {
        let mut r = record();
        r.progress_percent = 100.0;
        assert_eq!(
            detector().check(&r, Utc::now()),
            Some(CompletionReason::ProgressComplete)
        );
    }

    #[test]
    fn test_all_answered_requires_some_questions() {
        let mut r = record();
        r.total_questions = 0;
        r.answered_questions = 0;
        assert_eq!(detector().check(&r, Utc::now()), None);

        r.total_questions = 8;
        r.answered_questions = 8;
        assert_eq!(
            detector().check(&r, Utc::now()),
            Some(CompletionReason::AllAnswered)
        );
    }

    #[test]
    fn test_answer_floor_independent_of_total() {
        let mut r = record();
        r.total_questions = 20;
        r.answered_questions = 10;
        assert_eq!(
            detector().check(&r, Utc::now()),
            Some(CompletionReason::AnswerFloor)
        );
    }

    #[test]
    fn test_time_cap() {
        let mut r = record();
        r.started_at = Some(Utc::now() - Duration::minutes(46));
        r.last_activity_at = Some(Utc::now());
        r.total_questions = 20;
        r.answered_questions = 2;
        assert_eq!(
            detector().check(&r, Utc::now()),
            Some(CompletionReason::TimeCap)
        );
    }

    #[test]
    fn test_inactivity_needs_minimum_answers() {
        let mut r = record();
        r.total_questions = 20;
        r.answered_questions = 4;
        r.last_activity_at = Some(Utc::now() - Duration::minutes(20));
        assert_eq!(detector().check(&r, Utc::now()), None);

        r.answered_questions = 5;
        assert_eq!(
            detector().check(&r, Utc::now()),
            Some(CompletionReason::Inactivity)
        );
    }

    #[tokio::test]
    async fn test_evaluate_marks_once() {
        let store = CandidateStore::open_in_memory().unwrap();
        let mut r = record();
        r.total_questions = 5;
        store.insert(&r).await.unwrap();
        store
            .record_signal(1, crate::domain::InterviewSignal::Completed, Utc::now())
            .await
            .unwrap();

        let d = detector();
        let first = d.evaluate(&store, 1, Utc::now()).await.unwrap();
        assert_eq!(first, Some(CompletionReason::ExplicitSignal));

        // Redundant call is a no-op
        let second = d.evaluate(&store, 1, Utc::now()).await.unwrap();
        assert_eq!(second, None);

        let stored = store.fetch_required(1).await.unwrap();
        assert!(stored.completed_at.is_some());
        assert_eq!(
            stored.analysis_status,
            Some(crate::domain::AnalysisStatus::Pending)
        );
    }
}
