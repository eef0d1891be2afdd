//! Candidate interview records and lifecycle state.
//!
//! The candidate record is owned by the external store; this subsystem only
//! mutates the interview-analysis fields. The transcript is append-only
//! during the interview and read-only here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a candidate's interview analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Interview finished, waiting for a worker
    Pending,

    /// A worker has claimed the candidate
    Processing,

    /// Scored and persisted
    Completed,

    /// Analysis raised an error (may be retried)
    Failed,

    /// Transcript rejected by the validation gate
    Invalid,

    /// Reset by the recovery monitor after going stale
    Retry,
}

impl AnalysisStatus {
    /// Stable string form used in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Invalid => "invalid",
            Self::Retry => "retry",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "invalid" => Some(Self::Invalid),
            "retry" => Some(Self::Retry),
            _ => None,
        }
    }

    /// True for states that end the analysis lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Invalid)
    }
}

/// Human-facing classification derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Overall score >= 70
    Passed,

    /// Overall score in [50, 70)
    Review,

    /// Overall score < 50
    Failed,

    /// Validation gate rejected the transcript; reschedule required
    Invalid,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Review => "review",
            Self::Failed => "failed",
            Self::Invalid => "invalid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(Self::Passed),
            "review" => Some(Self::Review),
            "failed" => Some(Self::Failed),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Classify an overall score. Invalid interviews never reach this path.
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 70.0 {
            Self::Passed
        } else if overall >= 50.0 {
            Self::Review
        } else {
            Self::Failed
        }
    }

    /// Text shown in reports and status output
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Passed => "Interview Passed - Recommended",
            Self::Review => "Interview Review Required",
            Self::Failed => "Interview Failed",
            Self::Invalid => "Interview Invalid - Reschedule Required",
        }
    }
}

/// Explicit signals from the live session handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewSignal {
    /// The session started
    Started,

    /// The capture layer declared the session finished
    Completed,
}

/// One question/answer exchange in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: String,

    pub answer: String,

    /// When the question was asked
    pub asked_at: Option<DateTime<Utc>>,
}

impl TranscriptEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: None,
        }
    }
}

/// A candidate's interview lifecycle fields as read from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Stable unique identifier
    pub id: i64,

    pub name: String,

    pub job_title: String,

    /// When the interview session started
    pub started_at: Option<DateTime<Utc>>,

    /// Null means "not yet finished"
    pub completed_at: Option<DateTime<Utc>>,

    /// Last transcript activity
    pub last_activity_at: Option<DateTime<Utc>>,

    pub total_questions: u32,

    pub answered_questions: u32,

    /// Denormalized answered/total percentage
    pub progress_percent: f64,

    /// Explicit completion signal recorded by the session handler
    pub completion_signal: bool,

    /// Non-null `completed_at` is a precondition for any state past Pending
    pub analysis_status: Option<AnalysisStatus>,

    /// Prevents duplicate enqueue while a task is outstanding
    pub auto_score_triggered: bool,

    pub analysis_started_at: Option<DateTime<Utc>>,

    pub analysis_completed_at: Option<DateTime<Utc>>,

    /// Interview duration, stamped at completion (0 if start was never seen)
    pub interview_duration_secs: Option<i64>,

    pub overall_score: Option<f64>,

    pub technical_score: Option<f64>,

    pub communication_score: Option<f64>,

    pub problem_solving_score: Option<f64>,

    pub cultural_fit_score: Option<f64>,

    pub confidence: Option<f64>,

    pub scoring_method: Option<String>,

    pub feedback: Option<String>,

    pub final_verdict: Option<Verdict>,
}

impl CandidateRecord {
    /// A fresh record with no interview activity
    pub fn new(id: i64, name: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            job_title: job_title.into(),
            started_at: None,
            completed_at: None,
            last_activity_at: None,
            total_questions: 0,
            answered_questions: 0,
            progress_percent: 0.0,
            completion_signal: false,
            analysis_status: None,
            auto_score_triggered: false,
            analysis_started_at: None,
            analysis_completed_at: None,
            interview_duration_secs: None,
            overall_score: None,
            technical_score: None,
            communication_score: None,
            problem_solving_score: None,
            cultural_fit_score: None,
            confidence: None,
            scoring_method: None,
            feedback: None,
            final_verdict: None,
        }
    }

    /// True once the interview is finished and eligible for analysis
    pub fn is_interview_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}
