//! Scoring strategy interfaces.
//!
//! Strategies produce the same result shape under the same clamping
//! guarantees as the rule-based engine. A strategy error is an explicit
//! value, never control flow: the worker falls back to the rule-based
//! engine in an ordinary branch.

pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the remote strategy
pub use remote::RemoteScorer;

use crate::domain::{AnalysisResult, CandidateRecord, TranscriptEntry};

/// Errors from a scoring strategy
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Scoring call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed scoring response: {0}")]
    MalformedResponse(String),

    #[error("Strategy not configured: {0}")]
    NotConfigured(&'static str),
}

/// Trait for pluggable scoring strategies
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    /// Human-readable strategy name
    fn name(&self) -> &str;

    /// Score one candidate's validated transcript
    async fn score(
        &self,
        candidate: &CandidateRecord,
        transcript: &[TranscriptEntry],
    ) -> Result<AnalysisResult, ScoringError>;
}
