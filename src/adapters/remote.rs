//! Remote model scoring strategy.
//!
//! Posts the transcript to an external scoring endpoint and parses the
//! response into the standard result shape. Every call carries an explicit
//! timeout; any failure surfaces as a `ScoringError` and the caller falls
//! back to the rule-based engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use super::{ScoringError, ScoringStrategy};
use crate::domain::result::{cap, METHOD_REMOTE};
use crate::domain::{AnalysisResult, CandidateRecord, TranscriptEntry};

/// Confidence reported for successful remote scoring
const REMOTE_CONFIDENCE: f64 = 0.95;

/// Remote scoring strategy over HTTP
pub struct RemoteScorer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    call_timeout: Duration,
}

/// Request payload sent to the scoring endpoint
#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    candidate_name: &'a str,
    position: &'a str,
    transcript: Vec<Exchange<'a>>,
}

#[derive(Debug, Serialize)]
struct Exchange<'a> {
    question: &'a str,
    answer: &'a str,
}

/// Response payload; all score keys are required
#[derive(Debug, Deserialize)]
struct ScoreResponse {
    technical_skills: f64,
    communication_skills: f64,
    problem_solving: f64,
    cultural_fit: f64,
    overall_score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    areas_for_improvement: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    feedback: Option<String>,
}

impl RemoteScorer {
    pub fn new(url: impl Into<String>, api_key: Option<String>, call_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
            call_timeout,
        }
    }

    async fn call(
        &self,
        candidate: &CandidateRecord,
        transcript: &[TranscriptEntry],
    ) -> Result<ScoreResponse, ScoringError> {
        let payload = ScoreRequest {
            candidate_name: &candidate.name,
            position: &candidate.job_title,
            transcript: transcript
                .iter()
                .map(|e| Exchange {
                    question: &e.question,
                    answer: &e.answer,
                })
                .collect(),
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ScoringError::MalformedResponse(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        response
            .json::<ScoreResponse>()
            .await
            .map_err(|e| ScoringError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ScoringStrategy for RemoteScorer {
    fn name(&self) -> &str {
        "remote_model"
    }

    async fn score(
        &self,
        candidate: &CandidateRecord,
        transcript: &[TranscriptEntry],
    ) -> Result<AnalysisResult, ScoringError> {
        let response = timeout(self.call_timeout, self.call(candidate, transcript))
            .await
            .map_err(|_| ScoringError::Timeout(self.call_timeout))??;

        Ok(AnalysisResult {
            technical_score: response.technical_skills,
            communication_score: response.communication_skills,
            problem_solving_score: response.problem_solving,
            cultural_fit_score: response.cultural_fit,
            overall_score: response.overall_score,
            strengths: cap(response.strengths),
            weaknesses: cap(response.areas_for_improvement),
            recommendations: cap(response.recommendations),
            feedback: response
                .feedback
                .unwrap_or_else(|| "No detailed feedback provided".to_string()),
            confidence: REMOTE_CONFIDENCE,
            method: METHOD_REMOTE.to_string(),
        }
        .clamped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing_rejects_missing_scores() {
        let incomplete = r#"{"technical_skills": 70.0, "communication_skills": 60.0}"#;
        assert!(serde_json::from_str::<ScoreResponse>(incomplete).is_err());
    }

    #[test]
    fn test_response_parsing_defaults_lists() {
        let minimal = r#"{
            "technical_skills": 70.0,
            "communication_skills": 60.0,
            "problem_solving": 65.0,
            "cultural_fit": 72.0,
            "overall_score": 66.9
        }"#;
        let parsed: ScoreResponse = serde_json::from_str(minimal).unwrap();
        assert!(parsed.strengths.is_empty());
        assert!(parsed.feedback.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error_value() {
        let scorer = RemoteScorer::new(
            "http://127.0.0.1:1/score",
            None,
            Duration::from_millis(200),
        );
        let candidate = CandidateRecord::new(1, "Dana Reyes", "Backend Engineer");
        let result = scorer.score(&candidate, &[]).await;
        assert!(result.is_err());
    }
}
