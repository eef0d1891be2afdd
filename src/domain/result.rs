//! Analysis results produced by a scoring strategy.

use serde::{Deserialize, Serialize};

/// Method tag for gate-rejected interviews
pub const METHOD_INVALID: &str = "invalid_interview";

/// Method tag for the deterministic rule-based engine
pub const METHOD_RULE_BASED: &str = "rule_based_v2";

/// Method tag for the remote model strategy
pub const METHOD_REMOTE: &str = "remote_model";

/// Value object holding one candidate's scores and insights.
///
/// Never persisted independently of the candidate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub technical_score: f64,
    pub communication_score: f64,
    pub problem_solving_score: f64,
    pub cultural_fit_score: f64,
    pub overall_score: f64,

    /// Capped at 3 entries each
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,

    pub feedback: String,

    pub confidence: f64,

    /// Which strategy produced this result
    pub method: String,
}

impl AnalysisResult {
    /// Zero-scored result for a gate-rejected interview
    pub fn invalid(weaknesses: Vec<String>, feedback: String) -> Self {
        Self {
            technical_score: 0.0,
            communication_score: 0.0,
            problem_solving_score: 0.0,
            cultural_fit_score: 0.0,
            overall_score: 0.0,
            strengths: Vec::new(),
            weaknesses: cap(weaknesses),
            recommendations: vec![
                "Schedule a new interview session".to_string(),
                "Ensure candidate provides complete responses".to_string(),
                "Verify interview system is working correctly".to_string(),
            ],
            feedback,
            confidence: 0.0,
            method: METHOD_INVALID.to_string(),
        }
    }

    /// True when the validation gate rejected the transcript
    pub fn is_invalid(&self) -> bool {
        self.method == METHOD_INVALID
    }

    /// Clamp all scores into [0, 100]. Remote strategies must uphold the
    /// same bounds as the rule-based engine.
    pub fn clamped(mut self) -> Self {
        for score in [
            &mut self.technical_score,
            &mut self.communication_score,
            &mut self.problem_solving_score,
            &mut self.cultural_fit_score,
            &mut self.overall_score,
        ] {
            *score = score.clamp(0.0, 100.0);
        }
        self
    }
}

/// Insight lists never exceed three entries
pub(crate) fn cap(mut items: Vec<String>) -> Vec<String> {
    items.truncate(3);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_result_is_zeroed() {
        let result = AnalysisResult::invalid(vec!["no answers".to_string()], "n/a".to_string());
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.technical_score, 0.0);
        assert!(result.is_invalid());
        assert!(result.strengths.is_empty());
        assert_eq!(result.recommendations.len(), 3);
    }

    #[test]
    fn test_clamped_bounds() {
        let result = AnalysisResult {
            technical_score: 140.0,
            communication_score: -3.0,
            problem_solving_score: 55.5,
            cultural_fit_score: 100.1,
            overall_score: 101.0,
            strengths: vec![],
            weaknesses: vec![],
            recommendations: vec![],
            feedback: String::new(),
            confidence: 0.5,
            method: METHOD_REMOTE.to_string(),
        }
        .clamped();

        assert_eq!(result.technical_score, 100.0);
        assert_eq!(result.communication_score, 0.0);
        assert_eq!(result.problem_solving_score, 55.5);
        assert_eq!(result.cultural_fit_score, 100.0);
        assert_eq!(result.overall_score, 100.0);
    }

    #[test]
    fn test_cap_truncates() {
        let items = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert_eq!(cap(items).len(), 3);
    }
}
