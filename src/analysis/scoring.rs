//! Rule-based interview scoring.
//!
//! Deterministic by construction: identical transcript and candidate
//! metadata always yield identical sub-scores and overall score. This is
//! the default strategy; a remote model may replace it behind the same
//! `ScoringStrategy` contract, with this engine as the fallback.

use async_trait::async_trait;

use crate::adapters::{ScoringError, ScoringStrategy};
use crate::domain::result::METHOD_RULE_BASED;
use crate::domain::{AnalysisResult, CandidateRecord, TranscriptEntry};

/// Technical vocabulary matched against the concatenated answer text
const TECHNICAL_KEYWORDS: &[&str] = &[
    "implement",
    "develop",
    "design",
    "architecture",
    "algorithm",
    "database",
    "api",
    "framework",
    "optimize",
    "scale",
    "debug",
    "testing",
    "deployment",
    "version control",
    "git",
    "agile",
    "code",
    "programming",
    "software",
    "function",
    "class",
    "module",
    "performance",
    "security",
    "authentication",
    "integration",
];

/// Soft-skill vocabulary matched against the concatenated answer text
const SOFT_SKILL_KEYWORDS: &[&str] = &[
    "team",
    "collaborate",
    "communicate",
    "lead",
    "manage",
    "problem",
    "solution",
    "challenge",
    "learn",
    "adapt",
    "deadline",
    "priority",
    "stakeholder",
    "conflict",
    "feedback",
    "mentor",
    "present",
    "document",
    "plan",
    "organize",
];

/// Question-text markers for technical questions
const TECHNICAL_QUESTION_MARKERS: &[&str] = &["technical", "code", "implement", "design"];

/// Question-text markers for behavioral questions
const BEHAVIORAL_QUESTION_MARKERS: &[&str] = &["team", "challenge", "situation", "describe"];

/// Raw metrics computed from one transcript
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewMetrics {
    pub total_questions: usize,
    pub answered_questions: usize,
    /// answered/total as a percentage
    pub completion_rate: f64,
    pub avg_answer_length: f64,
    pub min_answer_length: usize,
    pub max_answer_length: usize,
    pub technical_keyword_count: usize,
    pub soft_keyword_count: usize,
    pub technical_questions_answered: usize,
    pub behavioral_questions_answered: usize,
    /// Mean per-answer quality score in [0, 100]
    pub answer_quality: f64,
}

impl InterviewMetrics {
    /// Compute all metrics from the transcript
    pub fn compute(transcript: &[TranscriptEntry]) -> Self {
        let total = transcript.len();
        let answered: Vec<&TranscriptEntry> = transcript
            .iter()
            .filter(|e| !e.answer.trim().is_empty())
            .collect();

        let lengths: Vec<usize> = answered.iter().map(|e| e.answer.len()).collect();
        let avg_answer_length = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
        };

        let all_answers = answered
            .iter()
            .map(|e| e.answer.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let technical_keyword_count = TECHNICAL_KEYWORDS
            .iter()
            .filter(|kw| all_answers.contains(**kw))
            .count();
        let soft_keyword_count = SOFT_SKILL_KEYWORDS
            .iter()
            .filter(|kw| all_answers.contains(**kw))
            .count();

        let mut technical_questions_answered = 0;
        let mut behavioral_questions_answered = 0;
        for entry in &answered {
            let question = entry.question.to_lowercase();
            if TECHNICAL_QUESTION_MARKERS.iter().any(|m| question.contains(m)) {
                technical_questions_answered += 1;
            } else if BEHAVIORAL_QUESTION_MARKERS.iter().any(|m| question.contains(m)) {
                behavioral_questions_answered += 1;
            }
        }

        Self {
            total_questions: total,
            answered_questions: answered.len(),
            completion_rate: if total > 0 {
                answered.len() as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            avg_answer_length,
            min_answer_length: lengths.iter().copied().min().unwrap_or(0),
            max_answer_length: lengths.iter().copied().max().unwrap_or(0),
            technical_keyword_count,
            soft_keyword_count,
            technical_questions_answered,
            behavioral_questions_answered,
            answer_quality: answer_quality(transcript),
        }
    }
}

/// Per-answer quality score averaged over every transcript entry.
///
/// Base 50; length and structure bonuses; unanswered entries score 0.
fn answer_quality(transcript: &[TranscriptEntry]) -> f64 {
    if transcript.is_empty() {
        return 0.0;
    }

    let mut scores = Vec::with_capacity(transcript.len());
    for entry in transcript {
        let answer = &entry.answer;
        if answer.trim().is_empty() {
            scores.push(0.0);
            continue;
        }

        let mut score: f64 = 50.0;
        let length = answer.len();
        if length > 200 {
            score += 20.0;
        } else if length > 100 {
            score += 10.0;
        } else if length < 30 {
            score -= 20.0;
        }

        let sentences = answer.matches(['.', '!', '?']).count();
        if sentences > 3 {
            score += 10.0;
        } else if sentences > 1 {
            score += 5.0;
        }

        if answer.chars().any(|c| c.is_ascii_digit()) {
            score += 5.0;
        }
        if answer.matches(',').count() > 2 {
            score += 5.0;
        }

        scores.push(score.clamp(0.0, 100.0));
    }

    scores.iter().sum::<f64>() / scores.len() as f64
}

/// The four sub-scores plus the weighted overall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub technical: f64,
    pub communication: f64,
    pub problem_solving: f64,
    pub cultural_fit: f64,
    pub overall: f64,
}

impl SubScores {
    /// Weighted sub-score formulas; every component clamped to [0, 100]
    pub fn from_metrics(m: &InterviewMetrics) -> Self {
        let completion = m.completion_rate;
        let quality = m.answer_quality;

        let technical = 30.0
            + (completion * 0.3).min(30.0)
            + (m.technical_keyword_count as f64 * 2.0).min(20.0)
            + (quality * 0.2).min(20.0);
        let communication = 30.0
            + (completion * 0.3).min(30.0)
            + (m.avg_answer_length / 8.0).min(25.0)
            + (m.soft_keyword_count as f64 * 2.0).min(15.0);
        let problem_solving = 30.0
            + (m.behavioral_questions_answered as f64 * 6.0).min(30.0)
            + (quality * 0.25).min(25.0)
            + (completion * 0.15).min(15.0);
        let cultural_fit = 30.0
            + (completion * 0.3).min(30.0)
            + (m.soft_keyword_count as f64 * 3.0).min(25.0)
            + (completion * 0.15).min(15.0);

        let technical = technical.clamp(0.0, 100.0);
        let communication = communication.clamp(0.0, 100.0);
        let problem_solving = problem_solving.clamp(0.0, 100.0);
        let cultural_fit = cultural_fit.clamp(0.0, 100.0);

        Self {
            technical,
            communication,
            problem_solving,
            cultural_fit,
            overall: technical * 0.35
                + communication * 0.25
                + problem_solving * 0.25
                + cultural_fit * 0.15,
        }
    }
}

/// Strengths/weaknesses/recommendations derived from threshold rules,
/// each capped at three entries
fn insights(m: &InterviewMetrics, s: &SubScores) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    if m.completion_rate >= 95.0 {
        strengths.push("Excellent interview completion - answered all questions thoroughly".into());
    } else if m.completion_rate >= 80.0 {
        strengths.push("Good interview engagement with high completion rate".into());
    } else if m.completion_rate < 60.0 {
        weaknesses.push("Low completion rate indicates potential communication issues".into());
    }

    if m.avg_answer_length > 150.0 {
        strengths.push("Provided detailed and comprehensive responses".into());
    } else if m.avg_answer_length < 50.0 {
        weaknesses.push("Responses were too brief and lacked detail".into());
        recommendations.push("Encourage more detailed responses in future interviews".into());
    }

    if m.technical_keyword_count >= 8 {
        strengths.push("Strong technical vocabulary and domain knowledge".into());
    } else if m.technical_keyword_count < 3 {
        weaknesses.push("Limited technical terminology in responses".into());
    }

    if m.soft_keyword_count >= 6 {
        strengths.push("Good emphasis on teamwork and collaboration".into());
    } else if m.soft_keyword_count < 2 {
        weaknesses.push("Minimal focus on soft skills and team dynamics".into());
    }

    if s.overall >= 75.0 {
        recommendations.push("Strong candidate - proceed to next round".into());
    } else if s.overall >= 60.0 {
        recommendations.push("Promising candidate - consider for technical assessment".into());
    } else {
        recommendations.push("May not be suitable for current role requirements".into());
    }
    if s.technical < 60.0 {
        recommendations.push("Additional technical screening recommended".into());
    }
    if s.communication < 60.0 {
        recommendations.push("Communication skills assessment needed".into());
    }

    strengths.truncate(3);
    weaknesses.truncate(3);
    recommendations.truncate(3);
    (strengths, weaknesses, recommendations)
}

/// Structured plain-text report with metrics, scores and derived lists
fn feedback_report(
    candidate: &CandidateRecord,
    m: &InterviewMetrics,
    s: &SubScores,
    strengths: &[String],
    weaknesses: &[String],
    recommendations: &[String],
) -> String {
    let bullets = |items: &[String]| {
        if items.is_empty() {
            "- none noted".to_string()
        } else {
            items
                .iter()
                .map(|i| format!("- {}", i))
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    let recommendation = if s.overall >= 75.0 {
        "Highly Recommended"
    } else if s.overall >= 60.0 {
        "Recommended"
    } else {
        "Not Recommended"
    };

    format!(
        "INTERVIEW ANALYSIS REPORT\n\
         =========================\n\
         Candidate: {name}\n\
         Position: {position}\n\
         \n\
         EXECUTIVE SUMMARY\n\
         Overall Score: {overall:.1}/100\n\
         Recommendation: {recommendation}\n\
         \n\
         DETAILED SCORES\n\
         - Technical Skills: {technical:.1}/100\n\
         - Communication: {communication:.1}/100\n\
         - Problem Solving: {problem_solving:.1}/100\n\
         - Cultural Fit: {cultural_fit:.1}/100\n\
         \n\
         INTERVIEW METRICS\n\
         - Questions Answered: {answered}/{total}\n\
         - Completion Rate: {completion:.1}%\n\
         - Average Response Length: {avg_len:.0} characters\n\
         - Answer Quality Score: {quality:.1}/100\n\
         \n\
         KEY STRENGTHS\n\
         {strengths}\n\
         \n\
         AREAS FOR IMPROVEMENT\n\
         {weaknesses}\n\
         \n\
         RECOMMENDATIONS\n\
         {recommendations}",
        name = candidate.name,
        position = candidate.job_title,
        overall = s.overall,
        recommendation = recommendation,
        technical = s.technical,
        communication = s.communication,
        problem_solving = s.problem_solving,
        cultural_fit = s.cultural_fit,
        answered = m.answered_questions,
        total = m.total_questions,
        completion = m.completion_rate,
        avg_len = m.avg_answer_length,
        quality = m.answer_quality,
        strengths = bullets(strengths),
        weaknesses = bullets(weaknesses),
        recommendations = bullets(recommendations),
    )
}

/// Deterministic rule-based scoring engine
#[derive(Debug, Clone, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a validated transcript
    pub fn analyze(
        &self,
        candidate: &CandidateRecord,
        transcript: &[TranscriptEntry],
    ) -> AnalysisResult {
        let metrics = InterviewMetrics::compute(transcript);
        let scores = SubScores::from_metrics(&metrics);
        let (strengths, weaknesses, recommendations) = insights(&metrics, &scores);
        let feedback = feedback_report(
            candidate,
            &metrics,
            &scores,
            &strengths,
            &weaknesses,
            &recommendations,
        );

        AnalysisResult {
            technical_score: scores.technical,
            communication_score: scores.communication,
            problem_solving_score: scores.problem_solving,
            cultural_fit_score: scores.cultural_fit,
            overall_score: scores.overall,
            strengths,
            weaknesses,
            recommendations,
            feedback,
            confidence: 0.75,
            method: METHOD_RULE_BASED.to_string(),
        }
        .clamped()
    }
}

#[async_trait]
impl ScoringStrategy for RuleBasedScorer {
    fn name(&self) -> &str {
        "rule_based"
    }

    async fn score(
        &self,
        candidate: &CandidateRecord,
        transcript: &[TranscriptEntry],
    ) -> Result<AnalysisResult, ScoringError> {
        Ok(self.analyze(candidate, transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> CandidateRecord {
        CandidateRecord::new(7, "Dana Reyes", "Backend Engineer")
    }

    fn rich_answer() -> String {
        "I would design the service around a message queue, then implement \
         workers that scale horizontally. We used an api gateway, a database \
         per service, and agile planning with the team to hit every deadline, \
         measuring performance at each step. Roughly 3 releases shipped."
            .to_string()
    }

    fn transcript_of(n_questions: usize, n_answered: usize, answer: &str) -> Vec<TranscriptEntry> {
        (0..n_questions)
            .map(|i| {
                let question = if i % 2 == 0 {
                    "Describe a challenge your team faced."
                } else {
                    "How would you design and implement this system?"
                };
                let a = if i < n_answered { answer } else { "" };
                TranscriptEntry::new(question, a)
            })
            .collect()
    }

    #[test]
    fn test_metrics_counts() {
        let transcript = transcript_of(10, 8, &rich_answer());
        let m = InterviewMetrics::compute(&transcript);
        assert_eq!(m.total_questions, 10);
        assert_eq!(m.answered_questions, 8);
        assert!((m.completion_rate - 80.0).abs() < 1e-9);
        assert!(m.technical_keyword_count >= 6);
        assert!(m.soft_keyword_count >= 2);
        assert!(m.behavioral_questions_answered >= 1);
        assert!(m.technical_questions_answered >= 1);
    }

    #[test]
    fn test_quality_score_bonuses() {
        let long = "a".repeat(250);
        let short = "too short";
        let transcript = vec![
            TranscriptEntry::new("Q", long),
            TranscriptEntry::new("Q", short),
            TranscriptEntry::new("Q", ""),
        ];
        let m = InterviewMetrics::compute(&transcript);
        // (50+20) + (50-20) + 0 over 3 entries
        assert!((m.answer_quality - (70.0 + 30.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_scores_within_bounds() {
        for (total, answered) in [(0usize, 0usize), (10, 0), (10, 5), (10, 10), (3, 3)] {
            let transcript = transcript_of(total, answered, &rich_answer());
            let result = RuleBasedScorer::new().analyze(&candidate(), &transcript);
            for score in [
                result.technical_score,
                result.communication_score,
                result.problem_solving_score,
                result.cultural_fit_score,
                result.overall_score,
            ] {
                assert!((0.0..=100.0).contains(&score), "score {} out of bounds", score);
            }
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let transcript = transcript_of(10, 10, &rich_answer());
        let scorer = RuleBasedScorer::new();
        let a = scorer.analyze(&candidate(), &transcript);
        let b = scorer.analyze(&candidate(), &transcript);
        assert_eq!(a.technical_score, b.technical_score);
        assert_eq!(a.communication_score, b.communication_score);
        assert_eq!(a.problem_solving_score, b.problem_solving_score);
        assert_eq!(a.cultural_fit_score, b.cultural_fit_score);
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.feedback, b.feedback);
    }

    #[test]
    fn test_strong_interview_passes() {
        // Full completion, detailed answers: technical lands in the
        // upper-60s/70s and overall clears the pass line
        let transcript = transcript_of(10, 10, &rich_answer());
        let result = RuleBasedScorer::new().analyze(&candidate(), &transcript);

        assert!(
            result.technical_score >= 65.0 && result.technical_score <= 95.0,
            "technical = {}",
            result.technical_score
        );
        assert!(result.overall_score >= 70.0, "overall = {}", result.overall_score);
        assert!(!result.strengths.is_empty());
        assert!(result.strengths.len() <= 3);
        assert!(result.recommendations.len() <= 3);
    }

    #[test]
    fn test_brief_answers_flagged() {
        let transcript = transcript_of(10, 10, "We did a few things here quickly.");
        let result = RuleBasedScorer::new().analyze(&candidate(), &transcript);
        assert!(result
            .weaknesses
            .iter()
            .any(|w| w.contains("too brief")));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("more detailed responses")));
    }

    #[test]
    fn test_feedback_contains_metrics_and_scores() {
        let transcript = transcript_of(10, 10, &rich_answer());
        let result = RuleBasedScorer::new().analyze(&candidate(), &transcript);
        assert!(result.feedback.contains("Dana Reyes"));
        assert!(result.feedback.contains("Backend Engineer"));
        assert!(result.feedback.contains("Completion Rate: 100.0%"));
        assert!(result.feedback.contains("DETAILED SCORES"));
        assert!(result.feedback.contains("RECOMMENDATIONS"));
    }
}
