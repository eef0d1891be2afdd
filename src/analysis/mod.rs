//! Transcript validation and rule-based scoring.
//!
//! The validation gate rejects malformed or test-data interviews before any
//! scoring is attempted; the scoring engine computes the four weighted
//! sub-scores from transcript metrics.

pub mod scoring;
pub mod validation;

pub use scoring::{InterviewMetrics, RuleBasedScorer};
pub use validation::{ValidationGate, ValidationOutcome};
