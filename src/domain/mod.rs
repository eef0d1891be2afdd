//! Domain types for the analysis pipeline.
//!
//! This module contains the core data structures:
//! - CandidateRecord: interview lifecycle state owned by the store
//! - AnalysisTask: an in-memory request to analyze one candidate
//! - AnalysisResult: the scoring engine's output

pub mod candidate;
pub mod result;
pub mod task;

// Re-export commonly used types
pub use candidate::{AnalysisStatus, CandidateRecord, InterviewSignal, TranscriptEntry, Verdict};
pub use result::AnalysisResult;
pub use task::AnalysisTask;
