//! talentflow - Asynchronous interview analysis pipeline
//!
//! A recruitment backend service that detects finished interviews, queues
//! them for analysis, scores the transcripts and publishes verdicts.
//!
//! # Architecture
//!
//! The pipeline is producer/consumer over one priority queue:
//! - A recovery monitor periodically sweeps the store, closes finished
//!   interviews, enqueues them and requeues stuck or failed analyses
//! - A pool of workers claims candidates, validates transcripts, runs a
//!   scoring strategy and persists the verdict
//! - The store is the source of truth; conditional updates on its rows
//!   give exactly-once enqueue and processing
//!
//! # Modules
//!
//! - `adapters`: External scoring integrations (remote model API)
//! - `analysis`: Validation gate and the rule-based scoring engine
//! - `core`: Pipeline logic (detector, queue, monitor, workers, publisher)
//! - `domain`: Data structures (CandidateRecord, AnalysisTask, AnalysisResult)
//! - `store`: SQLite-backed candidate store
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the analysis service
//! talentflow serve
//!
//! # Queue a candidate and wait for the verdict
//! talentflow analyze 42
//!
//! # Inspect a candidate
//! talentflow status 42 --full
//! ```

pub mod adapters;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;

// Re-export main types at crate root for convenience
pub use config::ServiceConfig;
pub use self::core::{AnalysisService, AnalysisUpdate, CompletionReason, ServiceStats};
pub use domain::{
    AnalysisResult, AnalysisStatus, AnalysisTask, CandidateRecord, InterviewSignal,
    TranscriptEntry, Verdict,
};
pub use store::{CandidateStore, StoreError};
