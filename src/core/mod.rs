//! Core pipeline logic.
//!
//! This module contains:
//! - CompletionDetector: Ordered completion rules over interview records
//! - TaskQueue: Priority queue feeding the worker pool
//! - PipelineState: Shared completed-set and failure table
//! - RecoveryMonitor: Periodic sweep, enqueue, staleness and retry passes
//! - Workers: The analysis worker loop
//! - ResultPublisher: Two-tier persistence plus polling notifications
//! - AnalysisService: The facade tying everything together

pub mod completion;
pub mod monitor;
pub mod publisher;
pub mod queue;
pub mod service;
pub mod state;
pub mod worker;

// Re-export commonly used types
pub use completion::{CompletionDetector, CompletionReason};
pub use monitor::RecoveryMonitor;
pub use publisher::{AnalysisUpdate, ResultPublisher, UpdateScores};
pub use queue::TaskQueue;
pub use service::{AnalysisService, ServiceStats};
pub use state::{FailureInfo, PipelineState};
pub use worker::{run_worker, WorkerContext};
