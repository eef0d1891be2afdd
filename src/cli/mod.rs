//! Command-line interface for talentflow.
//!
//! Provides commands for running the analysis service, triggering and
//! inspecting candidate analyses, and examining the resolved configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::config::ServiceConfig;
use crate::core::{AnalysisService, CompletionDetector};
use crate::store::{CandidateStore, InsightKind};

/// talentflow - Asynchronous interview analysis pipeline
#[derive(Parser, Debug)]
#[command(name = "talentflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the analysis service until interrupted
    Serve,

    /// Queue an analysis for a candidate and wait for the verdict
    Analyze {
        /// Candidate ID
        candidate_id: i64,

        /// Maximum seconds to wait for a verdict
        #[arg(short, long, default_value = "60")]
        wait: u64,
    },

    /// Show a candidate's interview and analysis state
    Status {
        /// Candidate ID
        candidate_id: i64,

        /// Include strengths, weaknesses and recommendations
        #[arg(short, long)]
        full: bool,
    },

    /// Show candidate counts by analysis status
    Stats,

    /// Run the completion detector for one candidate
    Complete {
        /// Candidate ID
        candidate_id: i64,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = ServiceConfig::load()?;

        match self.command {
            Commands::Serve => serve(config).await,
            Commands::Analyze { candidate_id, wait } => {
                analyze(config, candidate_id, Duration::from_secs(wait)).await
            }
            Commands::Status { candidate_id, full } => status(config, candidate_id, full).await,
            Commands::Stats => stats(config).await,
            Commands::Complete { candidate_id } => complete(config, candidate_id).await,
            Commands::Config => show_config(&config),
        }
    }
}

fn open_store(config: &ServiceConfig) -> Result<Arc<CandidateStore>> {
    let store = CandidateStore::open(&config.store_path)
        .with_context(|| format!("Opening store at {}", config.store_path.display()))?;
    Ok(Arc::new(store))
}

/// Run the service until Ctrl-C
async fn serve(config: ServiceConfig) -> Result<()> {
    let store = open_store(&config)?;
    let service = AnalysisService::new(config, store);

    service.start().await;
    eprintln!("Analysis service running. Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Waiting for shutdown signal")?;

    service.stop().await;
    Ok(())
}

/// Queue one candidate and poll the store until the analysis settles
async fn analyze(config: ServiceConfig, candidate_id: i64, wait: Duration) -> Result<()> {
    let store = open_store(&config)?;
    let service = AnalysisService::new(config, store.clone());
    service.start().await;

    if !service.enqueue_analysis(candidate_id).await? {
        service.stop().await;
        anyhow::bail!("Candidate {} not found", candidate_id);
    }
    eprintln!("Queued analysis for candidate {}", candidate_id);

    let deadline = tokio::time::Instant::now() + wait;
    let settled = loop {
        if tokio::time::Instant::now() >= deadline {
            break false;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;

        let record = store.fetch_required(candidate_id).await?;
        if record.analysis_status.is_some_and(|s| s.is_terminal()) {
            break true;
        }
    };

    service.stop().await;

    if !settled {
        anyhow::bail!(
            "Analysis for candidate {} did not settle within {}s",
            candidate_id,
            wait.as_secs()
        );
    }

    let record = store.fetch_required(candidate_id).await?;
    println!(
        "Candidate {}: {}",
        candidate_id,
        record
            .final_verdict
            .map(|v| v.describe().to_string())
            .unwrap_or_else(|| "no verdict".to_string())
    );
    if let Some(overall) = record.overall_score {
        println!("Overall score: {:.1}", overall);
    }
    Ok(())
}

/// Show one candidate's record
async fn status(config: ServiceConfig, candidate_id: i64, full: bool) -> Result<()> {
    let store = open_store(&config)?;
    let record = store.fetch_required(candidate_id).await?;

    println!("Candidate: {} ({})", record.name, record.job_title);
    println!(
        "Interview: {}/{} answered, {:.0}% progress",
        record.answered_questions, record.total_questions, record.progress_percent
    );
    if let Some(completed) = record.completed_at {
        println!("Completed: {}", completed);
    }
    if let Some(secs) = record.interview_duration_secs {
        println!("Duration: {}s", secs);
    }
    println!(
        "Analysis status: {}",
        record
            .analysis_status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    if let Some(verdict) = record.final_verdict {
        println!("Verdict: {}", verdict.describe());
    }
    if let Some(overall) = record.overall_score {
        println!("\nScores:");
        println!("  Overall:         {:.1}", overall);
        if let Some(s) = record.technical_score {
            println!("  Technical:       {:.1}", s);
        }
        if let Some(s) = record.communication_score {
            println!("  Communication:   {:.1}", s);
        }
        if let Some(s) = record.problem_solving_score {
            println!("  Problem solving: {:.1}", s);
        }
        if let Some(s) = record.cultural_fit_score {
            println!("  Cultural fit:    {:.1}", s);
        }
    }

    if full {
        for (label, kind) in [
            ("Strengths", InsightKind::Strength),
            ("Weaknesses", InsightKind::Weakness),
            ("Recommendations", InsightKind::Recommendation),
        ] {
            let items = store.fetch_insights(candidate_id, kind).await?;
            if !items.is_empty() {
                println!("\n{}:", label);
                for item in items {
                    println!("  - {}", item);
                }
            }
        }
        if let Some(feedback) = &record.feedback {
            println!("\n{}", feedback);
        }
    }

    Ok(())
}

/// Show candidate counts grouped by analysis status
async fn stats(config: ServiceConfig) -> Result<()> {
    let store = open_store(&config)?;
    let counts = store.status_counts().await?;

    if counts.is_empty() {
        println!("No candidates in store");
        return Ok(());
    }

    println!("{:<15} {:>8}", "STATUS", "COUNT");
    println!("{}", "-".repeat(24));
    let mut total = 0;
    for (status, count) in counts {
        println!("{:<15} {:>8}", status, count);
        total += count;
    }
    println!("{}", "-".repeat(24));
    println!("{:<15} {:>8}", "total", total);

    Ok(())
}

/// Run the completion detector for one candidate
async fn complete(config: ServiceConfig, candidate_id: i64) -> Result<()> {
    let store = open_store(&config)?;
    let detector = CompletionDetector::new(config.completion.clone());

    match detector.evaluate(&store, candidate_id, Utc::now()).await? {
        Some(reason) => {
            println!("Candidate {} marked completed: {}", candidate_id, reason.as_str());
        }
        None => {
            let record = store.fetch_required(candidate_id).await?;
            if record.completed_at.is_some() {
                println!("Candidate {} already completed", candidate_id);
            } else {
                println!("Candidate {} does not meet any completion rule yet", candidate_id);
            }
        }
    }
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config(config: &ServiceConfig) -> Result<()> {
    println!("Store:");
    println!("  Path: {}", config.store_path.display());
    println!();
    println!("Workers:");
    println!("  Count:           {}", config.workers);
    println!("  Dequeue timeout: {:?}", config.dequeue_timeout);
    println!();
    println!("Monitor:");
    println!("  Interval:        {:?}", config.monitor.interval);
    println!("  Batch size:      {}", config.monitor.batch_size);
    println!("  Max retries:     {}", config.monitor.max_retries);
    println!("  Retry delay:     {:?}", config.monitor.retry_delay);
    println!("  Stale threshold: {:?}", config.monitor.stale_threshold);
    println!();
    println!("Completion:");
    println!("  Max duration:      {:?}", config.completion.max_duration);
    println!("  Inactivity window: {:?}", config.completion.inactivity_window);
    println!("  Inactivity floor:  {}", config.completion.inactivity_min_answers);
    println!("  Answer floor:      {}", config.completion.answer_floor);
    println!();
    println!("Validation:");
    println!("  Min questions:      {}", config.validation.min_questions);
    println!("  Min valid answers:  {}", config.validation.min_valid_answers);
    println!("  Min answer length:  {}", config.validation.min_answer_length);
    println!("  Min word count:     {}", config.validation.min_word_count);
    println!("  Validity threshold: {}", config.validation.validity_threshold);
    println!();
    println!("Scoring:");
    println!("  Timeout:    {:?}", config.scoring.timeout);
    println!(
        "  Remote URL: {}",
        config.scoring.remote_url.as_deref().unwrap_or("(none - rule-based only)")
    );

    Ok(())
}
