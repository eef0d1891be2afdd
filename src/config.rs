//! Configuration for the analysis pipeline.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ANALYSIS_*, MIN_*, VALIDITY_THRESHOLD, ...)
//! 2. Config file (.talentflow/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .talentflow/config.yaml
//!
//! The resolved config is injected into the service instance; there is no
//! process-wide cached configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: Option<StoreSection>,
    #[serde(default)]
    pub monitor: Option<MonitorSection>,
    #[serde(default)]
    pub workers: Option<WorkerSection>,
    #[serde(default)]
    pub validation: Option<ValidationSection>,
    #[serde(default)]
    pub scoring: Option<ScoringSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    /// Path to the SQLite database (relative paths resolve against the
    /// config file's parent directory)
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorSection {
    pub interval_secs: Option<u64>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub stale_threshold_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerSection {
    pub count: Option<usize>,
    pub dequeue_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationSection {
    pub min_questions: Option<usize>,
    pub min_valid_answers: Option<usize>,
    pub min_answer_length: Option<usize>,
    pub min_word_count: Option<usize>,
    pub validity_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSection {
    pub timeout_secs: Option<u64>,
    pub remote_url: Option<String>,
    pub remote_api_key: Option<String>,
}

/// Recovery monitor tuning
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seconds between monitor cycles
    pub interval: Duration,

    /// Max candidates enqueued per pending scan
    pub batch_size: usize,

    /// Max re-attempts per failed task
    pub max_retries: u32,

    /// How long a failed task waits before retry
    pub retry_delay: Duration,

    /// Age at which a PROCESSING task is considered stuck
    pub stale_threshold: Duration,

    /// Age bands for recency priority. Tunable, not load-bearing: the only
    /// contract is "more recent is more urgent".
    pub fresh_cutoff_hours: i64,
    pub recent_cutoff_hours: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            batch_size: 10,
            max_retries: 3,
            retry_delay: Duration::from_secs(300),
            stale_threshold: Duration::from_secs(3600),
            fresh_cutoff_hours: 1,
            recent_cutoff_hours: 6,
        }
    }
}

/// Validation gate thresholds
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub min_questions: usize,
    pub min_valid_answers: usize,
    pub min_answer_length: usize,
    pub min_word_count: usize,
    pub validity_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_questions: 5,
            min_valid_answers: 5,
            min_answer_length: 30,
            min_word_count: 5,
            validity_threshold: 0.7,
        }
    }
}

/// Completion detector tuning
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Hard cap on interview duration
    pub max_duration: Duration,

    /// Inactivity window after which a partially-answered interview closes
    pub inactivity_window: Duration,

    /// Minimum answered questions for the inactivity rule
    pub inactivity_min_answers: u32,

    /// Absolute answer-count floor, independent of total_questions
    pub answer_floor: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(45 * 60),
            inactivity_window: Duration::from_secs(15 * 60),
            inactivity_min_answers: 5,
            answer_floor: 10,
        }
    }
}

/// Remote scoring strategy settings (optional)
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Timeout for one external scoring call
    pub timeout: Duration,

    /// Endpoint of the remote model, if any
    pub remote_url: Option<String>,

    pub remote_api_key: Option<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            remote_url: None,
            remote_api_key: None,
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database path
    pub store_path: PathBuf,

    /// Number of worker tasks
    pub workers: usize,

    /// How long a worker blocks on an empty queue before re-checking shutdown
    pub dequeue_timeout: Duration,

    pub monitor: MonitorConfig,
    pub validation: ValidationConfig,
    pub completion: CompletionConfig,
    pub scoring: ScoringConfig,

    /// Path to the config file, if one was found
    pub config_file: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            workers: 2,
            dequeue_timeout: Duration::from_secs(5),
            monitor: MonitorConfig::default(),
            validation: ValidationConfig::default(),
            completion: CompletionConfig::default(),
            scoring: ScoringConfig::default(),
            config_file: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration: defaults, then config file, then environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = find_config_file() {
            let file = load_config_file(&path)?;
            config.apply_file(&file, path.parent().and_then(Path::parent));
            config.config_file = Some(path);
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_file(&mut self, file: &ConfigFile, base: Option<&Path>) {
        if let Some(store) = &file.store {
            if let Some(path) = &store.path {
                let path = PathBuf::from(path);
                self.store_path = match (path.is_absolute(), base) {
                    (false, Some(base)) => base.join(path),
                    _ => path,
                };
            }
        }
        if let Some(monitor) = &file.monitor {
            if let Some(v) = monitor.interval_secs {
                self.monitor.interval = Duration::from_secs(v);
            }
            if let Some(v) = monitor.batch_size {
                self.monitor.batch_size = v;
            }
            if let Some(v) = monitor.max_retries {
                self.monitor.max_retries = v;
            }
            if let Some(v) = monitor.retry_delay_secs {
                self.monitor.retry_delay = Duration::from_secs(v);
            }
            if let Some(v) = monitor.stale_threshold_secs {
                self.monitor.stale_threshold = Duration::from_secs(v);
            }
        }
        if let Some(workers) = &file.workers {
            if let Some(v) = workers.count {
                self.workers = v.max(1);
            }
            if let Some(v) = workers.dequeue_timeout_secs {
                self.dequeue_timeout = Duration::from_secs(v);
            }
        }
        if let Some(validation) = &file.validation {
            if let Some(v) = validation.min_questions {
                self.validation.min_questions = v;
            }
            if let Some(v) = validation.min_valid_answers {
                self.validation.min_valid_answers = v;
            }
            if let Some(v) = validation.min_answer_length {
                self.validation.min_answer_length = v;
            }
            if let Some(v) = validation.min_word_count {
                self.validation.min_word_count = v;
            }
            if let Some(v) = validation.validity_threshold {
                self.validation.validity_threshold = v;
            }
        }
        if let Some(scoring) = &file.scoring {
            if let Some(v) = scoring.timeout_secs {
                self.scoring.timeout = Duration::from_secs(v);
            }
            if scoring.remote_url.is_some() {
                self.scoring.remote_url = scoring.remote_url.clone();
            }
            if scoring.remote_api_key.is_some() {
                self.scoring.remote_api_key = scoring.remote_api_key.clone();
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(path) = env_var("TALENTFLOW_DB") {
            self.store_path = PathBuf::from(path);
        }
        if let Some(v) = env_parse::<u64>("ANALYSIS_MONITOR_INTERVAL") {
            self.monitor.interval = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<usize>("ANALYSIS_BATCH_SIZE") {
            self.monitor.batch_size = v;
        }
        if let Some(v) = env_parse::<u32>("ANALYSIS_MAX_RETRIES") {
            self.monitor.max_retries = v;
        }
        if let Some(v) = env_parse::<u64>("ANALYSIS_RETRY_DELAY") {
            self.monitor.retry_delay = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<u64>("ANALYSIS_STALE_THRESHOLD") {
            self.monitor.stale_threshold = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<usize>("ANALYSIS_WORKERS") {
            self.workers = v.max(1);
        }
        if let Some(v) = env_parse::<usize>("MIN_INTERVIEW_QUESTIONS") {
            self.validation.min_questions = v;
        }
        if let Some(v) = env_parse::<usize>("MIN_VALID_ANSWERS") {
            self.validation.min_valid_answers = v;
        }
        if let Some(v) = env_parse::<usize>("MIN_ANSWER_LENGTH") {
            self.validation.min_answer_length = v;
        }
        if let Some(v) = env_parse::<usize>("MIN_WORD_COUNT") {
            self.validation.min_word_count = v;
        }
        if let Some(v) = env_parse::<f64>("VALIDITY_THRESHOLD") {
            self.validation.validity_threshold = v;
        }
        if let Some(v) = env_parse::<u64>("SCORING_TIMEOUT") {
            self.scoring.timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_var("REMOTE_SCORING_URL") {
            self.scoring.remote_url = Some(v);
        }
        if let Some(v) = env_var("REMOTE_SCORING_API_KEY") {
            self.scoring.remote_api_key = Some(v);
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.parse().ok())
}

/// Default database location (~/.talentflow/talentflow.db)
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".talentflow")
        .join("talentflow.db")
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".talentflow").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.monitor.interval, Duration::from_secs(30));
        assert_eq!(config.monitor.batch_size, 10);
        assert_eq!(config.monitor.max_retries, 3);
        assert_eq!(config.monitor.retry_delay, Duration::from_secs(300));
        assert_eq!(config.monitor.stale_threshold, Duration::from_secs(3600));
        assert_eq!(config.validation.min_questions, 5);
        assert_eq!(config.validation.min_answer_length, 30);
        assert_eq!(config.validation.validity_threshold, 0.7);
        assert_eq!(config.completion.max_duration, Duration::from_secs(2700));
        assert_eq!(config.completion.inactivity_window, Duration::from_secs(900));
        assert_eq!(config.scoring.timeout, Duration::from_secs(30));
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn test_config_file_overrides() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
monitor:
  interval_secs: 10
  batch_size: 25
validation:
  min_questions: 3
workers:
  count: 4
"#,
        )
        .unwrap();

        let mut config = ServiceConfig::default();
        config.apply_file(&file, None);

        assert_eq!(config.monitor.interval, Duration::from_secs(10));
        assert_eq!(config.monitor.batch_size, 25);
        assert_eq!(config.validation.min_questions, 3);
        assert_eq!(config.workers, 4);
        // Untouched values keep defaults
        assert_eq!(config.monitor.max_retries, 3);
    }
}
