//! SQLite-backed candidate record store.
//!
//! The candidate row is the only shared mutable resource in the pipeline
//! and this store is the source of truth for analysis state. All claim
//! operations are conditional UPDATEs so that at most one caller wins even
//! when the in-memory idempotency flag briefly races.
//!
//! Transcripts and insight lists live in child tables rather than
//! JSON-encoded columns, and are decoded once at read time.

use std::path::Path;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{
    AnalysisResult, AnalysisStatus, CandidateRecord, InterviewSignal, TranscriptEntry, Verdict,
};

/// Errors that can occur against the candidate store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Candidate not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Insight list discriminator in the `insights` child table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Strength,
    Weakness,
    Recommendation,
}

impl InsightKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Weakness => "weakness",
            Self::Recommendation => "recommendation",
        }
    }
}

/// Candidate record store over SQLite
pub struct CandidateStore {
    conn: Mutex<Connection>,
}

impl CandidateStore {
    /// Open (and migrate) a store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory store (tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id                      INTEGER PRIMARY KEY,
                name                    TEXT NOT NULL,
                job_title               TEXT NOT NULL,
                started_at              TEXT,
                completed_at            TEXT,
                last_activity_at        TEXT,
                total_questions         INTEGER NOT NULL DEFAULT 0,
                answered_questions      INTEGER NOT NULL DEFAULT 0,
                progress_percent        REAL NOT NULL DEFAULT 0,
                completion_signal       INTEGER NOT NULL DEFAULT 0,
                analysis_status         TEXT,
                auto_score_triggered    INTEGER NOT NULL DEFAULT 0,
                analysis_started_at     TEXT,
                analysis_completed_at   TEXT,
                interview_duration_secs INTEGER,
                overall_score           REAL,
                technical_score         REAL,
                communication_score     REAL,
                problem_solving_score   REAL,
                cultural_fit_score      REAL,
                confidence              REAL,
                scoring_method          TEXT,
                feedback                TEXT,
                final_verdict           TEXT
            );

            CREATE TABLE IF NOT EXISTS transcript (
                candidate_id INTEGER NOT NULL REFERENCES candidates(id),
                ord          INTEGER NOT NULL,
                question     TEXT NOT NULL,
                answer       TEXT NOT NULL DEFAULT '',
                asked_at     TEXT,
                PRIMARY KEY (candidate_id, ord)
            );

            CREATE TABLE IF NOT EXISTS insights (
                candidate_id INTEGER NOT NULL REFERENCES candidates(id),
                kind         TEXT NOT NULL,
                ord          INTEGER NOT NULL,
                text         TEXT NOT NULL,
                PRIMARY KEY (candidate_id, kind, ord)
            );

            CREATE INDEX IF NOT EXISTS idx_candidates_analysis
                ON candidates (completed_at, analysis_status, auto_score_triggered);
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a new candidate row
    pub async fn insert(&self, record: &CandidateRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO candidates (id, name, job_title, started_at, last_activity_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.name,
                record.job_title,
                record.started_at,
                record.last_activity_at,
            ],
        )?;
        Ok(())
    }

    /// Fetch a candidate by id
    pub async fn fetch(&self, candidate_id: i64) -> Result<Option<CandidateRecord>, StoreError> {
        let conn = self.conn.lock().await;
        let record = conn
            .query_row(
                "SELECT * FROM candidates WHERE id = ?1",
                params![candidate_id],
                map_candidate,
            )
            .optional()?;
        Ok(record)
    }

    /// Fetch a candidate, erroring when absent
    pub async fn fetch_required(&self, candidate_id: i64) -> Result<CandidateRecord, StoreError> {
        self.fetch(candidate_id)
            .await?
            .ok_or(StoreError::NotFound(candidate_id))
    }

    /// Read the ordered transcript for a candidate
    pub async fn fetch_transcript(
        &self,
        candidate_id: i64,
    ) -> Result<Vec<TranscriptEntry>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT question, answer, asked_at FROM transcript
             WHERE candidate_id = ?1 ORDER BY ord",
        )?;
        let entries = stmt
            .query_map(params![candidate_id], |row| {
                Ok(TranscriptEntry {
                    question: row.get(0)?,
                    answer: row.get(1)?,
                    asked_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Append transcript entries and refresh the progress counters.
    ///
    /// Written by the capture layer; the analysis pipeline itself treats the
    /// transcript as read-only.
    pub async fn append_transcript(
        &self,
        candidate_id: i64,
        entries: &[TranscriptEntry],
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let mut ord: i64 = tx.query_row(
            "SELECT COALESCE(MAX(ord), 0) FROM transcript WHERE candidate_id = ?1",
            params![candidate_id],
            |row| row.get(0),
        )?;
        for entry in entries {
            ord += 1;
            tx.execute(
                "INSERT INTO transcript (candidate_id, ord, question, answer, asked_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![candidate_id, ord, entry.question, entry.answer, entry.asked_at],
            )?;
        }

        let (total, answered): (u32, u32) = tx.query_row(
            "SELECT COUNT(*), COUNT(CASE WHEN TRIM(answer) != '' THEN 1 END)
             FROM transcript WHERE candidate_id = ?1",
            params![candidate_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let progress = if total > 0 {
            (f64::from(answered) / f64::from(total) * 100.0).min(100.0)
        } else {
            0.0
        };

        let updated = tx.execute(
            "UPDATE candidates SET total_questions = ?2, answered_questions = ?3,
                 progress_percent = ?4, last_activity_at = ?5
             WHERE id = ?1",
            params![candidate_id, total, answered, progress, Utc::now()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(candidate_id));
        }

        tx.commit()?;
        Ok(())
    }

    /// Record an explicit signal from the live session handler
    pub async fn record_signal(
        &self,
        candidate_id: i64,
        signal: InterviewSignal,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let updated = match signal {
            InterviewSignal::Started => conn.execute(
                "UPDATE candidates SET started_at = COALESCE(started_at, ?2),
                     last_activity_at = ?2
                 WHERE id = ?1",
                params![candidate_id, now],
            )?,
            InterviewSignal::Completed => conn.execute(
                "UPDATE candidates SET completion_signal = 1, last_activity_at = ?2
                 WHERE id = ?1",
                params![candidate_id, now],
            )?,
        };
        if updated == 0 {
            return Err(StoreError::NotFound(candidate_id));
        }
        Ok(())
    }

    /// Stamp `completed_at` and move the status to pending.
    ///
    /// Idempotent: a no-op returning false when the interview is already
    /// marked complete. The status is only touched when it is not yet past
    /// pending.
    pub async fn mark_completed(
        &self,
        candidate_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE candidates SET
                 completed_at = ?2,
                 interview_duration_secs = CAST(COALESCE(
                     (julianday(?2) - julianday(started_at)) * 86400, 0) AS INTEGER),
                 analysis_status = CASE
                     WHEN analysis_status IS NULL OR analysis_status = 'pending'
                     THEN 'pending' ELSE analysis_status END
             WHERE id = ?1 AND completed_at IS NULL",
            params![candidate_id, now],
        )?;
        Ok(updated == 1)
    }

    /// Candidates ready for enqueue: interview finished, analysis not yet
    /// claimed, idempotency flag unset.
    pub async fn fetch_pending(&self, batch: usize) -> Result<Vec<CandidateRecord>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT * FROM candidates
             WHERE completed_at IS NOT NULL
               AND (analysis_status IS NULL OR analysis_status IN ('pending', 'retry'))
               AND auto_score_triggered = 0
             ORDER BY completed_at DESC
             LIMIT ?1",
        )?;
        let records = stmt
            .query_map(params![batch as i64], map_candidate)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Interviews with activity but no completion stamp yet; input to the
    /// monitor's completion sweep.
    pub async fn fetch_in_progress(&self) -> Result<Vec<i64>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id FROM candidates
             WHERE completed_at IS NULL
               AND (started_at IS NOT NULL OR total_questions > 0)",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Candidates stuck in processing past the staleness threshold
    pub async fn fetch_stale(
        &self,
        threshold: ChronoDuration,
        now: DateTime<Utc>,
    ) -> Result<Vec<i64>, StoreError> {
        let cutoff = now - threshold;
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id FROM candidates
             WHERE analysis_status = 'processing' AND analysis_started_at < ?1",
        )?;
        let ids = stmt
            .query_map(params![cutoff], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Flip the idempotency flag 0 -> 1. Only the winner of this update may
    /// enqueue the candidate, which makes the flag update happen-before the
    /// task becomes visible to any worker.
    pub async fn try_claim_for_enqueue(&self, candidate_id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE candidates SET auto_score_triggered = 1
             WHERE id = ?1 AND auto_score_triggered = 0",
            params![candidate_id],
        )?;
        Ok(updated == 1)
    }

    /// Claim the row for processing. Conditional on the status not already
    /// being processing or terminal, so concurrent workers cannot both win.
    pub async fn claim_for_processing(
        &self,
        candidate_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE candidates SET analysis_status = 'processing', analysis_started_at = ?2
             WHERE id = ?1
               AND completed_at IS NOT NULL
               AND (analysis_status IS NULL
                    OR analysis_status IN ('pending', 'retry', 'failed'))",
            params![candidate_id, now],
        )?;
        Ok(updated == 1)
    }

    /// Record a worker failure on the row
    pub async fn mark_failed(&self, candidate_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE candidates SET analysis_status = 'failed' WHERE id = ?1",
            params![candidate_id],
        )?;
        Ok(())
    }

    /// Stale-scan reset: status retry, idempotency flag cleared so the
    /// pending scan can pick the candidate up again.
    pub async fn reset_for_retry(&self, candidate_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE candidates SET analysis_status = 'retry', auto_score_triggered = 0
             WHERE id = ?1",
            params![candidate_id],
        )?;
        Ok(())
    }

    /// Operator-triggered re-analysis: back to pending with the flag cleared
    pub async fn reset_for_reanalysis(&self, candidate_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE candidates SET analysis_status = 'pending',
                 auto_score_triggered = 0, analysis_started_at = NULL
             WHERE id = ?1",
            params![candidate_id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(candidate_id));
        }
        Ok(())
    }

    /// Persist a full analysis result in a single transaction: scores,
    /// feedback, insight lists, derived status and verdict.
    pub async fn save_result(
        &self,
        candidate_id: i64,
        result: &AnalysisResult,
        status: AnalysisStatus,
        verdict: Verdict,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let completed_at = if status == AnalysisStatus::Completed {
            Some(now)
        } else {
            None
        };
        let updated = tx.execute(
            "UPDATE candidates SET
                 overall_score = ?2, technical_score = ?3, communication_score = ?4,
                 problem_solving_score = ?5, cultural_fit_score = ?6,
                 feedback = ?7, confidence = ?8, scoring_method = ?9,
                 analysis_status = ?10, final_verdict = ?11, analysis_completed_at = ?12
             WHERE id = ?1",
            params![
                candidate_id,
                result.overall_score,
                result.technical_score,
                result.communication_score,
                result.problem_solving_score,
                result.cultural_fit_score,
                result.feedback,
                result.confidence,
                result.method,
                status.as_str(),
                verdict.as_str(),
                completed_at,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(candidate_id));
        }

        tx.execute(
            "DELETE FROM insights WHERE candidate_id = ?1",
            params![candidate_id],
        )?;
        for (kind, items) in [
            (InsightKind::Strength, &result.strengths),
            (InsightKind::Weakness, &result.weaknesses),
            (InsightKind::Recommendation, &result.recommendations),
        ] {
            for (ord, text) in items.iter().enumerate() {
                tx.execute(
                    "INSERT INTO insights (candidate_id, kind, ord, text)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![candidate_id, kind.as_str(), ord as i64, text],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Minimal degraded write of only the status columns. Used when the
    /// transactional save keeps failing, so the candidate never stays
    /// ambiguous with `completed_at` set but status perpetually processing.
    pub async fn save_status_fallback(
        &self,
        candidate_id: i64,
        status: AnalysisStatus,
        verdict: Verdict,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE candidates SET analysis_status = ?2, final_verdict = ?3,
                 analysis_completed_at = ?4
             WHERE id = ?1",
            params![candidate_id, status.as_str(), verdict.as_str(), now],
        )?;
        Ok(())
    }

    /// Read one insight list back, in stored order
    pub async fn fetch_insights(
        &self,
        candidate_id: i64,
        kind: InsightKind,
    ) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT text FROM insights
             WHERE candidate_id = ?1 AND kind = ?2 ORDER BY ord",
        )?;
        let items = stmt
            .query_map(params![candidate_id, kind.as_str()], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Candidate counts grouped by analysis status. Rows with no status yet
    /// are reported under "none".
    pub async fn status_counts(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT COALESCE(analysis_status, 'none') AS status, COUNT(*)
             FROM candidates GROUP BY status ORDER BY status",
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}

fn map_candidate(row: &Row<'_>) -> rusqlite::Result<CandidateRecord> {
    let status: Option<String> = row.get("analysis_status")?;
    let verdict: Option<String> = row.get("final_verdict")?;
    Ok(CandidateRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        job_title: row.get("job_title")?,
        started_at: row.get("started_at")?,
        completed_at: row.get("completed_at")?,
        last_activity_at: row.get("last_activity_at")?,
        total_questions: row.get("total_questions")?,
        answered_questions: row.get("answered_questions")?,
        progress_percent: row.get("progress_percent")?,
        completion_signal: row.get("completion_signal")?,
        analysis_status: status.as_deref().and_then(AnalysisStatus::parse),
        auto_score_triggered: row.get("auto_score_triggered")?,
        analysis_started_at: row.get("analysis_started_at")?,
        analysis_completed_at: row.get("analysis_completed_at")?,
        interview_duration_secs: row.get("interview_duration_secs")?,
        overall_score: row.get("overall_score")?,
        technical_score: row.get("technical_score")?,
        communication_score: row.get("communication_score")?,
        problem_solving_score: row.get("problem_solving_score")?,
        cultural_fit_score: row.get("cultural_fit_score")?,
        confidence: row.get("confidence")?,
        scoring_method: row.get("scoring_method")?,
        feedback: row.get("feedback")?,
        final_verdict: verdict.as_deref().and_then(Verdict::parse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::METHOD_RULE_BASED;

    async fn seed(store: &CandidateStore, id: i64) {
        store
            .insert(&CandidateRecord::new(id, "Dana Reyes", "Backend Engineer"))
            .await
            .unwrap();
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            technical_score: 72.0,
            communication_score: 68.0,
            problem_solving_score: 64.0,
            cultural_fit_score: 70.0,
            overall_score: 69.0,
            strengths: vec!["Detailed responses".to_string()],
            weaknesses: vec!["Limited technical vocabulary".to_string()],
            recommendations: vec!["Technical screening recommended".to_string()],
            feedback: "report".to_string(),
            confidence: 0.75,
            method: METHOD_RULE_BASED.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mark_completed_is_idempotent() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;

        let now = Utc::now();
        assert!(store.mark_completed(1, now).await.unwrap());
        assert!(!store.mark_completed(1, now).await.unwrap());

        let record = store.fetch_required(1).await.unwrap();
        assert!(record.completed_at.is_some());
        assert_eq!(record.analysis_status, Some(AnalysisStatus::Pending));
        // No started_at on record, so duration is stored as zero
        assert_eq!(record.interview_duration_secs, Some(0));
    }

    #[tokio::test]
    async fn test_enqueue_claim_single_winner() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;
        store.mark_completed(1, Utc::now()).await.unwrap();

        assert!(store.try_claim_for_enqueue(1).await.unwrap());
        assert!(!store.try_claim_for_enqueue(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_for_processing_excludes_terminal() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;
        store.mark_completed(1, Utc::now()).await.unwrap();

        assert!(store.claim_for_processing(1, Utc::now()).await.unwrap());
        // Second claim loses while the first is in flight
        assert!(!store.claim_for_processing(1, Utc::now()).await.unwrap());

        store
            .save_result(
                1,
                &sample_result(),
                AnalysisStatus::Completed,
                Verdict::Review,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(!store.claim_for_processing(1, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_pending_scan_filters() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;
        seed(&store, 2).await;
        seed(&store, 3).await;

        // 1: eligible; 2: not completed; 3: flag already set
        store.mark_completed(1, Utc::now()).await.unwrap();
        store.mark_completed(3, Utc::now()).await.unwrap();
        store.try_claim_for_enqueue(3).await.unwrap();

        let pending = store.fetch_pending(10).await.unwrap();
        let ids: Vec<i64> = pending.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_stale_scan_and_retry_reset() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;
        let started = Utc::now() - ChronoDuration::hours(2);
        store.mark_completed(1, started).await.unwrap();
        store.try_claim_for_enqueue(1).await.unwrap();
        store.claim_for_processing(1, started).await.unwrap();

        let stale = store
            .fetch_stale(ChronoDuration::seconds(3600), Utc::now())
            .await
            .unwrap();
        assert_eq!(stale, vec![1]);

        store.reset_for_retry(1).await.unwrap();
        let record = store.fetch_required(1).await.unwrap();
        assert_eq!(record.analysis_status, Some(AnalysisStatus::Retry));
        assert!(!record.auto_score_triggered);

        // Pending scan picks the retry candidate up again
        let pending = store.fetch_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_save_result_round_trip() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;
        store.mark_completed(1, Utc::now()).await.unwrap();

        store
            .save_result(
                1,
                &sample_result(),
                AnalysisStatus::Completed,
                Verdict::Review,
                Utc::now(),
            )
            .await
            .unwrap();

        let record = store.fetch_required(1).await.unwrap();
        assert_eq!(record.analysis_status, Some(AnalysisStatus::Completed));
        assert_eq!(record.final_verdict, Some(Verdict::Review));
        assert_eq!(record.overall_score, Some(69.0));
        assert!(record.analysis_completed_at.is_some());

        let strengths = store.fetch_insights(1, InsightKind::Strength).await.unwrap();
        assert_eq!(strengths, vec!["Detailed responses".to_string()]);
        let recs = store
            .fetch_insights(1, InsightKind::Recommendation)
            .await
            .unwrap();
        assert_eq!(recs.len(), 1);
    }

    #[tokio::test]
    async fn test_transcript_updates_progress() {
        let store = CandidateStore::open_in_memory().unwrap();
        seed(&store, 1).await;

        store
            .append_transcript(
                1,
                &[
                    TranscriptEntry::new("Tell me about yourself", "I build backend systems."),
                    TranscriptEntry::new("What is a mutex?", ""),
                ],
            )
            .await
            .unwrap();

        let record = store.fetch_required(1).await.unwrap();
        assert_eq!(record.total_questions, 2);
        assert_eq!(record.answered_questions, 1);
        assert!((record.progress_percent - 50.0).abs() < f64::EPSILON);
        assert!(record.last_activity_at.is_some());

        let transcript = store.fetch_transcript(1).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].question, "Tell me about yourself");
    }
}
