//! SQLite-backed store for completed assessments.

use async_trait::async_trait;
use fs2::FileExt;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::archetype::{Archetype, TraitScores};
use crate::assessment::{AnswerSheet, Assessment};
use crate::profile::AssessmentSummary;

/// A persisted assessment, keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub user_id: String,
    pub archetype: Archetype,
    pub traits: TraitScores,
    pub confidence: u8,
    pub question_bank_version: String,
    /// blake3 of the content tables the answers were scored against.
    pub bank_fingerprint: String,
    /// blake3 of the raw answer indices.
    pub answers_hash: String,
}

impl AssessmentRecord {
    pub fn new(
        user_id: &str,
        assessment: &Assessment,
        bank_fingerprint: &str,
        sheet: &AnswerSheet,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            archetype: assessment.archetype,
            traits: assessment.traits.clone(),
            confidence: assessment.confidence,
            question_bank_version: assessment.question_bank_version.clone(),
            bank_fingerprint: bank_fingerprint.to_string(),
            answers_hash: hash_answers(sheet),
        }
    }

    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            archetype: self.archetype,
            confidence: Some(self.confidence),
            traits: self.traits.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("task join error: {0}")]
    Join(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<AssessmentRecord>, StoreError>;
    async fn put(&self, record: &AssessmentRecord) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteAssessmentStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAssessmentStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=NORMAL;\
             CREATE TABLE IF NOT EXISTS assessments (\
               user_id TEXT PRIMARY KEY,\
               archetype TEXT NOT NULL,\
               traits TEXT NOT NULL,\
               confidence INTEGER NOT NULL,\
               question_bank_version TEXT NOT NULL,\
               bank_fingerprint TEXT NOT NULL,\
               answers_hash TEXT NOT NULL,\
               created_at INTEGER NOT NULL,\
               updated_at INTEGER NOT NULL\
             );",
        )?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("INYEON_STORE_PATH") {
            return PathBuf::from(path);
        }
        PathBuf::from(".inyeon_assessments.sqlite")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_exclusive(&self) -> Result<StoreLock, StoreError> {
        StoreLock::new(&self.path)
    }

    fn with_conn<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Connection) -> Result<R, StoreError>,
    {
        let guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&guard)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<AssessmentRecord, StoreError> {
    let archetype: String = row.get(1)?;
    let traits: String = row.get(2)?;
    Ok(AssessmentRecord {
        user_id: row.get(0)?,
        archetype: archetype.parse().map_err(StoreError::Serde)?,
        traits: serde_json::from_str(&traits).map_err(|e| StoreError::Serde(e.to_string()))?,
        confidence: row.get::<_, i64>(3)?.clamp(0, 100) as u8,
        question_bank_version: row.get(4)?,
        bank_fingerprint: row.get(5)?,
        answers_hash: row.get(6)?,
    })
}

#[async_trait]
impl AssessmentStore for SqliteAssessmentStore {
    async fn get(&self, user_id: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        let user_id = user_id.to_string();
        let conn = self.clone();
        tokio::task::spawn_blocking(move || {
            conn.with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, archetype, traits, confidence, question_bank_version,\
                            bank_fingerprint, answers_hash \
                     FROM assessments WHERE user_id = ?1",
                )?;
                let mut rows = stmt.query(params![user_id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row_to_record(row)?)),
                    None => Ok(None),
                }
            })
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    async fn put(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        let record = record.clone();
        let traits =
            serde_json::to_string(&record.traits).map_err(|e| StoreError::Serde(e.to_string()))?;
        let conn = self.clone();
        tokio::task::spawn_blocking(move || {
            conn.with_conn(|conn| {
                let now = now_epoch();
                conn.execute(
                    "INSERT INTO assessments (\
                        user_id, archetype, traits, confidence, question_bank_version,\
                        bank_fingerprint, answers_hash, created_at, updated_at\
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                     ON CONFLICT(user_id) DO UPDATE SET \
                        archetype = excluded.archetype,\
                        traits = excluded.traits,\
                        confidence = excluded.confidence,\
                        question_bank_version = excluded.question_bank_version,\
                        bank_fingerprint = excluded.bank_fingerprint,\
                        answers_hash = excluded.answers_hash,\
                        updated_at = excluded.updated_at",
                    params![
                        record.user_id,
                        record.archetype.as_str(),
                        traits,
                        record.confidence as i64,
                        record.question_bank_version,
                        record.bank_fingerprint,
                        record.answers_hash,
                        now,
                        now,
                    ],
                )?;
                Ok(())
            })
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}

#[derive(Debug)]
pub struct StoreLock {
    _file: std::fs::File,
}

impl StoreLock {
    fn new(db_path: &Path) -> Result<Self, StoreError> {
        let mut lock_path = db_path.to_path_buf();
        lock_path.set_extension("lock");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock_path)?;
        file.lock_exclusive()?;
        Ok(Self { _file: file })
    }
}

#[derive(Debug, Serialize)]
pub struct StoreExportRow {
    #[serde(flatten)]
    pub record: AssessmentRecord,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorePruneStats {
    pub deleted: usize,
    pub remaining: usize,
}

impl SqliteAssessmentStore {
    pub async fn export_jsonl(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = self.clone();
        tokio::task::spawn_blocking(move || {
            conn.with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, archetype, traits, confidence, question_bank_version,\
                            bank_fingerprint, answers_hash, created_at, updated_at \
                     FROM assessments ORDER BY updated_at DESC, user_id ASC",
                )?;
                let mut rows = stmt.query([])?;
                let mut file = std::fs::File::create(path)?;
                while let Some(row) = rows.next()? {
                    let export = StoreExportRow {
                        record: row_to_record(row)?,
                        created_at: row.get(7)?,
                        updated_at: row.get(8)?,
                    };
                    let line = serde_json::to_string(&export)
                        .map_err(|e| StoreError::Serde(e.to_string()))?;
                    use std::io::Write;
                    writeln!(file, "{line}")?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    /// Delete assessments not updated within `max_age_days`.
    pub async fn prune(&self, max_age_days: u64) -> Result<StorePruneStats, StoreError> {
        let conn = self.clone();
        tokio::task::spawn_blocking(move || {
            conn.with_conn(|conn| {
                let cutoff =
                    now_epoch().saturating_sub((max_age_days as i64).saturating_mul(86_400));
                let deleted = conn.execute(
                    "DELETE FROM assessments WHERE updated_at < ?1",
                    params![cutoff],
                )?;
                let remaining: Option<i64> = conn
                    .query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))
                    .optional()?;
                Ok(StorePruneStats {
                    deleted,
                    remaining: remaining.unwrap_or(0).max(0) as usize,
                })
            })
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}

fn hash_answers(sheet: &AnswerSheet) -> String {
    let mut hasher = blake3::Hasher::new();
    for (idx, answer) in sheet.answers.iter().enumerate() {
        if idx > 0 {
            hasher.update(b"|");
        }
        match answer {
            Some(choice) => hasher.update(choice.to_string().as_bytes()),
            None => hasher.update(b"-"),
        };
    }
    hasher.finalize().to_hex().to_string()
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
