//! Versioned copy and scoring tables.
//!
//! The question bank, compatibility matrix and insight copy ship embedded
//! in the binary and can be replaced at runtime from a directory holding
//! any of `questions.json`, `compatibility.json` and `insights.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::assessment::QuestionBank;
use crate::compatibility::{CompatibilityMatrix, CompatibilityTable};
use crate::insights::InsightCopy;

pub const BUILTIN_QUESTIONS: &str = include_str!("../content/questions.json");
pub const BUILTIN_COMPATIBILITY: &str = include_str!("../content/compatibility.json");
pub const BUILTIN_INSIGHTS: &str = include_str!("../content/insights.json");

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {table} table: {message}")]
    Invalid { table: &'static str, message: String },
}

impl ContentError {
    pub fn invalid(table: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            table,
            message: message.into(),
        }
    }
}

/// All tables the engine needs, validated together.
#[derive(Debug, Clone)]
pub struct ContentSet {
    pub questions: Arc<QuestionBank>,
    pub matrix: Arc<CompatibilityMatrix>,
    pub copy: Arc<InsightCopy>,
    fingerprint: String,
}

impl ContentSet {
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_sources(BUILTIN_QUESTIONS, BUILTIN_COMPATIBILITY, BUILTIN_INSIGHTS)
    }

    /// Load tables from `dir`, using the embedded copy for any file absent there.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
        let dir = dir.as_ref();
        let questions = read_or_builtin(dir, "questions.json", BUILTIN_QUESTIONS)?;
        let compatibility = read_or_builtin(dir, "compatibility.json", BUILTIN_COMPATIBILITY)?;
        let insights = read_or_builtin(dir, "insights.json", BUILTIN_INSIGHTS)?;
        Self::from_sources(&questions, &compatibility, &insights)
    }

    pub fn from_sources(
        questions: &str,
        compatibility: &str,
        insights: &str,
    ) -> Result<Self, ContentError> {
        let bank: QuestionBank = parse("questions", questions)?;
        bank.validate()?;

        let table: CompatibilityTable = parse("compatibility", compatibility)?;
        let matrix = CompatibilityMatrix::from_table(table)?;

        let copy: InsightCopy = parse("insights", insights)?;
        copy.validate()?;

        Ok(Self {
            questions: Arc::new(bank),
            matrix: Arc::new(matrix),
            copy: Arc::new(copy),
            fingerprint: fingerprint(&[questions, compatibility, insights]),
        })
    }

    /// blake3 over the three raw tables; changes whenever any copy changes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    table: &'static str,
    raw: &str,
) -> Result<T, ContentError> {
    serde_json::from_str(raw).map_err(|source| ContentError::Parse { table, source })
}

fn read_or_builtin(dir: &Path, name: &str, builtin: &str) -> Result<String, ContentError> {
    let path = dir.join(name);
    if !path.exists() {
        debug!(path = %path.display(), "content override absent; using embedded table");
        return Ok(builtin.to_string());
    }
    std::fs::read_to_string(&path).map_err(|source| {
        warn!(path = %path.display(), error = %source, "content override unreadable");
        ContentError::Io { path, source }
    })
}

fn fingerprint(fields: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            hasher.update(b"|");
        }
        hasher.update(field.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_validate() {
        let content = ContentSet::builtin().unwrap();
        assert_eq!(content.questions.len(), 15);
        assert_eq!(content.fingerprint().len(), 64);
    }

    #[test]
    fn load_dir_falls_back_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut bank: QuestionBank = serde_json::from_str(BUILTIN_QUESTIONS).unwrap();
        bank.version = "test-override".to_string();
        bank.questions.truncate(3);
        std::fs::write(
            dir.path().join("questions.json"),
            serde_json::to_string(&bank).unwrap(),
        )
        .unwrap();

        let content = ContentSet::load_dir(dir.path()).unwrap();
        assert_eq!(content.questions.version, "test-override");
        assert_eq!(content.questions.len(), 3);
        assert_ne!(content.fingerprint(), ContentSet::builtin().unwrap().fingerprint());
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let raw = BUILTIN_QUESTIONS.replacen("\"family\": 3", "\"family\": 5", 1);
        let err = ContentSet::from_sources(&raw, BUILTIN_COMPATIBILITY, BUILTIN_INSIGHTS)
            .unwrap_err();
        assert!(matches!(err, ContentError::Invalid { table: "questions", .. }));
    }
}
