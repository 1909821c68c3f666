//! Engine configuration: defaults, a JSON file, and `INYEON_*` overrides.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::matching::DEFAULT_MATCH_LIMIT;
use crate::store::SqliteAssessmentStore;

pub const ENV_INSIGHT_TTL_SECS: &str = "INYEON_INSIGHT_TTL_SECS";
pub const ENV_INSIGHT_CACHE_CAPACITY: &str = "INYEON_INSIGHT_CACHE_CAPACITY";
pub const ENV_MATCH_LIMIT: &str = "INYEON_MATCH_LIMIT";
pub const ENV_CONTENT_DIR: &str = "INYEON_CONTENT_DIR";
pub const ENV_STORE_PATH: &str = "INYEON_STORE_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub insight_ttl_secs: u64,
    /// Zero disables the insight cache.
    pub insight_cache_capacity: usize,
    pub default_match_limit: usize,
    /// Directory holding `questions.json`, `compatibility.json` and
    /// `insights.json`; built-in tables are used when unset.
    pub content_dir: Option<PathBuf>,
    pub store_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            insight_ttl_secs: 3600,
            insight_cache_capacity: 10_000,
            default_match_limit: DEFAULT_MATCH_LIMIT,
            content_dir: None,
            store_path: PathBuf::from(".inyeon_assessments.sqlite"),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            store_path: SqliteAssessmentStore::default_path(),
            ..Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from `lookup`, which maps an env var name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_INSIGHT_TTL_SECS) {
            self.insight_ttl_secs = parse_env(ENV_INSIGHT_TTL_SECS, v)?;
        }
        if let Some(v) = lookup(ENV_INSIGHT_CACHE_CAPACITY) {
            self.insight_cache_capacity = parse_env(ENV_INSIGHT_CACHE_CAPACITY, v)?;
        }
        if let Some(v) = lookup(ENV_MATCH_LIMIT) {
            self.default_match_limit = parse_env(ENV_MATCH_LIMIT, v)?;
        }
        if let Some(v) = lookup(ENV_CONTENT_DIR) {
            if !v.trim().is_empty() {
                self.content_dir = Some(PathBuf::from(v));
            }
        }
        if let Some(v) = lookup(ENV_STORE_PATH) {
            if !v.trim().is_empty() {
                self.store_path = PathBuf::from(v);
            }
        }
        Ok(())
    }

    /// Values beyond what `TimeDelta` can hold clamp to `TimeDelta::MAX`.
    pub fn insight_ttl(&self) -> TimeDelta {
        i64::try_from(self.insight_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inyeon.json");
        std::fs::write(&path, r#"{"insight_ttl_secs": 60}"#).unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.insight_ttl_secs, 60);
        assert_eq!(config.insight_cache_capacity, 10_000);
        assert_eq!(config.default_match_limit, 20);
    }

    #[test]
    fn env_overlay_parses_and_rejects() {
        let vars: HashMap<&str, &str> = [
            (ENV_MATCH_LIMIT, " 5 "),
            (ENV_CONTENT_DIR, "/srv/content"),
        ]
        .into_iter()
        .collect();
        let mut config = EngineConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.default_match_limit, 5);
        assert_eq!(config.content_dir, Some(PathBuf::from("/srv/content")));

        let err = config
            .apply_env(|k| (k == ENV_INSIGHT_TTL_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_INSIGHT_TTL_SECS,
                ..
            }
        ));
    }

    #[test]
    fn oversized_ttl_clamps_instead_of_panicking() {
        let mut config = EngineConfig::default();
        config
            .apply_env(|k| (k == ENV_INSIGHT_TTL_SECS).then(|| u64::MAX.to_string()))
            .unwrap();
        assert_eq!(config.insight_ttl(), TimeDelta::MAX);

        config.insight_ttl_secs = i64::MAX as u64;
        assert_eq!(config.insight_ttl(), TimeDelta::MAX);

        config.insight_ttl_secs = 90;
        assert_eq!(config.insight_ttl(), TimeDelta::seconds(90));
    }
}
