//! Match candidate production: score a pool against one user via the
//! compatibility matrix and keep the top entries.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compatibility::CompatibilityMatrix;
use crate::profile::{Gender, UserProfile};

pub const DEFAULT_MATCH_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub profile: UserProfile,
    pub compatibility_score: u8,
    pub match_reason: String,
}

/// Optional filters applied before scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Falls back to the producer's default limit.
    pub limit: Option<usize>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
}

impl MatchQuery {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    fn admits(&self, candidate: &UserProfile) -> bool {
        if let Some(gender) = self.gender {
            if candidate.gender != Some(gender) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if candidate.location.city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("user {user_id} not found in candidate pool")]
    NotFound { user_id: String },
}

#[derive(Debug, Clone)]
pub struct MatchProducer {
    matrix: Arc<CompatibilityMatrix>,
    default_limit: usize,
}

impl MatchProducer {
    pub fn new(matrix: Arc<CompatibilityMatrix>) -> Self {
        Self {
            matrix,
            default_limit: DEFAULT_MATCH_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Rank `pool` against `user`: score descending, ties by candidate id.
    /// The user's own id and repeated ids are skipped (first occurrence wins).
    pub fn rank(
        &self,
        user: &UserProfile,
        pool: &[UserProfile],
        query: &MatchQuery,
    ) -> Vec<MatchCandidate> {
        let limit = query.limit.unwrap_or(self.default_limit);
        let mine = user.archetype();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut scored: Vec<(&UserProfile, u8)> = Vec::with_capacity(pool.len());
        for candidate in pool {
            if candidate.id == user.id || !seen.insert(candidate.id.as_str()) {
                continue;
            }
            if !query.admits(candidate) {
                continue;
            }
            let score = self.matrix.compatibility(mine, candidate.archetype()).score;
            scored.push((candidate, score));
        }

        scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)));
        debug!(
            user = %user.id,
            pool = pool.len(),
            eligible = scored.len(),
            limit,
            "ranked match candidates"
        );

        scored
            .into_iter()
            .take(limit)
            .map(|(c, score)| MatchCandidate {
                match_reason: self.matrix.match_reason(mine, c.archetype()).to_string(),
                compatibility_score: score,
                profile: c.clone(),
            })
            .collect()
    }

    /// Like [`rank`](Self::rank), looking the user up in `pool` by id.
    pub fn rank_for_user_id(
        &self,
        user_id: &str,
        pool: &[UserProfile],
        query: &MatchQuery,
    ) -> Result<Vec<MatchCandidate>, MatchError> {
        let user = pool
            .iter()
            .find(|p| p.id == user_id)
            .ok_or_else(|| MatchError::NotFound {
                user_id: user_id.to_string(),
            })?;
        Ok(self.rank(user, pool, query))
    }
}
