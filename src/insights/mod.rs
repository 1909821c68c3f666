//! Per-pair relationship insights.
//!
//! An [`InsightBuilder`] turns two profiles into an [`InsightBundle`]; the
//! [`InsightEngine`] wraps a builder with the TTL cache and the fallback
//! bundle so callers always get a complete result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod copy;
pub mod dates;
mod fallback;
pub mod long_term;
pub mod rules;

pub use copy::InsightCopy;
pub use dates::{DateIdea, Season};
pub use fallback::fallback_bundle;
pub use long_term::{LongTermCompatibility, LongTermFactors, Outlook};
pub use rules::RuleBasedInsights;

use crate::cache::{CacheStats, InsightCache, PairKey};
use crate::clock::Clock;
use crate::compatibility::CompatibilityReport;
use crate::profile::UserProfile;

// =============================================================================
// Bundle
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
}

/// Which profile attribute a challenge or strength was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Children,
    MaritalStatus,
    Location,
    WorkSchedule,
    Interests,
    Age,
    Archetype,
    SocialLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub kind: FindingKind,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strength {
    pub kind: FindingKind,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationTip {
    pub tip: String,
    pub priority: Priority,
}

/// Everything generated for one pair of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightBundle {
    pub compatibility_analysis: CompatibilityReport,
    pub conversation_starters: Vec<String>,
    pub relationship_advice: Vec<String>,
    pub potential_challenges: Vec<Challenge>,
    pub strength_areas: Vec<Strength>,
    pub date_ideas: Vec<DateIdea>,
    pub communication_tips: Vec<CommunicationTip>,
    pub long_term_compatibility: LongTermCompatibility,
    pub generated_at: DateTime<Utc>,
    /// Set when generation failed and the generic bundle was returned.
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("missing insight copy: {0}")]
    MissingCopy(String),
    #[error("insight builder panicked: {0}")]
    Panicked(String),
}

pub trait InsightBuilder: Send + Sync {
    fn build(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<InsightBundle, InsightError>;
}

// =============================================================================
// Engine
// =============================================================================

pub struct InsightEngine {
    builder: Arc<dyn InsightBuilder>,
    cache: InsightCache,
    clock: Arc<dyn Clock>,
}

impl InsightEngine {
    pub fn new(
        builder: Arc<dyn InsightBuilder>,
        cache: InsightCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            builder,
            cache,
            clock,
        }
    }

    /// Insights for the unordered pair `{a, b}`. Never fails: a builder
    /// error or panic yields the generic fallback bundle, which is not cached.
    pub fn insights(&self, a: &UserProfile, b: &UserProfile) -> Arc<InsightBundle> {
        let key = PairKey::new(&a.id, &b.id);
        if let Some(hit) = self.cache.get(&key) {
            debug!(pair = %key, "insight cache hit");
            return hit;
        }

        let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };
        let now = self.clock.now();
        let built = catch_unwind(AssertUnwindSafe(|| self.builder.build(first, second, now)))
            .unwrap_or_else(|payload| {
                Err(InsightError::Panicked(panic_message(payload.as_ref())))
            });

        match built {
            Ok(bundle) => {
                let bundle = Arc::new(bundle);
                self.cache.insert(key, Arc::clone(&bundle));
                bundle
            }
            Err(err) => {
                warn!(pair = %key, error = %err, "insight generation failed; using fallback");
                Arc::new(fallback_bundle(now))
            }
        }
    }

    pub fn cache(&self) -> &InsightCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
