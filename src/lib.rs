#![forbid(unsafe_code)]

//! # inyeon-match
//!
//! Matching core for a dating service aimed at people in their 40s to 70s.
//!
//! A 15-question values assessment classifies each user into one of five
//! archetypes. A hand-authored compatibility table scores every pair of
//! archetypes, and a rule engine turns two profiles into a bundle of
//! conversation starters, advice, date ideas and a long-term outlook.
//! Candidate pools are ranked against the same table.
//!
//! All narrative copy lives in versioned JSON tables under `content/`, so
//! wording can change without touching the scoring logic.

pub mod archetype;
pub mod assessment;
pub mod cache;
pub mod clock;
pub mod compatibility;
pub mod config;
pub mod content;
pub mod insights;
pub mod matching;
pub mod profile;
pub mod service;
pub mod store;

pub use archetype::{Archetype, ArchetypeProfile, Trait, TraitScores};
pub use assessment::{
    classify, record_assessment, AnswerSheet, Assessment, AssessmentError, QuestionBank,
};
pub use cache::{CacheStats, InsightCache, PairKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compatibility::{
    CompatibilityBand, CompatibilityMatrix, CompatibilityReport, DEFAULT_SCORE,
};
pub use config::{ConfigError, EngineConfig};
pub use content::{ContentError, ContentSet};
pub use insights::{
    InsightBuilder, InsightBundle, InsightEngine, InsightError, RuleBasedInsights, Season,
};
pub use matching::{MatchCandidate, MatchError, MatchProducer, MatchQuery};
pub use profile::{normalize, normalize_many, ProfileError, UserProfile};
pub use service::Matchmaker;
pub use store::{AssessmentRecord, AssessmentStore, SqliteAssessmentStore, StoreError};
