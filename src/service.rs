//! One handle over content, insight engine, and match producer.

use std::sync::Arc;

use tracing::info;

use crate::archetype::{Archetype, ArchetypeProfile};
use crate::assessment::{classify, record_assessment, AnswerSheet, Assessment, AssessmentError};
use crate::cache::InsightCache;
use crate::clock::{Clock, SystemClock};
use crate::compatibility::CompatibilityReport;
use crate::config::EngineConfig;
use crate::content::{ContentError, ContentSet};
use crate::insights::{InsightBuilder, InsightBundle, InsightEngine, RuleBasedInsights};
use crate::matching::{MatchCandidate, MatchError, MatchProducer, MatchQuery};
use crate::profile::UserProfile;
use crate::store::AssessmentStore;

pub struct Matchmaker {
    content: ContentSet,
    insights: InsightEngine,
    producer: MatchProducer,
}

impl Matchmaker {
    /// Load content per `config` and wire the rule-based builder with the
    /// system clock.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ContentError> {
        let content = match &config.content_dir {
            Some(dir) => ContentSet::load_dir(dir)?,
            None => ContentSet::builtin()?,
        };
        Ok(Self::with_clock(content, config, Arc::new(SystemClock)))
    }

    pub fn with_clock(content: ContentSet, config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let builder: Arc<dyn InsightBuilder> = Arc::new(RuleBasedInsights::new(
            Arc::clone(&content.matrix),
            Arc::clone(&content.copy),
        ));
        Self::with_builder(content, config, builder, clock)
    }

    pub fn with_builder(
        content: ContentSet,
        config: &EngineConfig,
        builder: Arc<dyn InsightBuilder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = InsightCache::new(
            config.insight_ttl(),
            config.insight_cache_capacity,
            Arc::clone(&clock),
        );
        let producer = MatchProducer::new(Arc::clone(&content.matrix))
            .with_default_limit(config.default_match_limit);
        info!(
            fingerprint = %content.fingerprint(),
            questions = content.questions.len(),
            "matchmaker ready"
        );
        Self {
            insights: InsightEngine::new(builder, cache, clock),
            content,
            producer,
        }
    }

    pub fn content(&self) -> &ContentSet {
        &self.content
    }

    pub fn insight_engine(&self) -> &InsightEngine {
        &self.insights
    }

    /// Display name, description and tags for an archetype.
    pub fn archetype_profile(&self, archetype: Archetype) -> &ArchetypeProfile {
        self.content.matrix.profile(archetype)
    }

    pub fn classify(&self, sheet: &AnswerSheet) -> Result<Assessment, AssessmentError> {
        classify(&self.content.questions, sheet)
    }

    pub async fn record_assessment(
        &self,
        store: &dyn AssessmentStore,
        user_id: &str,
        sheet: &AnswerSheet,
    ) -> Result<Assessment, AssessmentError> {
        record_assessment(
            &self.content.questions,
            self.content.fingerprint(),
            store,
            user_id,
            sheet,
        )
        .await
    }

    pub fn compatibility(&self, a: &UserProfile, b: &UserProfile) -> CompatibilityReport {
        self.content.matrix.compatibility(a.archetype(), b.archetype())
    }

    pub fn insights(&self, a: &UserProfile, b: &UserProfile) -> Arc<InsightBundle> {
        self.insights.insights(a, b)
    }

    pub fn matches(
        &self,
        user: &UserProfile,
        pool: &[UserProfile],
        query: &MatchQuery,
    ) -> Vec<MatchCandidate> {
        self.producer.rank(user, pool, query)
    }

    pub fn matches_for_user_id(
        &self,
        user_id: &str,
        pool: &[UserProfile],
        query: &MatchQuery,
    ) -> Result<Vec<MatchCandidate>, MatchError> {
        self.producer.rank_for_user_id(user_id, pool, query)
    }
}
