use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use inyeon_match::insights::{
    FindingKind, InsightBuilder, InsightBundle, InsightEngine, InsightError, Season,
};
use inyeon_match::profile::{AgeBracket, Level, MaritalStatus, WorkSchedule};
use inyeon_match::{
    normalize, Archetype, ContentSet, InsightCache, ManualClock, RuleBasedInsights, UserProfile,
};
use serde_json::json;

struct Counting {
    inner: RuleBasedInsights,
    calls: AtomicUsize,
}

impl InsightBuilder for Counting {
    fn build(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<InsightBundle, InsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.build(a, b, now)
    }
}

struct Panicking;

impl InsightBuilder for Panicking {
    fn build(
        &self,
        _a: &UserProfile,
        _b: &UserProfile,
        _now: DateTime<Utc>,
    ) -> Result<InsightBundle, InsightError> {
        panic!("copy table exploded");
    }
}

fn rules() -> RuleBasedInsights {
    let content = ContentSet::builtin().unwrap();
    RuleBasedInsights::new(content.matrix, content.copy)
}

fn clock_at(y: i32, m: u32, d: u32) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(y, m, d, 3, 0, 0).unwrap()))
}

fn engine_with(builder: Arc<dyn InsightBuilder>, clock: Arc<ManualClock>) -> InsightEngine {
    let cache = InsightCache::new(Duration::hours(1), 128, clock.clone());
    InsightEngine::new(builder, cache, clock)
}

fn assert_complete(bundle: &InsightBundle) {
    let value = serde_json::to_value(bundle).unwrap();
    for field in [
        "compatibilityAnalysis",
        "conversationStarters",
        "relationshipAdvice",
        "potentialChallenges",
        "strengthAreas",
        "dateIdeas",
        "communicationTips",
        "longTermCompatibility",
    ] {
        assert!(value.get(field).is_some(), "missing {field}");
    }
    assert!(!bundle.conversation_starters.is_empty());
    assert!(bundle.conversation_starters.len() <= 5);
    assert!(bundle.relationship_advice.len() >= 2);
    assert!(!bundle.date_ideas.is_empty());
    assert!(bundle.date_ideas.len() <= 8);
    assert!(bundle.communication_tips.len() >= 5);
    assert!(bundle.long_term_compatibility.score <= 100);
}

#[test]
fn sparse_and_odd_profiles_still_get_full_bundles() {
    let builder = rules();
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();

    let bare = UserProfile::new("bare");
    let mut odd = UserProfile::new("odd");
    odd.interests = vec!["스카이다이빙".into()];
    odd.age = Some(AgeBracket::Over70);
    odd.lifestyle.fitness_level = Some(Level::High);

    for (a, b) in [(&bare, &odd), (&odd, &bare), (&bare, &bare), (&odd, &odd)] {
        let bundle = builder.build(a, b, now).unwrap();
        assert_complete(&bundle);
        assert!(!bundle.fallback);
    }
}

#[test]
fn self_pair_through_engine_is_complete() {
    let engine = engine_with(Arc::new(rules()), clock_at(2024, 6, 1));
    let me = normalize(json!({
        "id": "same",
        "age": "61-65",
        "location": "부산 해운대구",
        "interests": ["여행", "사진"],
        "lifestyle": { "social": "low", "fitness": "medium" },
        "personalityType": "PeacefulNaturalist",
    }))
    .unwrap();
    let bundle = engine.insights(&me, &me);
    assert_complete(&bundle);
    assert!(bundle.potential_challenges.is_empty());
    assert_eq!(bundle.compatibility_analysis.score, 85);
}

#[test]
fn repeat_calls_hit_the_cache_until_ttl() {
    let counting = Arc::new(Counting {
        inner: rules(),
        calls: AtomicUsize::new(0),
    });
    let clock = clock_at(2024, 9, 10);
    let engine = engine_with(counting.clone(), clock.clone());

    let a = UserProfile::new("u1");
    let b = UserProfile::new("u2");

    let first = engine.insights(&a, &b);
    let second = engine.insights(&b, &a);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::minutes(59));
    let third = engine.insights(&a, &b);
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::minutes(2));
    let fourth = engine.insights(&a, &b);
    assert!(!Arc::ptr_eq(&first, &fourth));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.cache_stats().hits, 2);
}

#[test]
fn panicking_builder_degrades_to_fallback() {
    let engine = engine_with(Arc::new(Panicking), clock_at(2024, 3, 3));
    let a = UserProfile::new("a");
    let b = UserProfile::new("b");

    let bundle = engine.insights(&a, &b);
    assert!(bundle.fallback);
    assert_complete(&bundle);
    assert_eq!(bundle.compatibility_analysis.score, 70);

    // Fallbacks are not cached, so every call retries the builder.
    let again = engine.insights(&a, &b);
    assert!(!Arc::ptr_eq(&bundle, &again));
    assert!(engine.cache().is_empty());
}

#[test]
fn seasonal_ideas_follow_korean_calendar_month() {
    let builder = rules();
    let content = ContentSet::builtin().unwrap();
    let a = UserProfile::new("a");
    let b = UserProfile::new("b");

    // 2024-11-30 20:00 UTC is already December in Korea.
    let now = Utc.with_ymd_and_hms(2024, 11, 30, 20, 0, 0).unwrap();
    let bundle = builder.build(&a, &b, now).unwrap();
    let winter = &content.copy.date_ideas.seasonal[&Season::Winter];
    assert!(winter
        .iter()
        .all(|idea| bundle.date_ideas.iter().any(|d| d.title == idea.title)));
}

#[test]
fn findings_cover_every_categorical_rule() {
    let builder = rules();
    let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

    let mut a = UserProfile::new("a");
    a.has_children = Some(true);
    a.marital_status = Some(MaritalStatus::Divorced);
    a.location.city = Some("서울".into());
    a.occupation.schedule = Some(WorkSchedule::Shift);
    a.assessment = Some(inyeon_match::profile::AssessmentSummary::new(Archetype::GrowthSeeker));
    let mut b = a.clone();
    b.id = "b".into();
    b.has_children = Some(false);
    b.marital_status = Some(MaritalStatus::Widowed);
    b.location.city = Some("대구".into());
    b.occupation.schedule = Some(WorkSchedule::Retired);

    let bundle = builder.build(&a, &b, now).unwrap();
    assert_eq!(bundle.potential_challenges.len(), 4);
    let kinds: Vec<FindingKind> = bundle.strength_areas.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![FindingKind::Archetype]);
    assert_eq!(bundle.compatibility_analysis.score, 74);
}
