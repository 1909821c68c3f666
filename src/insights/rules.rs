//! Rule-based insight sections.
//!
//! Each section is a fixed sequence of categorical checks over the two
//! profiles; output order is rule order.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::copy::{fill, FindingCopy, InsightCopy, GENERIC_TIP_COUNT};
use super::dates::{date_ideas, Season};
use super::long_term::long_term;
use super::{
    Challenge, CommunicationTip, FindingKind, InsightBuilder, InsightBundle, InsightError,
    Priority, Severity, Strength,
};
use crate::clock::kst_month;
use crate::compatibility::{CompatibilityMatrix, CompatibilityReport};
use crate::profile::{Level, UserProfile};

pub const MAX_STARTERS: usize = 5;
/// Bracket start ages further apart than this read as an age gap.
pub const LARGE_AGE_GAP: u32 = 5;
/// Bracket start ages closer than this read as the same generation.
pub const SMALL_AGE_GAP: u32 = 3;
/// How many shared interests are named in the strength description.
const NAMED_INTERESTS: usize = 3;

/// The default builder: deterministic lookups over the copy tables.
#[derive(Debug, Clone)]
pub struct RuleBasedInsights {
    matrix: Arc<CompatibilityMatrix>,
    copy: Arc<InsightCopy>,
}

impl RuleBasedInsights {
    pub fn new(matrix: Arc<CompatibilityMatrix>, copy: Arc<InsightCopy>) -> Self {
        Self { matrix, copy }
    }
}

impl InsightBuilder for RuleBasedInsights {
    fn build(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<InsightBundle, InsightError> {
        let season = Season::from_month(kst_month(now));
        if !self.copy.date_ideas.seasonal.contains_key(&season) {
            return Err(InsightError::MissingCopy(format!("date_ideas.seasonal.{season:?}")));
        }

        let compatibility = self.matrix.compatibility(a.archetype(), b.archetype());

        Ok(InsightBundle {
            conversation_starters: conversation_starters(&self.copy, a, b),
            relationship_advice: relationship_advice(&self.copy, &compatibility, a, b),
            potential_challenges: potential_challenges(&self.copy, a, b),
            strength_areas: strength_areas(&self.copy, &self.matrix, a, b),
            date_ideas: date_ideas(&self.copy.date_ideas, a, b, season),
            communication_tips: communication_tips(&self.copy, &compatibility),
            long_term_compatibility: long_term(&self.copy.long_term, a, b),
            compatibility_analysis: compatibility,
            generated_at: now,
            fallback: false,
        })
    }
}

// ---------------------------------------------------------------------
//  Conversation starters
// ---------------------------------------------------------------------

pub fn conversation_starters(copy: &InsightCopy, a: &UserProfile, b: &UserProfile) -> Vec<String> {
    let s = &copy.starters;
    let mut out: Vec<String> = Vec::new();

    if let Some(interest) = a.shared_interests(b).first() {
        out.push(fill(&s.common_interest, &[("interest", interest.as_str())]));
    }

    if let Some(age) = a.age.or(b.age) {
        out.push(fill(&s.age_label, &[("label", age.label())]));
    }

    if let (Some(x), Some(y)) = (a.lifestyle.social_level, b.lifestyle.social_level) {
        let line = match (x, y) {
            (Level::Low, Level::Low) => &s.social_both_quiet,
            _ if x == y => &s.social_both_outgoing,
            _ => &s.social_mixed,
        };
        out.push(line.clone());
    }

    if let Some(title) = b
        .occupation
        .title
        .as_deref()
        .or(a.occupation.title.as_deref())
    {
        out.push(fill(&s.occupation, &[("occupation", title)]));
    }

    out.extend(s.generic.iter().cloned());
    out.truncate(MAX_STARTERS);
    out
}

// ---------------------------------------------------------------------
//  Relationship advice
// ---------------------------------------------------------------------

pub fn relationship_advice(
    copy: &InsightCopy,
    compatibility: &CompatibilityReport,
    a: &UserProfile,
    b: &UserProfile,
) -> Vec<String> {
    let adv = &copy.advice;
    let mut out: Vec<String> = compatibility.tips.clone();

    if let (Some(x), Some(y)) = (a.age, b.age) {
        let gap = x.gap(&y);
        if gap > LARGE_AGE_GAP {
            out.push(adv.age_gap_large.clone());
        } else if gap < SMALL_AGE_GAP {
            out.push(adv.age_gap_small.clone());
        }
    }

    if differs(a.lifestyle.social_level, b.lifestyle.social_level) {
        out.push(adv.social_mismatch.clone());
    }
    if differs(a.lifestyle.fitness_level, b.lifestyle.fitness_level) {
        out.push(adv.fitness_mismatch.clone());
    }

    out.extend(adv.generic.iter().take(2).cloned());
    out
}

// ---------------------------------------------------------------------
//  Challenges and strengths
// ---------------------------------------------------------------------

fn differs<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x != y)
}

fn matches_known<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

fn challenge(
    kind: FindingKind,
    copy: &FindingCopy,
    severity: Severity,
    vars: &[(&str, &str)],
) -> Challenge {
    Challenge {
        kind,
        title: copy.title.clone(),
        description: fill(&copy.description, vars),
        severity,
    }
}

fn strength(kind: FindingKind, copy: &FindingCopy, vars: &[(&str, &str)]) -> Strength {
    Strength {
        kind,
        title: copy.title.clone(),
        description: fill(&copy.description, vars),
    }
}

pub fn potential_challenges(
    copy: &InsightCopy,
    a: &UserProfile,
    b: &UserProfile,
) -> Vec<Challenge> {
    let f = &copy.findings;
    let mut out = Vec::new();

    if differs(a.has_children, b.has_children) {
        out.push(challenge(FindingKind::Children, &f.children_mismatch, Severity::Medium, &[]));
    }
    if differs(a.marital_status, b.marital_status) {
        out.push(challenge(FindingKind::MaritalStatus, &f.marital_mismatch, Severity::Low, &[]));
    }
    if let (Some(ca), Some(cb)) = (&a.location.city, &b.location.city) {
        if ca != cb {
            out.push(challenge(
                FindingKind::Location,
                &f.different_city,
                Severity::Medium,
                &[("city_a", ca.as_str()), ("city_b", cb.as_str())],
            ));
        }
    }
    if differs(a.occupation.schedule, b.occupation.schedule) {
        out.push(challenge(FindingKind::WorkSchedule, &f.schedule_mismatch, Severity::Low, &[]));
    }
    out
}

pub fn strength_areas(
    copy: &InsightCopy,
    matrix: &CompatibilityMatrix,
    a: &UserProfile,
    b: &UserProfile,
) -> Vec<Strength> {
    let f = &copy.findings;
    let mut out = Vec::new();

    let shared = a.shared_interests(b);
    if !shared.is_empty() {
        let named = shared
            .iter()
            .take(NAMED_INTERESTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        out.push(strength(
            FindingKind::Interests,
            &f.shared_interests,
            &[("interests", named.as_str())],
        ));
    }
    if let (Some(x), Some(y)) = (a.age, b.age) {
        if x.gap(&y) <= LARGE_AGE_GAP {
            out.push(strength(FindingKind::Age, &f.age_close, &[]));
        }
    }
    if let (Some(ca), Some(cb)) = (&a.location.city, &b.location.city) {
        if ca == cb {
            out.push(strength(FindingKind::Location, &f.same_city, &[("city", ca.as_str())]));
        }
    }
    if let (Some(x), Some(y)) = (a.archetype(), b.archetype()) {
        if x == y {
            let name = matrix.profile(x).name.as_str();
            out.push(strength(FindingKind::Archetype, &f.same_archetype, &[("archetype", name)]));
        }
    }
    if matches_known(a.lifestyle.social_level, b.lifestyle.social_level) {
        out.push(strength(FindingKind::SocialLevel, &f.same_social, &[]));
    }
    out
}

// ---------------------------------------------------------------------
//  Communication tips
// ---------------------------------------------------------------------

pub fn communication_tips(
    copy: &InsightCopy,
    compatibility: &CompatibilityReport,
) -> Vec<CommunicationTip> {
    compatibility
        .tips
        .iter()
        .map(|tip| CommunicationTip {
            tip: tip.clone(),
            priority: Priority::High,
        })
        .chain(
            copy.communication_tips
                .iter()
                .take(GENERIC_TIP_COUNT)
                .map(|t| CommunicationTip {
                    tip: t.tip.clone(),
                    priority: t.priority,
                }),
        )
        .collect()
}
