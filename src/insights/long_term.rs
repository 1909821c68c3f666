//! Weighted long-term compatibility outlook.

use serde::{Deserialize, Serialize};

use super::copy::LongTermCopy;
use crate::profile::{Level, UserProfile};

const W_VALUES: f64 = 0.30;
const W_LIFESTYLE: f64 = 0.20;
const W_COMMUNICATION: f64 = 0.25;
const W_FAMILY: f64 = 0.15;
const W_LOCATION: f64 = 0.10;

/// Neutral factor value when the inputs are missing.
const NEUTRAL: f64 = 70.0;
/// Communication potential has no input signal yet; it is a fixed constant.
const COMMUNICATION_BASELINE: u8 = 75;
/// Factors below this produce a recommendation.
const RECOMMEND_BELOW: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Excellent,
    Good,
    Moderate,
    Challenging,
}

impl Outlook {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Outlook::Excellent,
            75..=84 => Outlook::Good,
            65..=74 => Outlook::Moderate,
            _ => Outlook::Challenging,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermFactors {
    pub values_alignment: u8,
    pub lifestyle_compatibility: u8,
    pub communication_potential: u8,
    pub family_compatibility: u8,
    pub location_compatibility: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermCompatibility {
    pub score: u8,
    pub outlook: Outlook,
    pub description: String,
    pub factors: LongTermFactors,
    pub recommendations: Vec<String>,
}

pub fn long_term(copy: &LongTermCopy, a: &UserProfile, b: &UserProfile) -> LongTermCompatibility {
    let factors = LongTermFactors {
        values_alignment: values_alignment(a, b),
        lifestyle_compatibility: lifestyle(a, b),
        communication_potential: COMMUNICATION_BASELINE,
        family_compatibility: family(a, b),
        location_compatibility: location(a, b),
    };

    let weighted = factors.values_alignment as f64 * W_VALUES
        + factors.lifestyle_compatibility as f64 * W_LIFESTYLE
        + factors.communication_potential as f64 * W_COMMUNICATION
        + factors.family_compatibility as f64 * W_FAMILY
        + factors.location_compatibility as f64 * W_LOCATION;
    let score = weighted.round().clamp(0.0, 100.0) as u8;
    let outlook = Outlook::from_score(score);

    let description = match outlook {
        Outlook::Excellent => &copy.outlooks.excellent,
        Outlook::Good => &copy.outlooks.good,
        Outlook::Moderate => &copy.outlooks.moderate,
        Outlook::Challenging => &copy.outlooks.challenging,
    }
    .clone();

    let rec = &copy.recommendations;
    let recommendations = [
        (factors.values_alignment, &rec.values_alignment),
        (factors.lifestyle_compatibility, &rec.lifestyle),
        (factors.communication_potential, &rec.communication),
        (factors.family_compatibility, &rec.family),
        (factors.location_compatibility, &rec.location),
    ]
    .into_iter()
    .filter(|(score, _)| *score < RECOMMEND_BELOW)
    .map(|(_, text)| text.clone())
    .collect();

    LongTermCompatibility {
        score,
        outlook,
        description,
        factors,
        recommendations,
    }
}

fn values_alignment(a: &UserProfile, b: &UserProfile) -> u8 {
    let conf = |p: &UserProfile| {
        p.assessment
            .as_ref()
            .and_then(|s| s.confidence)
            .map(f64::from)
            .unwrap_or(NEUTRAL)
    };
    ((conf(a) + conf(b)) / 2.0).round() as u8
}

fn level_score(a: Option<Level>, b: Option<Level>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(100.0 - 25.0 * a.distance(&b) as f64),
        _ => None,
    }
}

fn lifestyle(a: &UserProfile, b: &UserProfile) -> u8 {
    let dims: Vec<f64> = [
        level_score(a.lifestyle.social_level, b.lifestyle.social_level),
        level_score(a.lifestyle.fitness_level, b.lifestyle.fitness_level),
    ]
    .into_iter()
    .flatten()
    .collect();
    if dims.is_empty() {
        return NEUTRAL as u8;
    }
    (dims.iter().sum::<f64>() / dims.len() as f64).round() as u8
}

fn family(a: &UserProfile, b: &UserProfile) -> u8 {
    let mut score: i32 = NEUTRAL as i32;
    if let (Some(x), Some(y)) = (a.has_children, b.has_children) {
        score += if x == y { 10 } else { -10 };
    }
    if let (Some(x), Some(y)) = (a.marital_status, b.marital_status) {
        if x == y {
            score += 5;
        }
    }
    score.clamp(50, 100) as u8
}

fn location(a: &UserProfile, b: &UserProfile) -> u8 {
    match (&a.location.city, &b.location.city) {
        (Some(ca), Some(cb)) if ca == cb => {
            match (&a.location.district, &b.location.district) {
                (Some(da), Some(db)) if da == db => 100,
                _ => 90,
            }
        }
        (Some(_), Some(_)) => 60,
        _ => NEUTRAL as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{AssessmentSummary, MaritalStatus};
    use crate::archetype::Archetype;

    fn copy() -> LongTermCopy {
        let copy: crate::insights::InsightCopy =
            serde_json::from_str(crate::content::BUILTIN_INSIGHTS).unwrap();
        copy.long_term
    }

    #[test]
    fn empty_profiles_score_neutral_factors() {
        let a = UserProfile::new("a");
        let b = UserProfile::new("b");
        let lt = long_term(&copy(), &a, &b);
        // .3*70 + .2*70 + .25*75 + .15*70 + .1*70 = 71.25
        assert_eq!(lt.score, 71);
        assert_eq!(lt.outlook, Outlook::Moderate);
        assert!(lt.recommendations.is_empty());
    }

    #[test]
    fn location_levels() {
        let mut a = UserProfile::new("a");
        let mut b = UserProfile::new("b");
        a.location.city = Some("서울".into());
        b.location.city = Some("서울".into());
        assert_eq!(location(&a, &b), 90);
        a.location.district = Some("마포구".into());
        b.location.district = Some("마포구".into());
        assert_eq!(location(&a, &b), 100);
        b.location.city = Some("부산".into());
        assert_eq!(location(&a, &b), 60);
        b.location.city = None;
        assert_eq!(location(&a, &b), 70);
    }

    #[test]
    fn family_mismatch_and_bonus_clamp() {
        let mut a = UserProfile::new("a");
        let mut b = UserProfile::new("b");
        a.has_children = Some(true);
        b.has_children = Some(false);
        assert_eq!(family(&a, &b), 60);
        b.has_children = Some(true);
        a.marital_status = Some(MaritalStatus::Widowed);
        b.marital_status = Some(MaritalStatus::Widowed);
        assert_eq!(family(&a, &b), 85);
    }

    #[test]
    fn weak_factors_produce_recommendations() {
        let mut a = UserProfile::new("a");
        let mut b = UserProfile::new("b");
        a.location.city = Some("서울".into());
        b.location.city = Some("제주".into());
        a.lifestyle.social_level = Some(Level::High);
        b.lifestyle.social_level = Some(Level::Low);
        a.assessment = Some(AssessmentSummary {
            archetype: Archetype::GrowthSeeker,
            confidence: Some(90),
            traits: Default::default(),
        });
        let lt = long_term(&copy(), &a, &b);
        assert_eq!(lt.factors.values_alignment, 80);
        assert_eq!(lt.factors.lifestyle_compatibility, 50);
        let rec = copy().recommendations;
        assert_eq!(lt.recommendations, vec![rec.lifestyle, rec.location]);
    }
}
