//! Boundary normalization from loosely-shaped profile JSON.
//!
//! Mock and real backends disagree on field names and nesting (`_id` vs
//! `id`, flat vs nested lifestyle, location as text or object). All of
//! that is absorbed here.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    AgeBracket, AssessmentSummary, Gender, Level, Lifestyle, Location, MaritalStatus, Occupation,
    ProfileError, UserProfile, WorkSchedule,
};
use crate::archetype::{Archetype, TraitScores};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawLocation {
    Text(String),
    Parts {
        #[serde(default)]
        city: Option<String>,
        #[serde(default)]
        district: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawList {
    List(Vec<String>),
    Csv(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLifestyle {
    #[serde(default, alias = "social_level", alias = "social")]
    social_level: Option<String>,
    #[serde(default, alias = "fitness_level", alias = "fitness")]
    fitness_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawOccupation {
    Title(String),
    Parts {
        #[serde(default, alias = "job", alias = "name")]
        title: Option<String>,
        #[serde(default, alias = "workSchedule", alias = "work_schedule")]
        schedule: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    #[serde(alias = "personalityType", alias = "type")]
    archetype: String,
    #[serde(default, alias = "confidenceLevel")]
    confidence: Option<u8>,
    #[serde(default, alias = "scores")]
    traits: Option<TraitScores>,
}

/// Any accepted external profile shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    #[serde(default, alias = "_id", alias = "userId", alias = "user_id")]
    id: Option<RawId>,
    #[serde(default, alias = "ageRange", alias = "age_range", alias = "ageGroup")]
    age: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    district: Option<String>,
    #[serde(default, alias = "hobbies")]
    interests: Option<RawList>,
    #[serde(default)]
    lifestyle: Option<RawLifestyle>,
    #[serde(default, alias = "social_level")]
    social_level: Option<String>,
    #[serde(default, alias = "fitness_level")]
    fitness_level: Option<String>,
    #[serde(default, alias = "job")]
    occupation: Option<RawOccupation>,
    #[serde(default, alias = "work_schedule")]
    work_schedule: Option<String>,
    #[serde(default, alias = "marital_status")]
    marital_status: Option<String>,
    #[serde(default, alias = "has_children", alias = "children")]
    has_children: Option<RawFlag>,
    #[serde(default, alias = "valuesAssessment")]
    assessment: Option<RawAssessment>,
    #[serde(default, alias = "personality_type", alias = "archetype")]
    personality_type: Option<String>,
    #[serde(default)]
    profile: Option<Box<RawProfile>>,
}

impl RawProfile {
    /// Fill fields missing at the top level from a nested `profile` object.
    fn flatten(mut self) -> RawProfile {
        let Some(inner) = self.profile.take() else {
            return self;
        };
        let inner = inner.flatten();
        RawProfile {
            id: self.id.or(inner.id),
            age: self.age.or(inner.age),
            gender: self.gender.or(inner.gender),
            location: self.location.or(inner.location),
            city: self.city.or(inner.city),
            district: self.district.or(inner.district),
            interests: self.interests.or(inner.interests),
            lifestyle: self.lifestyle.or(inner.lifestyle),
            social_level: self.social_level.or(inner.social_level),
            fitness_level: self.fitness_level.or(inner.fitness_level),
            occupation: self.occupation.or(inner.occupation),
            work_schedule: self.work_schedule.or(inner.work_schedule),
            marital_status: self.marital_status.or(inner.marital_status),
            has_children: self.has_children.or(inner.has_children),
            assessment: self.assessment.or(inner.assessment),
            personality_type: self.personality_type.or(inner.personality_type),
            profile: None,
        }
    }

    pub fn into_profile(self) -> Result<UserProfile, ProfileError> {
        let raw = self.flatten();

        let id = match raw.id {
            Some(RawId::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(RawId::Number(n)) => n.to_string(),
            _ => return Err(ProfileError::MissingId),
        };

        let age = non_empty(raw.age).map(|s| s.parse::<AgeBracket>()).transpose()?;
        let gender = non_empty(raw.gender).map(|s| parse_gender(&s)).transpose()?;

        let mut location = match raw.location {
            Some(RawLocation::Text(text)) => split_location(&text),
            Some(RawLocation::Parts { city, district }) => Location {
                city: non_empty(city),
                district: non_empty(district),
            },
            None => Location::default(),
        };
        if location.city.is_none() {
            location.city = non_empty(raw.city);
        }
        if location.district.is_none() {
            location.district = non_empty(raw.district);
        }

        let interests = match raw.interests {
            Some(RawList::List(items)) => dedup(items),
            Some(RawList::Csv(text)) => dedup(text.split(',').map(str::to_string).collect()),
            None => Vec::new(),
        };

        let nested = raw.lifestyle.unwrap_or_default();
        let lifestyle = Lifestyle {
            social_level: non_empty(nested.social_level.or(raw.social_level))
                .map(|s| parse_level("social level", &s))
                .transpose()?,
            fitness_level: non_empty(nested.fitness_level.or(raw.fitness_level))
                .map(|s| parse_level("fitness level", &s))
                .transpose()?,
        };

        let (title, schedule) = match raw.occupation {
            Some(RawOccupation::Title(t)) => (Some(t), None),
            Some(RawOccupation::Parts { title, schedule }) => (title, schedule),
            None => (None, None),
        };
        let occupation = Occupation {
            title: non_empty(title),
            schedule: non_empty(schedule.or(raw.work_schedule))
                .map(|s| parse_schedule(&s))
                .transpose()?,
        };

        let marital_status = non_empty(raw.marital_status)
            .map(|s| parse_marital(&s))
            .transpose()?;

        let has_children = match raw.has_children {
            Some(RawFlag::Bool(b)) => Some(b),
            Some(RawFlag::Text(t)) => parse_flag(&t)?,
            None => None,
        };

        let assessment = match (raw.assessment, non_empty(raw.personality_type)) {
            (Some(a), _) => Some(AssessmentSummary {
                archetype: parse_archetype(&a.archetype)?,
                confidence: a.confidence.map(|c| c.min(100)),
                traits: a.traits.unwrap_or_default(),
            }),
            (None, Some(name)) => Some(AssessmentSummary::new(parse_archetype(&name)?)),
            (None, None) => None,
        };

        Ok(UserProfile {
            id,
            age,
            gender,
            location,
            interests,
            lifestyle,
            occupation,
            marital_status,
            has_children,
            assessment,
        })
    }
}

// ---------------------------------------------------------------------
//  Alias collapsing
// ---------------------------------------------------------------------

// serde rejects a payload that spells one field twice (`id` and `_id`),
// so each group keeps a single key before deserializing. Earlier
// spellings win; a null never shadows a present value.
const PROFILE_KEYS: &[&[&str]] = &[
    &["id", "_id", "userId", "user_id"],
    &["age", "ageRange", "age_range", "ageGroup"],
    &["interests", "hobbies"],
    &["socialLevel", "social_level"],
    &["fitnessLevel", "fitness_level"],
    &["occupation", "job"],
    &["workSchedule", "work_schedule"],
    &["maritalStatus", "marital_status"],
    &["hasChildren", "has_children", "children"],
    &["assessment", "valuesAssessment"],
    &["personalityType", "personality_type", "archetype"],
];

const LIFESTYLE_KEYS: &[&[&str]] = &[
    &["socialLevel", "social_level", "social"],
    &["fitnessLevel", "fitness_level", "fitness"],
];

const OCCUPATION_KEYS: &[&[&str]] = &[
    &["title", "job", "name"],
    &["schedule", "workSchedule", "work_schedule"],
];

const ASSESSMENT_KEYS: &[&[&str]] = &[
    &["archetype", "personalityType", "type"],
    &["confidence", "confidenceLevel"],
    &["traits", "scores"],
];

fn collapse_aliases(map: &mut Map<String, Value>, groups: &[&[&str]]) {
    for group in groups {
        let keep = group
            .iter()
            .find(|k| map.get(**k).is_some_and(|v| !v.is_null()))
            .or_else(|| group.iter().find(|k| map.contains_key(**k)))
            .copied();
        for key in group.iter().filter(|k| Some(**k) != keep) {
            map.remove(*key);
        }
    }
}

fn collapse_nested(map: &mut Map<String, Value>, key: &str, groups: &[&[&str]]) {
    if let Some(Value::Object(inner)) = map.get_mut(key) {
        collapse_aliases(inner, groups);
    }
}

fn collapse_profile(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    collapse_aliases(map, PROFILE_KEYS);
    collapse_nested(map, "lifestyle", LIFESTYLE_KEYS);
    collapse_nested(map, "occupation", OCCUPATION_KEYS);
    collapse_nested(map, "job", OCCUPATION_KEYS);
    collapse_nested(map, "assessment", ASSESSMENT_KEYS);
    collapse_nested(map, "valuesAssessment", ASSESSMENT_KEYS);
    if let Some(inner) = map.get_mut("profile") {
        collapse_profile(inner);
    }
}

/// Normalize one profile from any accepted JSON shape.
pub fn normalize(mut value: Value) -> Result<UserProfile, ProfileError> {
    collapse_profile(&mut value);
    let raw: RawProfile = serde_json::from_value(value)?;
    raw.into_profile()
}

/// Normalize a pool: a bare array, or an object wrapping one under
/// `users`, `profiles` or `data`.
pub fn normalize_many(value: Value) -> Result<Vec<UserProfile>, ProfileError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => ["users", "profiles", "data"]
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    items.into_iter().map(normalize).collect()
}

// ---------------------------------------------------------------------
//  Field parsers
// ---------------------------------------------------------------------

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|i| i == item) {
            out.push(item.to_string());
        }
    }
    out
}

fn split_location(text: &str) -> Location {
    let mut parts = text.split_whitespace();
    Location {
        city: parts.next().map(str::to_string),
        district: {
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                None
            } else {
                Some(rest.join(" "))
            }
        },
    }
}

fn parse_gender(s: &str) -> Result<Gender, ProfileError> {
    match s.to_lowercase().as_str() {
        "male" | "m" | "man" | "남" | "남성" | "남자" => Ok(Gender::Male),
        "female" | "f" | "woman" | "여" | "여성" | "여자" => Ok(Gender::Female),
        _ => Err(ProfileError::unknown("gender", s)),
    }
}

fn parse_level(field: &'static str, s: &str) -> Result<Level, ProfileError> {
    match s.to_lowercase().as_str() {
        "low" | "quiet" | "introvert" | "introverted" | "낮음" | "조용함" => Ok(Level::Low),
        "medium" | "moderate" | "normal" | "ambivert" | "보통" => Ok(Level::Medium),
        "high" | "active" | "social" | "extrovert" | "extroverted" | "높음" | "활발함" => {
            Ok(Level::High)
        }
        _ => Err(ProfileError::unknown(field, s)),
    }
}

fn parse_marital(s: &str) -> Result<MaritalStatus, ProfileError> {
    match s.to_lowercase().as_str() {
        "single" | "never_married" | "never-married" | "미혼" => Ok(MaritalStatus::Single),
        "divorced" | "이혼" | "돌싱" => Ok(MaritalStatus::Divorced),
        "widowed" | "사별" => Ok(MaritalStatus::Widowed),
        _ => Err(ProfileError::unknown("marital status", s)),
    }
}

fn parse_schedule(s: &str) -> Result<WorkSchedule, ProfileError> {
    match s.to_lowercase().as_str() {
        "day" | "regular" | "weekday" | "주간" => Ok(WorkSchedule::Day),
        "night" | "야간" => Ok(WorkSchedule::Night),
        "shift" | "교대" => Ok(WorkSchedule::Shift),
        "flexible" | "freelance" | "자유" | "유연" => Ok(WorkSchedule::Flexible),
        "retired" | "은퇴" => Ok(WorkSchedule::Retired),
        _ => Err(ProfileError::unknown("work schedule", s)),
    }
}

fn parse_flag(s: &str) -> Result<Option<bool>, ProfileError> {
    match s.trim().to_lowercase().as_str() {
        "" | "unknown" => Ok(None),
        "yes" | "y" | "true" | "있음" | "예" => Ok(Some(true)),
        "no" | "n" | "false" | "없음" | "아니오" => Ok(Some(false)),
        _ => Err(ProfileError::unknown("children", s)),
    }
}

fn parse_archetype(s: &str) -> Result<Archetype, ProfileError> {
    s.parse::<Archetype>()
        .map_err(|_| ProfileError::unknown("archetype", s))
}
