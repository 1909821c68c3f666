//! Canonical user profile.
//!
//! Every external shape is converted into [`UserProfile`] once, by
//! [`normalize`]; scoring and insight code only ever sees this type.

mod normalize;

pub use normalize::{normalize, normalize_many, RawProfile};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::archetype::{Archetype, TraitScores};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile is missing an id")]
    MissingId,
    #[error("unknown {field} value '{value}'")]
    UnknownValue { field: &'static str, value: String },
    #[error("malformed profile json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProfileError {
    fn unknown(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            field,
            value: value.into(),
        }
    }
}

// =============================================================================
// Enumerated attributes
// =============================================================================

/// Age ranges offered at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "40-45")]
    From40To45,
    #[serde(rename = "46-50")]
    From46To50,
    #[serde(rename = "51-55")]
    From51To55,
    #[serde(rename = "56-60")]
    From56To60,
    #[serde(rename = "61-65")]
    From61To65,
    #[serde(rename = "66-70")]
    From66To70,
    #[serde(rename = "71+")]
    Over70,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 7] = [
        AgeBracket::From40To45,
        AgeBracket::From46To50,
        AgeBracket::From51To55,
        AgeBracket::From56To60,
        AgeBracket::From61To65,
        AgeBracket::From66To70,
        AgeBracket::Over70,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBracket::From40To45 => "40-45",
            AgeBracket::From46To50 => "46-50",
            AgeBracket::From51To55 => "51-55",
            AgeBracket::From56To60 => "56-60",
            AgeBracket::From61To65 => "61-65",
            AgeBracket::From66To70 => "66-70",
            AgeBracket::Over70 => "71+",
        }
    }

    /// Youngest age in the bracket.
    pub fn start_age(&self) -> u32 {
        match self {
            AgeBracket::From40To45 => 40,
            AgeBracket::From46To50 => 46,
            AgeBracket::From51To55 => 51,
            AgeBracket::From56To60 => 56,
            AgeBracket::From61To65 => 61,
            AgeBracket::From66To70 => 66,
            AgeBracket::Over70 => 71,
        }
    }

    /// Generation label used in conversation prompts.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From40To45 => "40대 초반",
            AgeBracket::From46To50 => "40대 후반",
            AgeBracket::From51To55 => "50대 초반",
            AgeBracket::From56To60 => "50대 후반",
            AgeBracket::From61To65 => "60대 초반",
            AgeBracket::From66To70 => "60대 후반",
            AgeBracket::Over70 => "70대",
        }
    }

    /// Years between the two bracket start ages.
    pub fn gap(&self, other: &AgeBracket) -> u32 {
        self.start_age().abs_diff(other.start_age())
    }
}

impl FromStr for AgeBracket {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let compact = compact.replace('~', "-").replace('–', "-");
        match compact.as_str() {
            "70+" | "71+" | "70-" | "70이상" | "71이상" => return Ok(AgeBracket::Over70),
            _ => {}
        }
        AgeBracket::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == compact)
            .ok_or_else(|| ProfileError::unknown("age bracket", s))
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Three-step scale shared by the lifestyle attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn rank(&self) -> u32 {
        match self {
            Level::Low => 0,
            Level::Medium => 1,
            Level::High => 2,
        }
    }

    pub fn distance(&self, other: &Level) -> u32 {
        self.rank().abs_diff(other.rank())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Divorced,
    Widowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkSchedule {
    Day,
    Night,
    Shift,
    Flexible,
    Retired,
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub district: Option<String>,
}

impl Location {
    pub fn is_known(&self) -> bool {
        self.city.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    pub social_level: Option<Level>,
    pub fitness_level: Option<Level>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupation {
    pub title: Option<String>,
    pub schedule: Option<WorkSchedule>,
}

/// Archetype and supporting data from a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub archetype: Archetype,
    #[serde(default)]
    pub confidence: Option<u8>,
    #[serde(default)]
    pub traits: TraitScores,
}

impl AssessmentSummary {
    pub fn new(archetype: Archetype) -> Self {
        Self {
            archetype,
            confidence: None,
            traits: TraitScores::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub age: Option<AgeBracket>,
    pub gender: Option<Gender>,
    pub location: Location,
    /// Deduplicated, in the order the user listed them.
    pub interests: Vec<String>,
    pub lifestyle: Lifestyle,
    pub occupation: Occupation,
    pub marital_status: Option<MaritalStatus>,
    pub has_children: Option<bool>,
    pub assessment: Option<AssessmentSummary>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn archetype(&self) -> Option<Archetype> {
        self.assessment.as_ref().map(|a| a.archetype)
    }

    /// Interests both profiles list, in `self`'s order.
    pub fn shared_interests(&self, other: &UserProfile) -> Vec<String> {
        let theirs: BTreeSet<&str> = other.interests.iter().map(String::as_str).collect();
        self.interests
            .iter()
            .filter(|i| theirs.contains(i.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_bracket_parses_common_spellings() {
        assert_eq!("51-55".parse::<AgeBracket>().unwrap(), AgeBracket::From51To55);
        assert_eq!("46 ~ 50".parse::<AgeBracket>().unwrap(), AgeBracket::From46To50);
        assert_eq!("70+".parse::<AgeBracket>().unwrap(), AgeBracket::Over70);
        assert!("30-35".parse::<AgeBracket>().is_err());
    }

    #[test]
    fn age_gap_uses_bracket_start_ages() {
        assert_eq!(AgeBracket::From51To55.gap(&AgeBracket::From46To50), 5);
        assert_eq!(AgeBracket::From40To45.gap(&AgeBracket::Over70), 31);
    }

    #[test]
    fn shared_interests_follow_first_profile_order() {
        let mut a = UserProfile::new("a");
        a.interests = vec!["음악".into(), "등산".into(), "요리".into()];
        let mut b = UserProfile::new("b");
        b.interests = vec!["요리".into(), "음악".into()];
        assert_eq!(a.shared_interests(&b), vec!["음악".to_string(), "요리".to_string()]);
    }
}
