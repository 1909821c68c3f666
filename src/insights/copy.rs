//! Copy tables for insight generation (`insights.json`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dates::{DateIdea, Season};
use super::Priority;
use crate::content::ContentError;

pub const GENERIC_TIP_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarterCopy {
    /// `{interest}` placeholder.
    pub common_interest: String,
    /// `{label}` placeholder.
    pub age_label: String,
    pub social_both_outgoing: String,
    pub social_both_quiet: String,
    pub social_mixed: String,
    /// `{occupation}` placeholder.
    pub occupation: String,
    pub generic: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceCopy {
    pub age_gap_large: String,
    pub age_gap_small: String,
    pub social_mismatch: String,
    pub fitness_mismatch: String,
    pub generic: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingCopy {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingsCopy {
    pub children_mismatch: FindingCopy,
    pub marital_mismatch: FindingCopy,
    /// `{city_a}` / `{city_b}` placeholders.
    pub different_city: FindingCopy,
    pub schedule_mismatch: FindingCopy,
    /// `{interests}` placeholder.
    pub shared_interests: FindingCopy,
    pub age_close: FindingCopy,
    /// `{city}` placeholder.
    pub same_city: FindingCopy,
    /// `{archetype}` placeholder.
    pub same_archetype: FindingCopy,
    pub same_social: FindingCopy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateIdeaCopy {
    pub by_interest: BTreeMap<String, DateIdea>,
    pub age_appropriate: Vec<DateIdea>,
    pub seasonal: BTreeMap<Season, Vec<DateIdea>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipCopy {
    pub tip: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlookCopy {
    pub excellent: String,
    pub good: String,
    pub moderate: String,
    pub challenging: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationCopy {
    pub values_alignment: String,
    pub lifestyle: String,
    pub communication: String,
    pub family: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTermCopy {
    pub outlooks: OutlookCopy,
    pub recommendations: RecommendationCopy,
}

/// Raw shape of `insights.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightCopy {
    pub version: String,
    pub starters: StarterCopy,
    pub advice: AdviceCopy,
    pub findings: FindingsCopy,
    pub date_ideas: DateIdeaCopy,
    pub communication_tips: Vec<TipCopy>,
    pub long_term: LongTermCopy,
}

impl InsightCopy {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.communication_tips.len() < GENERIC_TIP_COUNT {
            return Err(ContentError::invalid(
                "insights",
                format!(
                    "need {GENERIC_TIP_COUNT} generic communication tips, found {}",
                    self.communication_tips.len()
                ),
            ));
        }
        if self.starters.generic.is_empty() {
            return Err(ContentError::invalid("insights", "no generic conversation starters"));
        }
        if self.advice.generic.len() < 2 {
            return Err(ContentError::invalid("insights", "need two generic advice lines"));
        }
        if self.date_ideas.age_appropriate.is_empty() {
            return Err(ContentError::invalid("insights", "no age-appropriate date ideas"));
        }
        for season in Season::ALL {
            if self
                .date_ideas
                .seasonal
                .get(&season)
                .map_or(true, |ideas| ideas.is_empty())
            {
                return Err(ContentError::invalid(
                    "insights",
                    format!("no date ideas for {season:?}"),
                ));
            }
        }
        Ok(())
    }
}

/// Replace `{key}` placeholders in a copy template.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}
