//! Date ideas: per-interest suggestions, an age-appropriate list, and a
//! seasonal list keyed by the current month.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::copy::DateIdeaCopy;
use crate::profile::UserProfile;

pub const MAX_DATE_IDEAS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateIdea {
    pub title: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Meteorological seasons: Mar–May, Jun–Aug, Sep–Nov, Dec–Feb.
    /// Out-of-range months are treated as winter.
    pub fn from_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// Interest-driven ideas (shared interests first), then the age-appropriate
/// list, then the seasonal list. Deduplicated by title, capped at
/// [`MAX_DATE_IDEAS`].
pub fn date_ideas(
    copy: &DateIdeaCopy,
    a: &UserProfile,
    b: &UserProfile,
    season: Season,
) -> Vec<DateIdea> {
    let shared = a.shared_interests(b);
    let interests = shared
        .iter()
        .chain(a.interests.iter())
        .chain(b.interests.iter());

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let candidates = interests
        .filter_map(|i| copy.by_interest.get(i))
        .chain(copy.age_appropriate.iter())
        .chain(copy.seasonal.get(&season).into_iter().flatten());

    for idea in candidates {
        if out.len() >= MAX_DATE_IDEAS {
            break;
        }
        if seen.insert(idea.title.clone()) {
            out.push(idea.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_boundaries() {
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
        assert_eq!(Season::from_month(12), Season::Winter);
    }

    fn copy() -> DateIdeaCopy {
        let copy: crate::insights::InsightCopy =
            serde_json::from_str(crate::content::BUILTIN_INSIGHTS).unwrap();
        copy.date_ideas
    }

    #[test]
    fn shared_interest_comes_first_and_titles_are_unique() {
        let mut a = UserProfile::new("a");
        a.interests = vec!["음악".into(), "요리".into(), "등산".into()];
        let mut b = UserProfile::new("b");
        b.interests = vec!["등산".into(), "음악".into()];

        let ideas = date_ideas(&copy(), &a, &b, Season::Autumn);
        assert_eq!(ideas[0].title, "음악회 관람");
        let titles: HashSet<&str> = ideas.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles.len(), ideas.len());
        assert!(ideas.len() <= MAX_DATE_IDEAS);
    }

    #[test]
    fn no_interests_still_yields_age_and_seasonal_ideas() {
        let a = UserProfile::new("a");
        let b = UserProfile::new("b");
        let copy = copy();
        let ideas = date_ideas(&copy, &a, &b, Season::Winter);
        assert_eq!(
            ideas.len(),
            copy.age_appropriate.len() + copy.seasonal[&Season::Winter].len()
        );
        assert_eq!(ideas.last().unwrap().category, "계절");
    }

    #[test]
    fn many_interests_cap_at_eight() {
        let mut a = UserProfile::new("a");
        a.interests = copy().by_interest.keys().cloned().collect();
        let b = UserProfile::new("b");
        assert_eq!(date_ideas(&copy(), &a, &b, Season::Spring).len(), MAX_DATE_IDEAS);
    }
}
