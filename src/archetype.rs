//! Personality archetypes and the trait vocabulary they are scored from.
//!
//! Quiz options carry small `Trait -> weight` maps. Summing the selected
//! options gives a [`TraitScores`] vector, and each archetype reads a fixed
//! linear formula over that vector (see [`Archetype::composite`]).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Traits
// =============================================================================

/// Value dimensions measured by the assessment quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Family,
    Empathy,
    Communication,
    Social,
    Wisdom,
    Learning,
    Tradition,
    Stability,
    Practicality,
    Health,
    Growth,
    Adventure,
    Independence,
    Nature,
    Peace,
}

/// Accumulated per-trait weights from a completed assessment.
///
/// Totals saturate at the cap passed to [`TraitScores::add`]; a validated
/// question bank never reaches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitScores(BTreeMap<Trait, u32>);

impl TraitScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, t: Trait) -> u32 {
        self.0.get(&t).copied().unwrap_or(0)
    }

    pub fn add(&mut self, t: Trait, weight: u32, cap: u32) {
        let slot = self.0.entry(t).or_insert(0);
        *slot = slot.saturating_add(weight).min(cap);
    }

    /// Sum of all trait totals.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, u32)> + '_ {
        self.0.iter().map(|(t, v)| (*t, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| *v == 0)
    }
}

impl FromIterator<(Trait, u32)> for TraitScores {
    fn from_iter<I: IntoIterator<Item = (Trait, u32)>>(iter: I) -> Self {
        let mut scores = TraitScores::new();
        for (t, w) in iter {
            scores.add(t, w, u32::MAX);
        }
        scores
    }
}

// =============================================================================
// Archetypes
// =============================================================================

/// The five personality classifications, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    WarmCompanion,
    WiseMentor,
    StablePragmatist,
    GrowthSeeker,
    PeacefulNaturalist,
}

impl Archetype {
    /// Enumeration order. Classification ties resolve to the earliest entry.
    pub const ALL: [Archetype; 5] = [
        Archetype::WarmCompanion,
        Archetype::WiseMentor,
        Archetype::StablePragmatist,
        Archetype::GrowthSeeker,
        Archetype::PeacefulNaturalist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::WarmCompanion => "WarmCompanion",
            Archetype::WiseMentor => "WiseMentor",
            Archetype::StablePragmatist => "StablePragmatist",
            Archetype::GrowthSeeker => "GrowthSeeker",
            Archetype::PeacefulNaturalist => "PeacefulNaturalist",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Archetype::WarmCompanion => 0,
            Archetype::WiseMentor => 1,
            Archetype::StablePragmatist => 2,
            Archetype::GrowthSeeker => 3,
            Archetype::PeacefulNaturalist => 4,
        }
    }

    /// `(trait, multiplier)` terms of this archetype's composite formula.
    pub fn formula(&self) -> &'static [(Trait, u32)] {
        use Trait::*;
        match self {
            Archetype::WarmCompanion => {
                &[(Family, 2), (Empathy, 1), (Communication, 1), (Social, 1)]
            }
            Archetype::WiseMentor => &[(Wisdom, 2), (Learning, 1), (Tradition, 1), (Empathy, 1)],
            Archetype::StablePragmatist => {
                &[(Stability, 2), (Practicality, 1), (Tradition, 1), (Health, 1)]
            }
            Archetype::GrowthSeeker => {
                &[(Growth, 2), (Adventure, 1), (Learning, 1), (Independence, 1)]
            }
            Archetype::PeacefulNaturalist => {
                &[(Nature, 2), (Peace, 1), (Health, 1), (Independence, 1)]
            }
        }
    }

    pub fn composite(&self, scores: &TraitScores) -> u32 {
        self.formula()
            .iter()
            .map(|(t, mult)| scores.get(*t).saturating_mul(*mult))
            .fold(0u32, u32::saturating_add)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Archetype::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().to_ascii_lowercase() == key)
            .ok_or_else(|| format!("unknown archetype '{s}'"))
    }
}

/// Display metadata for an archetype, loaded from the compatibility table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeProfile {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
