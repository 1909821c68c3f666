//! Archetype compatibility matrix.
//!
//! The table stores one entry per unordered archetype pair, so
//! `lookup(a, b)` and `lookup(b, a)` always agree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::archetype::{Archetype, ArchetypeProfile};
use crate::content::ContentError;

/// Score used whenever either side has no assessment.
pub const DEFAULT_SCORE: u8 = 70;

const PAIR_COUNT: usize = 15;

// =============================================================================
// Table schema
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    pub a: Archetype,
    pub b: Archetype,
    pub score: u8,
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandTexts {
    pub very_high: String,
    pub good: String,
    pub moderate: String,
    pub needs_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnassessedTexts {
    pub summary: String,
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    pub tips: Vec<String>,
    /// Match reason shown when no archetype pair is available.
    pub reason: String,
}

/// Raw shape of `compatibility.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityTable {
    pub version: String,
    pub bands: BandTexts,
    pub unassessed: UnassessedTexts,
    pub archetypes: HashMap<Archetype, ArchetypeProfile>,
    pub pairs: Vec<CompatibilityEntry>,
}

// =============================================================================
// Bands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityBand {
    VeryHigh,
    Good,
    Moderate,
    NeedsTime,
}

impl CompatibilityBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => CompatibilityBand::VeryHigh,
            75..=84 => CompatibilityBand::Good,
            65..=74 => CompatibilityBand::Moderate,
            _ => CompatibilityBand::NeedsTime,
        }
    }
}

impl BandTexts {
    pub fn text(&self, band: CompatibilityBand) -> &str {
        match band {
            CompatibilityBand::VeryHigh => &self.very_high,
            CompatibilityBand::Good => &self.good,
            CompatibilityBand::Moderate => &self.moderate,
            CompatibilityBand::NeedsTime => &self.needs_time,
        }
    }
}

// =============================================================================
// Matrix
// =============================================================================

/// Outcome of a compatibility lookup between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub score: u8,
    /// `None` when either side is unassessed.
    pub band: Option<CompatibilityBand>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
    pub tips: Vec<String>,
    pub assessed: bool,
}

#[derive(Debug, Clone)]
pub struct CompatibilityMatrix {
    version: String,
    bands: BandTexts,
    unassessed: UnassessedTexts,
    profiles: Vec<ArchetypeProfile>,
    entries: Vec<CompatibilityEntry>,
    index: [[usize; 5]; 5],
}

impl CompatibilityMatrix {
    /// Build from a parsed table, rejecting anything short of a complete,
    /// unambiguous set of unordered pairs.
    pub fn from_table(table: CompatibilityTable) -> Result<Self, ContentError> {
        let mut profiles = Vec::with_capacity(Archetype::ALL.len());
        for a in Archetype::ALL {
            let profile = table.archetypes.get(&a).cloned().ok_or_else(|| {
                ContentError::invalid("compatibility", format!("no profile for {a}"))
            })?;
            profiles.push(profile);
        }

        let mut slots: [[Option<usize>; 5]; 5] = [[None; 5]; 5];
        for (pos, entry) in table.pairs.iter().enumerate() {
            let (i, j) = (entry.a.index(), entry.b.index());
            if slots[i][j].is_some() {
                return Err(ContentError::invalid(
                    "compatibility",
                    format!("duplicate pair {}/{}", entry.a, entry.b),
                ));
            }
            if entry.score > 100 {
                return Err(ContentError::invalid(
                    "compatibility",
                    format!("score {} for {}/{} exceeds 100", entry.score, entry.a, entry.b),
                ));
            }
            if entry.strengths.is_empty() || entry.tips.is_empty() {
                return Err(ContentError::invalid(
                    "compatibility",
                    format!("pair {}/{} needs strengths and tips", entry.a, entry.b),
                ));
            }
            slots[i][j] = Some(pos);
            slots[j][i] = Some(pos);
        }
        if table.pairs.len() != PAIR_COUNT {
            return Err(ContentError::invalid(
                "compatibility",
                format!("expected {PAIR_COUNT} unordered pairs, found {}", table.pairs.len()),
            ));
        }

        let mut index = [[0usize; 5]; 5];
        for a in Archetype::ALL {
            for b in Archetype::ALL {
                index[a.index()][b.index()] = slots[a.index()][b.index()].ok_or_else(|| {
                    ContentError::invalid("compatibility", format!("missing pair {a}/{b}"))
                })?;
            }
        }

        if table.unassessed.tips.is_empty() {
            return Err(ContentError::invalid(
                "compatibility",
                "unassessed fallback needs at least one tip",
            ));
        }

        Ok(Self {
            version: table.version,
            bands: table.bands,
            unassessed: table.unassessed,
            profiles,
            entries: table.pairs,
            index,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// O(1) lookup; order of the arguments does not matter.
    pub fn lookup(&self, a: Archetype, b: Archetype) -> &CompatibilityEntry {
        &self.entries[self.index[a.index()][b.index()]]
    }

    pub fn profile(&self, a: Archetype) -> &ArchetypeProfile {
        &self.profiles[a.index()]
    }

    pub fn band_text(&self, band: CompatibilityBand) -> &str {
        self.bands.text(band)
    }

    pub fn unassessed(&self) -> &UnassessedTexts {
        &self.unassessed
    }

    /// Compatibility between two optional archetypes. Never fails: an
    /// unassessed side yields the neutral default report.
    pub fn compatibility(&self, a: Option<Archetype>, b: Option<Archetype>) -> CompatibilityReport {
        match (a, b) {
            (Some(a), Some(b)) => {
                let entry = self.lookup(a, b);
                let band = CompatibilityBand::from_score(entry.score);
                CompatibilityReport {
                    score: entry.score,
                    band: Some(band),
                    summary: self.band_text(band).to_string(),
                    strengths: entry.strengths.clone(),
                    challenges: entry.challenges.clone(),
                    tips: entry.tips.clone(),
                    assessed: true,
                }
            }
            _ => CompatibilityReport {
                score: DEFAULT_SCORE,
                band: None,
                summary: self.unassessed.summary.clone(),
                strengths: self.unassessed.strengths.clone(),
                challenges: self.unassessed.challenges.clone(),
                tips: self.unassessed.tips.clone(),
                assessed: false,
            },
        }
    }

    /// Short reason text for a match list entry.
    pub fn match_reason(&self, a: Option<Archetype>, b: Option<Archetype>) -> &str {
        match (a, b) {
            (Some(a), Some(b)) => self
                .lookup(a, b)
                .strengths
                .first()
                .map(String::as_str)
                .unwrap_or(&self.unassessed.reason),
            _ => &self.unassessed.reason,
        }
    }
}
