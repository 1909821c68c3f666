//! The values-assessment question bank.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::archetype::Trait;
use crate::content::ContentError;

/// Smallest and largest weight an option may give a single trait.
pub const MIN_WEIGHT: u32 = 1;
pub const MAX_WEIGHT: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub values: BTreeMap<Trait, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub version: String,
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Ceiling for any single trait total: every question giving it the max weight.
    pub fn trait_cap(&self) -> u32 {
        (self.questions.len() as u32).saturating_mul(MAX_WEIGHT)
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.questions.is_empty() {
            return Err(ContentError::invalid("questions", "question bank is empty"));
        }
        let mut ids = HashSet::new();
        for q in &self.questions {
            if !ids.insert(q.id) {
                return Err(ContentError::invalid(
                    "questions",
                    format!("duplicate question id {}", q.id),
                ));
            }
            if q.options.len() < 2 {
                return Err(ContentError::invalid(
                    "questions",
                    format!("question {} needs at least two options", q.id),
                ));
            }
            for (idx, opt) in q.options.iter().enumerate() {
                for (t, w) in &opt.values {
                    if !(MIN_WEIGHT..=MAX_WEIGHT).contains(w) {
                        return Err(ContentError::invalid(
                            "questions",
                            format!(
                                "question {} option {idx}: weight {w} for {t:?} \
                                 outside {MIN_WEIGHT}..={MAX_WEIGHT}",
                                q.id
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
