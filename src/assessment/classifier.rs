//! Trait accumulation and archetype selection.

use serde::{Deserialize, Serialize};

use super::questions::QuestionBank;
use super::AssessmentError;
use crate::archetype::{Archetype, TraitScores};

/// Confidence reported when the winning composite ties the runner-up.
const BASE_CONFIDENCE: u8 = 60;
/// Confidence added per composite point of margin over the runner-up.
const CONFIDENCE_PER_POINT: u32 = 4;
const MAX_CONFIDENCE: u8 = 98;

/// One answer per question, in bank order. `None` marks a skipped question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub answers: Vec<Option<usize>>,
}

impl AnswerSheet {
    pub fn new(answers: Vec<Option<usize>>) -> Self {
        Self { answers }
    }

    /// A sheet with every question answered.
    pub fn complete(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            answers: indices.into_iter().map(Some).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub archetype: Archetype,
    pub score: u32,
}

/// Result of a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub archetype: Archetype,
    pub traits: TraitScores,
    /// Composite per archetype, in enumeration order.
    pub composites: Vec<CompositeScore>,
    /// 0..=100 certainty of the pick, from the margin over the runner-up.
    pub confidence: u8,
    pub question_bank_version: String,
}

/// Score a completed answer sheet.
///
/// Every question must be answered; partial sheets are rejected before any
/// scoring happens.
pub fn classify(bank: &QuestionBank, sheet: &AnswerSheet) -> Result<Assessment, AssessmentError> {
    if sheet.answers.len() > bank.len() {
        return Err(AssessmentError::TooManyAnswers {
            expected: bank.len(),
            got: sheet.answers.len(),
        });
    }

    let missing: Vec<u32> = bank
        .questions
        .iter()
        .enumerate()
        .filter(|(idx, _)| !matches!(sheet.answers.get(*idx), Some(Some(_))))
        .map(|(_, q)| q.id)
        .collect();
    if !missing.is_empty() {
        return Err(AssessmentError::InputIncomplete {
            expected: bank.len(),
            answered: bank.len() - missing.len(),
            missing,
        });
    }

    let cap = bank.trait_cap();
    let mut traits = TraitScores::new();
    for (question, answer) in bank.questions.iter().zip(&sheet.answers) {
        let Some(choice) = *answer else { continue };
        let option = question
            .options
            .get(choice)
            .ok_or(AssessmentError::InvalidOption {
                question_id: question.id,
                index: choice,
                options: question.options.len(),
            })?;
        for (t, w) in &option.values {
            traits.add(*t, *w, cap);
        }
    }

    let composites: Vec<CompositeScore> = Archetype::ALL
        .iter()
        .map(|a| CompositeScore {
            archetype: *a,
            score: a.composite(&traits),
        })
        .collect();

    let (archetype, confidence) = pick(&composites);

    Ok(Assessment {
        archetype,
        traits,
        composites,
        confidence,
        question_bank_version: bank.version.clone(),
    })
}

/// Strictly-greatest composite wins; ties keep the earlier archetype.
fn pick(composites: &[CompositeScore]) -> (Archetype, u8) {
    let mut best = composites[0];
    for c in &composites[1..] {
        if c.score > best.score {
            best = *c;
        }
    }
    let runner_up = composites
        .iter()
        .filter(|c| c.archetype != best.archetype)
        .map(|c| c.score)
        .max()
        .unwrap_or(0);
    let margin = best.score.saturating_sub(runner_up);
    let confidence = (BASE_CONFIDENCE as u32)
        .saturating_add(margin.saturating_mul(CONFIDENCE_PER_POINT))
        .min(MAX_CONFIDENCE as u32) as u8;
    (best.archetype, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composites(scores: [u32; 5]) -> Vec<CompositeScore> {
        Archetype::ALL
            .iter()
            .zip(scores)
            .map(|(a, score)| CompositeScore {
                archetype: *a,
                score,
            })
            .collect()
    }

    #[test]
    fn tie_keeps_enumeration_order() {
        let (a, conf) = pick(&composites([0, 0, 0, 0, 0]));
        assert_eq!(a, Archetype::WarmCompanion);
        assert_eq!(conf, BASE_CONFIDENCE);

        let (a, _) = pick(&composites([3, 7, 1, 7, 2]));
        assert_eq!(a, Archetype::WiseMentor);
    }

    #[test]
    fn confidence_grows_with_margin_and_caps() {
        let (_, conf) = pick(&composites([10, 5, 0, 0, 0]));
        assert_eq!(conf, 80);
        let (_, conf) = pick(&composites([100, 0, 0, 0, 0]));
        assert_eq!(conf, MAX_CONFIDENCE);
    }
}
