//! Values assessment: question bank, classifier, and the record flow that
//! persists a user's result.

pub mod classifier;
pub mod questions;

pub use classifier::{classify, AnswerSheet, Assessment, CompositeScore};
pub use questions::{AnswerOption, Question, QuestionBank};

use tracing::info;

use crate::store::{AssessmentRecord, AssessmentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("assessment incomplete: {answered}/{expected} answered, missing questions {missing:?}")]
    InputIncomplete {
        expected: usize,
        answered: usize,
        missing: Vec<u32>,
    },
    #[error("question {question_id}: option {index} out of range ({options} options)")]
    InvalidOption {
        question_id: u32,
        index: usize,
        options: usize,
    },
    #[error("too many answers: expected {expected}, got {got}")]
    TooManyAnswers { expected: usize, got: usize },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Classify a sheet and persist the result against `user_id`.
///
/// Nothing is written when classification fails.
pub async fn record_assessment(
    bank: &QuestionBank,
    fingerprint: &str,
    store: &dyn AssessmentStore,
    user_id: &str,
    sheet: &AnswerSheet,
) -> Result<Assessment, AssessmentError> {
    let assessment = classify(bank, sheet)?;
    let record = AssessmentRecord::new(user_id, &assessment, fingerprint, sheet);
    store.put(&record).await?;
    info!(
        user_id,
        archetype = %assessment.archetype,
        confidence = assessment.confidence,
        "assessment recorded"
    );
    Ok(assessment)
}
