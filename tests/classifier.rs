use std::collections::BTreeMap;

use inyeon_match::assessment::{
    classify, AnswerOption, AnswerSheet, AssessmentError, Question, QuestionBank,
};
use inyeon_match::{Archetype, ContentSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_sheet(bank: &QuestionBank, rng: &mut StdRng) -> AnswerSheet {
    AnswerSheet::complete(
        bank.questions
            .iter()
            .map(|q| rng.gen_range(0..q.options.len())),
    )
}

#[test]
fn trait_totals_equal_selected_weights() {
    let content = ContentSet::builtin().unwrap();
    let bank = &content.questions;
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let sheet = random_sheet(bank, &mut rng);
        let assessment = classify(bank, &sheet).unwrap();

        let expected: u32 = bank
            .questions
            .iter()
            .zip(&sheet.answers)
            .map(|(q, a)| q.options[a.unwrap()].values.values().sum::<u32>())
            .sum();
        assert_eq!(assessment.traits.total(), expected);
        assert!(Archetype::ALL.contains(&assessment.archetype));
        assert!(assessment.confidence <= 100);
        assert_eq!(assessment.composites.len(), Archetype::ALL.len());
    }
}

#[test]
fn winner_has_the_highest_composite() {
    let content = ContentSet::builtin().unwrap();
    let bank = &content.questions;
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..100 {
        let assessment = classify(bank, &random_sheet(bank, &mut rng)).unwrap();
        let best = assessment.composites.iter().map(|c| c.score).max().unwrap();
        let first_best = assessment
            .composites
            .iter()
            .find(|c| c.score == best)
            .unwrap()
            .archetype;
        assert_eq!(assessment.archetype, first_best);
    }
}

fn weightless_bank() -> QuestionBank {
    let option = |text: &str| AnswerOption {
        text: text.to_string(),
        values: BTreeMap::new(),
    };
    QuestionBank {
        version: "test".to_string(),
        questions: (1..=3)
            .map(|id| Question {
                id,
                text: format!("q{id}"),
                options: vec![option("a"), option("b")],
            })
            .collect(),
    }
}

#[test]
fn all_zero_composites_pick_first_archetype_every_time() {
    let bank = weightless_bank();
    let sheet = AnswerSheet::complete([0, 1, 0]);
    let picks: Vec<Archetype> = (0..10)
        .map(|_| classify(&bank, &sheet).unwrap().archetype)
        .collect();
    assert!(picks.iter().all(|a| *a == Archetype::ALL[0]));
    assert!(classify(&bank, &sheet).unwrap().traits.is_empty());
}

#[test]
fn partial_sheets_are_rejected_with_missing_ids() {
    let content = ContentSet::builtin().unwrap();
    let bank = &content.questions;

    let short = AnswerSheet::complete(vec![0; bank.len() - 2]);
    match classify(bank, &short).unwrap_err() {
        AssessmentError::InputIncomplete {
            expected,
            answered,
            missing,
        } => {
            assert_eq!(expected, bank.len());
            assert_eq!(answered, bank.len() - 2);
            assert_eq!(missing, vec![14, 15]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let empty = AnswerSheet::default();
    assert!(matches!(
        classify(bank, &empty),
        Err(AssessmentError::InputIncomplete { answered: 0, .. })
    ));
}

#[test]
fn out_of_range_option_and_extra_answers_are_rejected() {
    let bank = weightless_bank();
    assert!(matches!(
        classify(&bank, &AnswerSheet::complete([0, 5, 0])),
        Err(AssessmentError::InvalidOption {
            question_id: 2,
            index: 5,
            options: 2
        })
    ));
    assert!(matches!(
        classify(&bank, &AnswerSheet::complete([0, 0, 0, 0])),
        Err(AssessmentError::TooManyAnswers { expected: 3, got: 4 })
    ));
}
