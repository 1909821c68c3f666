//! Classify two users, then print their compatibility and a few insights.
//!
//! Run with `cargo run --example quickstart`.

use inyeon_match::profile::AssessmentSummary;
use inyeon_match::{normalize, AnswerSheet, EngineConfig, Matchmaker, MatchQuery};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Matchmaker::from_config(&EngineConfig::default())?;
    let questions = engine.content().questions.len();

    let first = engine.classify(&AnswerSheet::complete(vec![0; questions]))?;
    let second = engine.classify(&AnswerSheet::complete(vec![1; questions]))?;
    println!("first: {} ({}%)", first.archetype, first.confidence);
    println!("second: {} ({}%)", second.archetype, second.confidence);

    let mut a = normalize(json!({
        "id": "u-1001",
        "age": "51-55",
        "gender": "female",
        "location": { "city": "서울", "district": "마포구" },
        "interests": ["음악", "산책", "요리"],
        "lifestyle": { "socialLevel": "medium", "fitnessLevel": "medium" },
    }))?;
    let mut b = normalize(json!({
        "userId": "u-1002",
        "ageRange": "56-60",
        "gender": "male",
        "city": "서울",
        "hobbies": "등산, 음악",
        "occupation": "약사",
    }))?;
    a.assessment = Some(AssessmentSummary {
        archetype: first.archetype,
        confidence: Some(first.confidence),
        traits: first.traits.clone(),
    });
    b.assessment = Some(AssessmentSummary::new(second.archetype));

    let report = engine.compatibility(&a, &b);
    println!("compatibility: {} - {}", report.score, report.summary);

    let bundle = engine.insights(&a, &b);
    for line in &bundle.conversation_starters {
        println!("  starter: {line}");
    }
    for idea in &bundle.date_ideas {
        println!("  date: {} ({})", idea.title, idea.category);
    }
    println!(
        "long term: {} {:?}",
        bundle.long_term_compatibility.score, bundle.long_term_compatibility.outlook
    );

    let pool = vec![a.clone(), b.clone()];
    for candidate in engine.matches(&a, &pool, &MatchQuery::default()) {
        println!(
            "match {} -> {} ({})",
            candidate.profile.id, candidate.compatibility_score, candidate.match_reason
        );
    }
    Ok(())
}
