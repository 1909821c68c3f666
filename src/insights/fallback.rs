//! Generic bundle served when insight generation fails. Built from
//! constants only so it cannot fail itself.

use chrono::{DateTime, Utc};

use super::long_term::{LongTermCompatibility, LongTermFactors, Outlook};
use super::{CommunicationTip, DateIdea, InsightBundle, Priority};
use crate::compatibility::{CompatibilityReport, DEFAULT_SCORE};

const SUMMARY: &str = "서로를 알아가는 중이에요. 천천히 대화를 나눠 보세요.";

const STARTERS: [&str; 3] = [
    "요즘 가장 즐겁게 하고 계신 일은 무엇인가요?",
    "주말에는 주로 어떻게 시간을 보내세요?",
    "좋아하는 계절과 그 이유가 궁금해요.",
];

const ADVICE: [&str; 2] = [
    "서두르지 말고 서로의 속도에 맞춰 천천히 알아가세요.",
    "상대의 이야기에 귀 기울이는 것이 좋은 관계의 시작입니다.",
];

const TIPS: [(&str, Priority); 3] = [
    ("상대의 말을 끝까지 들어 주세요", Priority::High),
    ("칭찬과 감사의 표현을 자주 해 주세요", Priority::Medium),
    ("부담 없는 연락 주기를 함께 정해 보세요", Priority::Low),
];

const DATES: [(&str, &str, &str); 2] = [
    ("공원 산책", "가까운 공원을 함께 걸으며 이야기를 나눠 보세요.", "야외"),
    ("찻집 데이트", "조용한 찻집에서 차 한 잔과 함께 대화해 보세요.", "휴식"),
];

pub fn fallback_bundle(now: DateTime<Utc>) -> InsightBundle {
    let neutral = DEFAULT_SCORE;
    InsightBundle {
        compatibility_analysis: CompatibilityReport {
            score: DEFAULT_SCORE,
            band: None,
            summary: SUMMARY.to_string(),
            strengths: Vec::new(),
            challenges: Vec::new(),
            tips: Vec::new(),
            assessed: false,
        },
        conversation_starters: STARTERS.iter().map(|s| s.to_string()).collect(),
        relationship_advice: ADVICE.iter().map(|s| s.to_string()).collect(),
        potential_challenges: Vec::new(),
        strength_areas: Vec::new(),
        date_ideas: DATES
            .iter()
            .map(|(title, description, category)| DateIdea {
                title: title.to_string(),
                description: description.to_string(),
                category: category.to_string(),
            })
            .collect(),
        communication_tips: TIPS
            .iter()
            .map(|(tip, priority)| CommunicationTip {
                tip: tip.to_string(),
                priority: *priority,
            })
            .collect(),
        long_term_compatibility: LongTermCompatibility {
            score: neutral,
            outlook: Outlook::from_score(neutral),
            description: SUMMARY.to_string(),
            factors: LongTermFactors {
                values_alignment: neutral,
                lifestyle_compatibility: neutral,
                communication_potential: neutral,
                family_compatibility: neutral,
                location_compatibility: neutral,
            },
            recommendations: Vec::new(),
        },
        generated_at: now,
        fallback: true,
    }
}
