//! Draft quality scoring.
//!
//! Additive point system over structural signals, capped at 1.0. Pure; the
//! orchestrator compares the score against the configured threshold to decide
//! between acceptance and a retry with a mutated prompt.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ContentRequest, ParsedDraft};

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s").unwrap());
static ENGAGEMENT_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\?",
        r"!",
        r"(?i)\b(you|your)\b",
        r"(?i)\b(how|why|what|when|where)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Scores a parsed draft against its request. Always in [0, 1].
///
/// Points: title (+0.2), length ratio vs target (+0.3 at 70%, +0.15 at 50%),
/// headings (+0.1), multiple paragraphs (+0.1), keyword coverage (up to
/// +0.2), engagement indicators (+0.1 when at least 3 of 4 fire).
pub fn quality_score(draft: &ParsedDraft, request: &ContentRequest) -> f32 {
    let mut score = 0.0_f32;
    let content = &draft.content;

    if draft.title.trim().chars().count() > 5 {
        score += 0.2;
    }

    let word_count = content.split_whitespace().count() as f32;
    let target = request.length as f32;
    if word_count >= target * 0.7 {
        score += 0.3;
    } else if word_count >= target * 0.5 {
        score += 0.15;
    }

    if HEADING.is_match(content) {
        score += 0.1;
    }

    if content.matches("\n\n").count() >= 2 {
        score += 0.1;
    }

    if request.keywords.is_empty() {
        score += 0.2;
    } else {
        let lower = content.to_lowercase();
        let found = request
            .keywords
            .iter()
            .filter(|k| lower.contains(&k.to_lowercase()))
            .count() as f32;
        let coverage = (found / request.keywords.len() as f32).min(1.0);
        score += coverage * 0.2;
    }

    let indicator_hits = ENGAGEMENT_INDICATORS
        .iter()
        .filter(|re| re.is_match(content))
        .count();
    if indicator_hits >= 3 {
        score += 0.1;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, Goal, Industry, Platform, Tone};

    fn request(length: u32, keywords: Vec<&str>) -> ContentRequest {
        ContentRequest::new(
            "Scoring",
            Country::US,
            Industry::General,
            Platform::Blog,
            Tone::Neutral,
            Goal::Awareness,
            None,
            keywords.into_iter().map(String::from).collect(),
            length,
            None,
        )
        .unwrap()
    }

    fn draft(title: &str, content: &str) -> ParsedDraft {
        ParsedDraft {
            title: title.to_string(),
            content: content.to_string(),
            ..ParsedDraft::default()
        }
    }

    #[test]
    fn test_score_always_bounded() {
        let samples = [
            draft("", ""),
            draft("A Long Enough Title", &"word ".repeat(2000)),
            draft(
                "Everything Firing",
                &format!(
                    "# H\n\nWhy do you care? You should!\n\nMore.\n\n{}",
                    "filler ".repeat(800)
                ),
            ),
        ];
        for d in &samples {
            let s = quality_score(d, &request(1000, vec![]));
            assert!((0.0..=1.0).contains(&s), "score {s} out of bounds");
        }
    }

    #[test]
    fn test_empty_draft_scores_only_keyword_freebie() {
        let s = quality_score(&draft("", ""), &request(1000, vec![]));
        assert!((s - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_title_component() {
        let body = "short";
        let without = quality_score(&draft("Tiny", body), &request(1000, vec![]));
        let with = quality_score(&draft("A Real Title", body), &request(1000, vec![]));
        assert!((with - without - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_length_ratio_tiers() {
        let req = request(1000, vec![]);
        let at_70 = draft("", &"w ".repeat(700));
        let at_50 = draft("", &"w ".repeat(500));
        let below = draft("", &"w ".repeat(400));
        assert!((quality_score(&at_70, &req) - 0.5).abs() < 1e-6); // 0.3 + 0.2
        assert!((quality_score(&at_50, &req) - 0.35).abs() < 1e-6); // 0.15 + 0.2
        assert!((quality_score(&below, &req) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_keyword_coverage_half() {
        let req = request(1000, vec!["alpha", "beta"]);
        let d = draft("", "only alpha appears here");
        // 1 of 2 keywords found: 0.5 * 0.2 == 0.1
        assert!((quality_score(&d, &req) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let req = request(1000, vec!["Alpha"]);
        let d = draft("", "ALPHA mentioned");
        assert!((quality_score(&d, &req) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_structure_components() {
        let req = request(1000, vec![]);
        let headed = draft("", "# Heading\nbody");
        assert!((quality_score(&headed, &req) - 0.3).abs() < 1e-6); // heading + freebie

        let paragraphs = draft("", "one\n\ntwo\n\nthree");
        assert!((quality_score(&paragraphs, &req) - 0.3).abs() < 1e-6); // paras + freebie
    }

    #[test]
    fn test_engagement_indicators_need_three() {
        let req = request(1000, vec![]);
        let two = draft("", "Do it now! Really now!"); // '!' and nothing else... '!' counts once
        let s_two = quality_score(&two, &req);
        assert!((s_two - 0.2).abs() < 1e-6, "got {s_two}");

        let three = draft("", "How does this help you? It does!");
        // '?', '!', 'you', 'how' all present
        let s_three = quality_score(&three, &req);
        assert!((s_three - 0.3).abs() < 1e-6, "got {s_three}");
    }

    #[test]
    fn test_full_marks_capped_at_one() {
        let body = format!(
            "# Big Heading\n\nWhy should you care? Because it works!\n\nalpha beta\n\n{}",
            "solid content ".repeat(600)
        );
        let d = draft("An Excellent Title", &body);
        let s = quality_score(&d, &request(1000, vec!["alpha", "beta"]));
        assert!((s - 1.0).abs() < 1e-6, "got {s}");
    }
}
