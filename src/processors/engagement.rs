//! Engagement optimization pass.
//!
//! Goal-keyed content additions (questions, calls-to-action, hooks), sparing
//! emotional triggers, structural cleanup, and platform-specific engagement
//! add-ons. Produces the rewritten content plus advisory tips describing what
//! was applied and what the author can still do manually.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use super::ProcessorOutput;
use crate::models::{ContentRequest, Goal, Platform};

const QUESTIONS: &[&str] = &[
    "What do you think about this?",
    "Have you experienced something similar?",
    "What's your take on this?",
    "How do you handle this situation?",
    "What would you add to this list?",
];

const CALLS_TO_ACTION: &[&str] = &[
    "Share your thoughts in the comments below!",
    "Let me know what you think!",
    "I'd love to hear your perspective!",
    "Drop a comment and let's discuss!",
];

const SHAREABLE_QUOTE_MARKERS: &[&str] = &["💡 Key insight:", "🔥 Remember this:", "✨ Pro tip:", "🎯 Bottom line:"];

const SHARE_PROMPTS: &[&str] = &[
    "Found this helpful? Share it with someone who needs to see this!",
    "If this resonates with you, pass it along!",
    "Think others would benefit? Hit that share button!",
];

const DISCUSSION_STARTERS: &[&str] = &[
    "What's your experience with this?",
    "Am I missing something here?",
    "What would you do differently?",
    "Which approach works best for you?",
];

const FOLLOW_PROMPTS: &[&str] = &[
    "Follow for more insights like this!",
    "Want more content like this? Hit follow!",
    "Join me for regular updates on this topic!",
];

const URGENCY_CREATORS: &[&str] = &[
    "Don't wait on this:",
    "Time-sensitive opportunity:",
    "Limited availability:",
    "Act now:",
];

const BENEFIT_HIGHLIGHTERS: &[&str] = &[
    "Here's what you'll gain:",
    "The benefits are clear:",
    "This will help you:",
];

const EDUCATIONAL_HOOKS: &[&str] = &[
    "Did you know that:",
    "Here's something most people don't realize:",
    "The surprising truth is:",
    "What many don't understand:",
];

fn emotional_triggers(kind: &str) -> &'static [&'static str] {
    match kind {
        "curiosity" => &["surprising", "secret", "hidden", "revealed", "discovered"],
        "urgency" => &["now", "today", "immediately", "quickly", "before it's too late"],
        "exclusivity" => &["exclusive", "insider", "private", "members only", "VIP"],
        "social_proof" => &["thousands", "millions", "everyone", "most people", "experts"],
        "fear" => &["mistake", "danger", "risk", "warning", "avoid"],
        "desire" => &["want", "need", "crave", "dream", "wish"],
        _ => &[],
    }
}

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static KEY_PHRASE_SENTENCES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)([^.!?]*\b(?:important|crucial|essential|key|vital)\b[^.!?]*[.!?])",
        r"(?i)([^.!?]*\b(?:remember|note|keep in mind)\b[^.!?]*[.!?])",
        r"(?i)([^.!?]*\b(?:tip|advice|suggestion)\b[^.!?]*[.!?])",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Runs the engagement pass for one request.
pub fn optimize_engagement(
    content: &str,
    request: &ContentRequest,
    rng: &mut impl Rng,
) -> ProcessorOutput {
    let mut tips = Vec::new();
    let mut content = apply_goal_optimization(content.to_string(), request.goal, &mut tips, rng);

    content = add_emotional_triggers(content, request.goal, rng);
    content = EXCESS_NEWLINES.replace_all(&content, "\n\n").into_owned();
    content = add_emphasis(content, rng);

    content = add_platform_engagement(content, request.platform, &mut tips);
    tips.extend(advice_tips(request));

    ProcessorOutput { content, notes: tips }
}

fn apply_goal_optimization(
    content: String,
    goal: Goal,
    tips: &mut Vec<String>,
    rng: &mut impl Rng,
) -> String {
    match goal {
        Goal::Engagement => {
            let mut content = add_questions(content, rng);
            if let Some(cta) = CALLS_TO_ACTION.choose(rng) {
                content.push_str(&format!("\n\n{cta}"));
                tips.push("Added call-to-action to encourage comments".to_string());
            }
            content
        }
        Goal::Shares => {
            let mut content = add_shareable_quotes(content, rng);
            if let Some(prompt) = SHARE_PROMPTS.choose(rng) {
                content.push_str(&format!("\n\n{prompt}"));
                tips.push("Added share prompt to encourage sharing".to_string());
            }
            content
        }
        Goal::Comments => {
            let mut content = content;
            if let Some(starter) = DISCUSSION_STARTERS.choose(rng) {
                content.push_str(&format!("\n\n{starter}"));
                tips.push("Added discussion starter to encourage comments".to_string());
            }
            content
        }
        Goal::Followers => {
            let mut content = content;
            if let Some(prompt) = FOLLOW_PROMPTS.choose(rng) {
                content.push_str(&format!("\n\n{prompt}"));
                tips.push("Added follow prompt to encourage subscriptions".to_string());
            }
            content
        }
        Goal::Conversion => {
            let mut content = content;
            if let Some(urgency) = URGENCY_CREATORS.choose(rng) {
                content.push_str(&format!("\n\n{urgency}"));
            }
            if let Some(benefits) = BENEFIT_HIGHLIGHTERS.choose(rng) {
                content.push_str(&format!(
                    "\n\n{benefits}\n- Save time and effort\n- Get better results\n- Avoid common mistakes"
                ));
            }
            tips.push("Added conversion-focused elements".to_string());
            content
        }
        Goal::Awareness => {
            let content = match EDUCATIONAL_HOOKS.choose(rng) {
                Some(hook) => format!("{hook} {content}"),
                None => content,
            };
            tips.push("Added educational hooks for awareness".to_string());
            content
        }
    }
}

// Every third paragraph gets a 40% chance of a trailing question.
fn add_questions(content: String, rng: &mut impl Rng) -> String {
    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    let mut i = 1;
    while i < paragraphs.len() {
        if rng.gen_bool(0.4) {
            if let Some(question) = QUESTIONS.choose(rng) {
                paragraphs[i].push_str(&format!("\n\n{question}"));
            }
        }
        i += 3;
    }
    paragraphs.join("\n\n")
}

// 10% chance per medium-length sentence of being pulled out as a quote.
fn add_shareable_quotes(content: String, rng: &mut impl Rng) -> String {
    let sentences: Vec<String> = content
        .split(". ")
        .map(|sentence| {
            let len = sentence.chars().count();
            if len > 30 && len < 120 && rng.gen_bool(0.1) {
                if let Some(marker) = SHAREABLE_QUOTE_MARKERS.choose(rng) {
                    return format!("\n\n{marker} {sentence}\n\n");
                }
            }
            sentence.to_string()
        })
        .collect();
    sentences.join(". ")
}

fn add_emotional_triggers(mut content: String, goal: Goal, rng: &mut impl Rng) -> String {
    let trigger_types: &[&str] = match goal {
        Goal::Engagement | Goal::Awareness => &["curiosity", "social_proof"],
        Goal::Shares => &["curiosity", "exclusivity"],
        Goal::Conversion => &["urgency", "desire", "fear"],
        _ => &["curiosity"],
    };

    for kind in trigger_types {
        if rng.gen_bool(0.3) {
            if let Some(word) = emotional_triggers(kind).choose(rng) {
                content = incorporate_trigger(content, word, rng);
            }
        }
    }
    content
}

// Only the prefix-friendly trigger words get worked in.
fn incorporate_trigger(content: String, trigger_word: &str, rng: &mut impl Rng) -> String {
    if !matches!(trigger_word, "surprising" | "secret" | "hidden") {
        return content;
    }
    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    if paragraphs.len() > 1 {
        let target = rng.gen_range(1..paragraphs.len());
        paragraphs[target] = format!("Here's something {trigger_word}: {}", paragraphs[target]);
        return paragraphs.join("\n\n");
    }
    content
}

// 30% chance per key-phrase pattern of bolding its first matching sentence.
fn add_emphasis(mut content: String, rng: &mut impl Rng) -> String {
    for pattern in KEY_PHRASE_SENTENCES.iter() {
        if rng.gen_bool(0.3) {
            content = pattern.replace(&content, "**${1}**").into_owned();
        }
    }
    content
}

fn add_platform_engagement(content: String, platform: Platform, tips: &mut Vec<String>) -> String {
    match platform {
        Platform::Twitter => {
            tips.push("Optimized for Twitter thread format".to_string());
            thread_markers(content)
        }
        Platform::Linkedin => {
            tips.push("Added LinkedIn networking prompt".to_string());
            format!("{content}\n\nWhat's your experience with this? Let's connect and discuss!")
        }
        Platform::Zhihu => {
            tips.push("Optimized for Zhihu Q&A format".to_string());
            zhihu_frame(content)
        }
        _ => content,
    }
}

fn thread_markers(content: String) -> String {
    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    if paragraphs.len() > 3 {
        paragraphs[0] = format!("🧵 Thread: {}", paragraphs[0]);
        for (i, para) in paragraphs.iter_mut().enumerate().take(10).skip(1) {
            *para = format!("{}/ {para}", i + 1);
        }
    }
    paragraphs.join("\n\n")
}

fn zhihu_frame(content: String) -> String {
    if content.starts_with("问题：") {
        return content;
    }
    let first_sentence = content.split('.').next().unwrap_or(&content);
    format!("问题：关于{first_sentence}的思考\n\n答案：\n\n{content}")
}

fn advice_tips(request: &ContentRequest) -> Vec<String> {
    let mut tips = Vec::new();
    match request.goal {
        Goal::Engagement => {
            tips.push("Ask follow-up questions in comments to keep conversations going".to_string());
            tips.push("Respond to comments quickly to boost engagement".to_string());
        }
        Goal::Shares => {
            tips.push("Create visually appealing quote cards from key insights".to_string());
            tips.push("Share behind-the-scenes content related to this topic".to_string());
        }
        Goal::Comments => {
            tips.push("Share a personal story related to this topic".to_string());
            tips.push("Ask for specific examples from your audience".to_string());
        }
        _ => {}
    }
    match request.platform {
        Platform::Linkedin => {
            tips.push("Tag relevant industry professionals in your post".to_string());
            tips.push("Share in relevant LinkedIn groups".to_string());
        }
        Platform::Twitter => {
            tips.push("Use relevant hashtags to increase discoverability".to_string());
            tips.push("Engage with replies to boost thread visibility".to_string());
        }
        _ => {}
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, Industry, Tone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(goal: Goal, platform: Platform) -> ContentRequest {
        ContentRequest::new(
            "Topic",
            Country::US,
            Industry::General,
            platform,
            Tone::Casual,
            goal,
            None,
            vec![],
            500,
            None,
        )
        .unwrap()
    }

    const BODY: &str = "First paragraph about the topic.\n\nSecond paragraph with details.\n\n\
                        Third paragraph wrapping up the argument.\n\nFourth paragraph closing.";

    #[test]
    fn test_engagement_goal_appends_cta() {
        let req = request(Goal::Engagement, Platform::Blog);
        let out = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(1));
        let has_cta = CALLS_TO_ACTION.iter().any(|cta| out.content.contains(cta));
        assert!(has_cta, "no call-to-action in: {}", out.content);
        assert!(out
            .notes
            .contains(&"Added call-to-action to encourage comments".to_string()));
    }

    #[test]
    fn test_conversion_goal_adds_benefit_block() {
        let req = request(Goal::Conversion, Platform::Blog);
        let out = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(2));
        assert!(out.content.contains("- Save time and effort"));
        assert!(out
            .notes
            .contains(&"Added conversion-focused elements".to_string()));
    }

    #[test]
    fn test_awareness_goal_prefixes_hook() {
        let req = request(Goal::Awareness, Platform::Blog);
        let out = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(3));
        let hooked = EDUCATIONAL_HOOKS.iter().any(|h| out.content.starts_with(h));
        assert!(hooked, "no hook prefix in: {}", out.content);
    }

    #[test]
    fn test_excess_newlines_collapsed() {
        let req = request(Goal::Followers, Platform::Blog);
        let out = optimize_engagement("a\n\n\n\nb", &req, &mut StdRng::seed_from_u64(4));
        assert!(!out.content.contains("\n\n\n"));
    }

    #[test]
    fn test_twitter_thread_markers() {
        let req = request(Goal::Followers, Platform::Twitter);
        let out = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(5));
        assert!(out.content.contains("🧵 Thread:"));
        assert!(out.content.contains("2/ "));
        assert!(out.notes.contains(&"Optimized for Twitter thread format".to_string()));
    }

    #[test]
    fn test_linkedin_networking_line_and_tips() {
        let req = request(Goal::Comments, Platform::Linkedin);
        let out = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(6));
        assert!(out.content.contains("Let's connect and discuss!"));
        assert!(out
            .notes
            .contains(&"Tag relevant industry professionals in your post".to_string()));
    }

    #[test]
    fn test_zhihu_frame_applied_once() {
        let req = request(Goal::Followers, Platform::Zhihu);
        let out = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(7));
        assert!(out.content.starts_with("问题："));
        let again = optimize_engagement(&out.content, &req, &mut StdRng::seed_from_u64(8));
        assert_eq!(again.content.matches("问题：").count(), 1);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let req = request(Goal::Engagement, Platform::Twitter);
        let a = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(9));
        let b = optimize_engagement(BODY, &req, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.content, b.content);
        assert_eq!(a.notes, b.notes);
    }
}
