//! Platform-specific structural rewrites.
//!
//! Deterministic per platform. Each rewrite returns the adjusted content and
//! notes describing what was changed; platforms without rules pass the
//! content through with a single note saying so.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ProcessorOutput;
use crate::models::{ContentRequest, Platform};

static TWO_PARAGRAPH_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\n]+\n\n[^\n]+$").unwrap());
static NUMBERED_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s+[^\n]+(?:\n\d+\.\s+[^\n]+)*").unwrap());
static LIST_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+").unwrap());

/// Applies the platform rewrite for one request.
pub fn optimize_platform(content: &str, request: &ContentRequest) -> ProcessorOutput {
    match request.platform {
        Platform::Medium => optimize_for_medium(content),
        Platform::Zhihu => optimize_for_zhihu(content),
        Platform::Twitter => optimize_for_twitter(content),
        Platform::Xiaohongshu => optimize_for_xiaohongshu(content),
        Platform::Linkedin => optimize_for_linkedin(content),
        Platform::Substack => optimize_for_substack(content),
        Platform::Wechat | Platform::Note | Platform::Blog => ProcessorOutput {
            content: content.to_string(),
            notes: vec![format!(
                "No specific optimization rules for {}",
                request.platform.as_str()
            )],
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Medium
// ────────────────────────────────────────────────────────────────────────────

fn optimize_for_medium(content: &str) -> ProcessorOutput {
    let mut notes = Vec::new();
    let mut content = content.to_string();

    // Subtitle directly under the first line unless the head already reads
    // as title + standfirst.
    let head: String = content.chars().take(200).collect();
    if !TWO_PARAGRAPH_HEAD.is_match(&head) {
        if let Some((first, rest)) = content.split_once('\n') {
            let subtitle = "A comprehensive guide to understanding this important topic.";
            content = format!("{first}\n\n{subtitle}\n\n{}", rest.trim_start_matches('\n'));
            notes.push("Added subtitle for Medium format".to_string());
        }
    }

    content = add_medium_headings(&content);
    notes.push("Optimized heading structure for Medium".to_string());

    content = convert_numbered_lists(&content);
    content = add_pull_quote(&content);
    notes.push("Added formatting elements for better Medium readability".to_string());

    ProcessorOutput { content, notes }
}

// Long paragraphs get a `##` heading carved from their first sentence.
fn add_medium_headings(content: &str) -> String {
    let paragraphs: Vec<String> = content
        .split("\n\n")
        .enumerate()
        .map(|(i, para)| {
            if i > 0 && para.chars().count() > 200 && !para.starts_with('#') {
                if let Some(dot) = para.find('.') {
                    let first_sentence = &para[..dot];
                    if first_sentence.chars().count() < 80 {
                        return format!("## {first_sentence}\n\n{}", &para[dot + 1..]);
                    }
                }
            }
            para.to_string()
        })
        .collect();
    paragraphs.join("\n\n")
}

fn convert_numbered_lists(content: &str) -> String {
    NUMBERED_LIST
        .replace_all(content, |caps: &regex::Captures| {
            caps[0]
                .lines()
                .map(|line| format!("• {}", LIST_PREFIX.replace(line, "")))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .into_owned()
}

// One pull quote, on the first sufficiently punchy sentence.
fn add_pull_quote(content: &str) -> String {
    let mut sentences: Vec<String> = content.split(". ").map(String::from).collect();
    for sentence in sentences.iter_mut() {
        let len = sentence.chars().count();
        let lower = sentence.to_lowercase();
        if len > 50
            && len < 120
            && ["important", "key", "crucial", "remember"]
                .iter()
                .any(|w| lower.contains(w))
        {
            *sentence = format!("\n\n> {sentence}\n\n");
            break;
        }
    }
    sentences.join(". ")
}

// ────────────────────────────────────────────────────────────────────────────
// Zhihu
// ────────────────────────────────────────────────────────────────────────────

fn optimize_for_zhihu(content: &str) -> ProcessorOutput {
    let mut notes = Vec::new();
    let mut content = content.to_string();

    if !content.starts_with("问题：") && !content.starts_with("题主问：") {
        let first_sentence = match content.split_once('.') {
            Some((head, _)) => head.to_string(),
            None => content.chars().take(50).collect(),
        };
        content = format!("问题：{first_sentence}？\n\n我的回答：\n\n{content}");
        notes.push("Converted to Zhihu Q&A format".to_string());
    }

    content = insert_data_support(&content);
    notes.push("Added data support and examples for Zhihu audience".to_string());

    content = to_chinese_punctuation(&content);

    content = prefix_paragraph(&content, 1, "在我的经验中，");
    notes.push("Added personal experience elements".to_string());

    ProcessorOutput { content, notes }
}

fn insert_data_support(content: &str) -> String {
    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    if paragraphs.len() > 2 {
        paragraphs.insert(2, "根据最新研究显示，这个现象在实际应用中非常常见。".to_string());
    }
    paragraphs.join("\n\n")
}

fn to_chinese_punctuation(content: &str) -> String {
    content
        .replace('?', "？")
        .replace('!', "！")
        .replace(',', "，")
        .replace(';', "；")
        .replace(':', "：")
}

fn prefix_paragraph(content: &str, index: usize, prefix: &str) -> String {
    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    if paragraphs.len() > index {
        paragraphs[index] = format!("{prefix}{}", paragraphs[index]);
    }
    paragraphs.join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Twitter
// ────────────────────────────────────────────────────────────────────────────

const TWITTER_EMOJI_MAP: &[(&str, &str)] = &[
    ("important", "⚠️"),
    ("tip", "💡"),
    ("key", "🔑"),
    ("success", "✅"),
    ("warning", "⚠️"),
    ("money", "💰"),
    ("time", "⏰"),
    ("growth", "📈"),
];

const TWITTER_HASHTAGS: &str = "#ContentCreation #BloggingTips #WritingCommunity";

fn optimize_for_twitter(content: &str) -> ProcessorOutput {
    let mut notes = Vec::new();

    let mut content = chunk_into_thread(content);
    notes.push("Converted to Twitter thread format".to_string());

    // First mapped word found gets its emoji, once.
    for (word, emoji) in TWITTER_EMOJI_MAP {
        if content.to_lowercase().contains(word) {
            content = content.replacen(word, &format!("{emoji} {word}"), 1);
            break;
        }
    }
    content.push_str(&format!("\n\n{TWITTER_HASHTAGS}"));
    notes.push("Added emojis and hashtags for Twitter".to_string());

    ProcessorOutput { content, notes }
}

// Greedy packing of paragraphs into ~250-character tweets, then numbering.
fn chunk_into_thread(content: &str) -> String {
    let mut tweets: Vec<String> = Vec::new();
    let mut current = String::new();

    for para in content.split("\n\n") {
        if current.chars().count() + para.chars().count() < 250 {
            current.push_str(para);
            current.push(' ');
        } else {
            if !current.trim().is_empty() {
                tweets.push(current.trim().to_string());
            }
            current = format!("{para} ");
        }
    }
    if !current.trim().is_empty() {
        tweets.push(current.trim().to_string());
    }

    tweets
        .iter()
        .enumerate()
        .map(|(i, tweet)| {
            if i == 0 {
                format!("🧵 {tweet}")
            } else {
                format!("{}/ {tweet}", i + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Xiaohongshu
// ────────────────────────────────────────────────────────────────────────────

const VISUAL_BREAKS: &[&str] = &["✨", "🌟", "💫", "🔥", "💖", "🎯"];

const CASUAL_REPLACEMENTS: &[(&str, &str)] = &[
    ("Furthermore", "还有"),
    ("However", "不过"),
    ("Therefore", "所以"),
    ("Additionally", "另外"),
];

fn optimize_for_xiaohongshu(content: &str) -> ProcessorOutput {
    let mut notes = Vec::new();

    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    let mut i = 1;
    while i < paragraphs.len() {
        let emoji = VISUAL_BREAKS[i % VISUAL_BREAKS.len()];
        paragraphs[i] = format!("{emoji} {}", paragraphs[i]);
        i += 2;
    }
    let mut content = paragraphs.join("\n\n");

    for (formal, casual) in CASUAL_REPLACEMENTS {
        content = content.replace(formal, casual);
    }
    notes.push("Adjusted tone for Xiaohongshu audience".to_string());

    content = prefix_paragraph(&content, 1, "在日常生活中，");
    notes.push("Added lifestyle-focused elements".to_string());

    ProcessorOutput { content, notes }
}

// ────────────────────────────────────────────────────────────────────────────
// LinkedIn
// ────────────────────────────────────────────────────────────────────────────

const LINKEDIN_STATS: &str = "📊 Key Statistics:\n• 85% of professionals report this challenge\n• Industry growth rate: 15% annually\n• ROI improvement: up to 40%";

fn optimize_for_linkedin(content: &str) -> ProcessorOutput {
    let mut notes = Vec::new();

    let mut content = format!("In today's business environment, {content}");
    notes.push("Added professional context for LinkedIn".to_string());

    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    if paragraphs.len() > 1 {
        let at = 2.min(paragraphs.len());
        paragraphs.insert(at, LINKEDIN_STATS.to_string());
    }
    content = paragraphs.join("\n\n");

    content.push_str("\n\n💼 What's your experience with this? Let's connect and share insights!");
    notes.push("Added professional networking elements".to_string());

    ProcessorOutput { content, notes }
}

// ────────────────────────────────────────────────────────────────────────────
// Substack
// ────────────────────────────────────────────────────────────────────────────

const NEWSLETTER_SECTIONS: &[&str] = &[
    "📖 Today's Topic",
    "💡 Key Insights",
    "🎯 Action Items",
    "🤔 Final Thoughts",
];

fn optimize_for_substack(content: &str) -> ProcessorOutput {
    let mut notes = Vec::new();

    let mut content = format!("Hello subscribers! 👋\n\n{content}");

    let mut paragraphs: Vec<String> = content.split("\n\n").map(String::from).collect();
    if paragraphs.len() >= 4 {
        for (i, section) in NEWSLETTER_SECTIONS.iter().enumerate() {
            let at = i * 2;
            if at < paragraphs.len() {
                paragraphs[at] = format!("## {section}\n\n{}", paragraphs[at]);
            }
        }
    }
    content = paragraphs.join("\n\n");
    notes.push("Added newsletter-style sections".to_string());

    content.push_str(
        "\n\n📧 If you found this valuable, please share it with others who might benefit. And don't forget to subscribe for more insights!",
    );
    notes.push("Added subscription call-to-action".to_string());

    ProcessorOutput { content, notes }
}
