//! Data models for content generation: the fixed targeting vocabulary
//! (country, industry, platform, tone, goal), the generation request, the
//! sampling configuration, and the final response.
//!
//! All categorical fields are closed enums. They derive `clap::ValueEnum` so
//! the CLI surface and the core share one vocabulary and an unknown value is
//! unrepresentable past argument parsing.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Categorical enums
// ────────────────────────────────────────────────────────────────────────────

/// Supported target countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Country {
    US,
    CN,
    JP,
    FR,
    DE,
    UK,
    KR,
    IN,
    BR,
    ES,
}

impl Country {
    /// Default content language for this country. Used when the request does
    /// not carry an explicit language override.
    pub fn default_language(&self) -> &'static str {
        match self {
            Country::US | Country::UK | Country::IN => "en",
            Country::CN => "zh",
            Country::JP => "ja",
            Country::FR => "fr",
            Country::DE => "de",
            Country::KR => "ko",
            Country::BR => "pt",
            Country::ES => "es",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::US => "US",
            Country::CN => "CN",
            Country::JP => "JP",
            Country::FR => "FR",
            Country::DE => "DE",
            Country::UK => "UK",
            Country::KR => "KR",
            Country::IN => "IN",
            Country::BR => "BR",
            Country::ES => "ES",
        }
    }
}

/// Supported industries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    General,
    Finance,
    Health,
    Education,
    Gaming,
    Technology,
    Lifestyle,
    Business,
    Travel,
    Food,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::General => "general",
            Industry::Finance => "finance",
            Industry::Health => "health",
            Industry::Education => "education",
            Industry::Gaming => "gaming",
            Industry::Technology => "technology",
            Industry::Lifestyle => "lifestyle",
            Industry::Business => "business",
            Industry::Travel => "travel",
            Industry::Food => "food",
        }
    }
}

/// Supported publishing platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Medium,
    Zhihu,
    Twitter,
    Xiaohongshu,
    Wechat,
    Linkedin,
    Substack,
    Note,
    Blog,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Medium => "medium",
            Platform::Zhihu => "zhihu",
            Platform::Twitter => "twitter",
            Platform::Xiaohongshu => "xiaohongshu",
            Platform::Wechat => "wechat",
            Platform::Linkedin => "linkedin",
            Platform::Substack => "substack",
            Platform::Note => "note",
            Platform::Blog => "blog",
        }
    }
}

/// Content tone options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Entertaining,
    Analytical,
    Inspirational,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Entertaining => "entertaining",
            Tone::Analytical => "analytical",
            Tone::Inspirational => "inspirational",
            Tone::Neutral => "neutral",
        }
    }
}

/// Content goals, i.e. what the post is optimized to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Engagement,
    Conversion,
    Shares,
    Comments,
    Followers,
    Awareness,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Engagement => "engagement",
            Goal::Conversion => "conversion",
            Goal::Shares => "shares",
            Goal::Comments => "comments",
            Goal::Followers => "followers",
            Goal::Awareness => "awareness",
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Html,
    Json,
    Plain,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => ".md",
            OutputFormat::Html => ".html",
            OutputFormat::Json => ".json",
            OutputFormat::Plain => ".txt",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Plain => "plain",
        }
    }

    /// Parses a short CLI token like "md" or "html". Accepts both the short
    /// extension spelling and the full name.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "md" | "markdown" => Some(OutputFormat::Markdown),
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            "txt" | "plain" => Some(OutputFormat::Plain),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / sampling config
// ────────────────────────────────────────────────────────────────────────────

/// Word-count bounds accepted for a request.
pub const MIN_LENGTH: u32 = 100;
pub const MAX_LENGTH: u32 = 5000;

/// A content generation request. Immutable once constructed; identity is
/// value equality only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub topic: String,
    pub country: Country,
    pub industry: Industry,
    pub platform: Platform,
    pub tone: Tone,
    pub goal: Goal,
    /// Resolved at construction: explicit override, else derived from country.
    pub language: String,
    pub keywords: Vec<String>,
    /// Approximate word count, within [MIN_LENGTH, MAX_LENGTH].
    pub length: u32,
    pub custom_instructions: Option<String>,
}

impl ContentRequest {
    /// Builds a request, deriving the language from the country when no
    /// explicit override is given. Rejects empty topics and out-of-range
    /// lengths.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        topic: impl Into<String>,
        country: Country,
        industry: Industry,
        platform: Platform,
        tone: Tone,
        goal: Goal,
        language: Option<String>,
        keywords: Vec<String>,
        length: u32,
        custom_instructions: Option<String>,
    ) -> Result<Self, AppError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(AppError::Validation("topic must not be empty".to_string()));
        }
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(AppError::Validation(format!(
                "length must be between {MIN_LENGTH} and {MAX_LENGTH} words, got {length}"
            )));
        }

        let language = language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| country.default_language().to_string());

        Ok(Self {
            topic,
            country,
            industry,
            platform,
            tone,
            goal,
            language,
            keywords,
            length,
            custom_instructions,
        })
    }
}

/// Sampling configuration for one generation. Snapshotted from the global
/// `Config` at the start of each generation so mid-run config edits cannot
/// change an in-flight attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,

    pub enable_humanization: bool,
    pub enable_engagement_optimization: bool,
    pub enable_platform_optimization: bool,

    /// Minimum quality score a draft must reach to be accepted without retry.
    pub min_quality_score: f32,
    /// Total attempt budget, bounded [1, 10].
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "mistralai/mistral-small-3.2-24b-instruct:free".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            enable_humanization: true,
            enable_engagement_optimization: true,
            enable_platform_optimization: true,
            min_quality_score: 0.7,
            max_retries: 3,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model reply / parsed draft / final response
// ────────────────────────────────────────────────────────────────────────────

/// A raw reply from the model API, produced once per call and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub content: String,
    /// Model id actually used (suffixed " (demo)" on the offline path).
    pub model: String,
    /// Token usage counts as reported by the API (or synthesized in demo mode).
    pub usage: BTreeMap<String, u64>,
    pub finish_reason: String,
    pub metadata: AiResponseMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponseMetadata {
    pub response_time_ms: u64,
    pub status_code: u16,
    #[serde(default)]
    pub demo_mode: bool,
}

/// The parsed, not-yet-post-processed interpretation of one model reply.
/// Post-processors append tips and notes in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub engagement_tips: Vec<String>,
    pub platform_notes: Vec<String>,
}

/// The final generation result returned to callers. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse {
    pub title: String,
    pub content: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub engagement_tips: Vec<String>,
    pub platform_specific_notes: Vec<String>,
    pub word_count: u32,
    /// Minutes, at 200 words per minute, never below 1.
    pub estimated_read_time: u32,
    pub tags: Vec<String>,
}

impl ContentResponse {
    /// The only constructor; enforces the read-time invariant
    /// `estimated_read_time == max(1, round(word_count / 200))`.
    pub fn new(
        title: String,
        content: String,
        metadata: serde_json::Map<String, serde_json::Value>,
        engagement_tips: Vec<String>,
        platform_specific_notes: Vec<String>,
        tags: Vec<String>,
    ) -> Self {
        let word_count = content.split_whitespace().count() as u32;
        Self {
            title,
            content,
            metadata,
            engagement_tips,
            platform_specific_notes,
            word_count,
            estimated_read_time: estimate_read_time(word_count),
            tags,
        }
    }
}

/// Reading time in whole minutes at 200 wpm, floor 1.
pub fn estimate_read_time(word_count: u32) -> u32 {
    std::cmp::max(1, (word_count as f64 / 200.0).round() as u32)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_request(language: Option<String>, country: Country) -> ContentRequest {
        ContentRequest::new(
            "Rust in Production",
            country,
            Industry::Technology,
            Platform::Medium,
            Tone::Professional,
            Goal::Engagement,
            language,
            vec![],
            1000,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_language_derived_from_country() {
        assert_eq!(basic_request(None, Country::US).language, "en");
        assert_eq!(basic_request(None, Country::CN).language, "zh");
        assert_eq!(basic_request(None, Country::BR).language, "pt");
        assert_eq!(basic_request(None, Country::IN).language, "en");
    }

    #[test]
    fn test_explicit_language_overrides_country() {
        let req = basic_request(Some("fr".to_string()), Country::US);
        assert_eq!(req.language, "fr");
    }

    #[test]
    fn test_blank_language_falls_back_to_country() {
        let req = basic_request(Some("  ".to_string()), Country::JP);
        assert_eq!(req.language, "ja");
    }

    #[test]
    fn test_empty_topic_rejected() {
        let result = ContentRequest::new(
            "   ",
            Country::US,
            Industry::General,
            Platform::Blog,
            Tone::Neutral,
            Goal::Awareness,
            None,
            vec![],
            1000,
            None,
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_length_bounds_enforced() {
        for bad in [0, 99, 5001] {
            let result = ContentRequest::new(
                "Topic",
                Country::US,
                Industry::General,
                Platform::Blog,
                Tone::Neutral,
                Goal::Awareness,
                None,
                vec![],
                bad,
                None,
            );
            assert!(result.is_err(), "length {bad} should be rejected");
        }
        // Boundary values are accepted
        for ok in [100, 5000] {
            assert!(ContentRequest::new(
                "Topic",
                Country::US,
                Industry::General,
                Platform::Blog,
                Tone::Neutral,
                Goal::Awareness,
                None,
                vec![],
                ok,
                None,
            )
            .is_ok());
        }
    }

    #[test]
    fn test_read_time_invariant() {
        assert_eq!(estimate_read_time(0), 1);
        assert_eq!(estimate_read_time(1), 1);
        assert_eq!(estimate_read_time(200), 1);
        assert_eq!(estimate_read_time(300), 2); // round(1.5) == 2
        assert_eq!(estimate_read_time(1000), 5);
        assert_eq!(estimate_read_time(2100), 11);
    }

    #[test]
    fn test_response_constructor_computes_word_count_and_read_time() {
        let body = vec!["word"; 450].join(" ");
        let response = ContentResponse::new(
            "T".to_string(),
            body,
            serde_json::Map::new(),
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(response.word_count, 450);
        assert_eq!(
            response.estimated_read_time,
            estimate_read_time(response.word_count)
        );
    }

    #[test]
    fn test_output_format_tokens() {
        assert_eq!(OutputFormat::from_token("md"), Some(OutputFormat::Markdown));
        assert_eq!(
            OutputFormat::from_token("MARKDOWN"),
            Some(OutputFormat::Markdown)
        );
        assert_eq!(OutputFormat::from_token("txt"), Some(OutputFormat::Plain));
        assert_eq!(OutputFormat::from_token("docx"), None);
    }

    #[test]
    fn test_enum_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::Xiaohongshu).unwrap(),
            "\"xiaohongshu\""
        );
        assert_eq!(serde_json::to_string(&Country::CN).unwrap(), "\"CN\"");
        let tone: Tone = serde_json::from_str("\"casual\"").unwrap();
        assert_eq!(tone, Tone::Casual);
    }
}
