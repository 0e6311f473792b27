//! Heuristic splitting of raw model text into title, body, tags, and tips.
//!
//! Single pass over trimmed non-empty lines. Never fails; worst case the
//! whole reply collapses into a "Generated Content" title with the raw text
//! as body.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ParsedDraft;

static H1_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(.+)$").unwrap());
static EXPLICIT_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Title:\s*(.+)$").unwrap());
static BOLD_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\*\*Title:\*\*\s*(.+)$").unwrap());
static TAGS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(suggested tags?|tags?):\s*").unwrap());
static TIPS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(engagement tips?|tips?):\s*").unwrap());

#[derive(PartialEq)]
enum Section {
    Content,
    Tags,
    Tips,
}

/// Parses one raw reply into a draft. Deterministic and infallible.
pub fn parse_response(raw: &str) -> ParsedDraft {
    let mut title = String::new();
    let mut body = String::new();
    let mut tags: Vec<String> = Vec::new();
    let mut tips: Vec<String> = Vec::new();
    let mut section = Section::Content;

    for line in raw.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Title, first match wins; the matching line is claimed.
        if title.is_empty() {
            if let Some(found) = [&*H1_TITLE, &*EXPLICIT_TITLE, &*BOLD_TITLE]
                .iter()
                .find_map(|re| re.captures(line))
                .and_then(|c| c.get(1))
            {
                title = found.as_str().trim().to_string();
                continue;
            }
        }

        // Section headers; the remainder of the header line is the first
        // batch of values.
        if let Some(m) = TAGS_HEADER.find(line) {
            section = Section::Tags;
            push_tags(&mut tags, &line[m.end()..]);
            continue;
        }
        if let Some(m) = TIPS_HEADER.find(line) {
            section = Section::Tips;
            let rest = line[m.end()..].trim();
            if !rest.is_empty() {
                tips.push(rest.to_string());
            }
            continue;
        }
        // A later heading resumes body accumulation.
        if line.starts_with('#') && !title.is_empty() {
            section = Section::Content;
        }

        match section {
            Section::Tags => push_tags(&mut tags, line),
            Section::Tips => tips.push(line.to_string()),
            Section::Content => {
                if title.is_empty()
                    && line.chars().count() > 10
                    && !line.starts_with('-')
                    && !line.starts_with('*')
                {
                    title = line.to_string();
                } else {
                    body.push_str(line);
                    body.push('\n');
                }
            }
        }
    }

    if title.is_empty() {
        let first_line = raw.lines().next().unwrap_or("").trim();
        title = if !first_line.is_empty() && first_line.chars().count() < 100 {
            first_line.to_string()
        } else {
            "Generated Content".to_string()
        };
    }

    let body = body.trim().to_string();
    let body = if body.is_empty() { raw.to_string() } else { body };

    ParsedDraft {
        title,
        content: body,
        tags,
        engagement_tips: tips,
        platform_notes: Vec::new(),
    }
}

fn push_tags(tags: &mut Vec<String>, line: &str) {
    tags.extend(
        line.split([',', ';'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_reply() {
        let raw = "# T\n\nBody line 1\n\nBody line 2\n\nTags: a, b\n\nTips: t1";
        let draft = parse_response(raw);
        assert_eq!(draft.title, "T");
        assert!(draft.content.contains("Body line 1"));
        assert!(draft.content.contains("Body line 2"));
        assert_eq!(draft.tags, vec!["a", "b"]);
        assert_eq!(draft.engagement_tips, vec!["t1"]);
    }

    #[test]
    fn test_explicit_title_line() {
        let draft = parse_response("Title: My Post\n\nSome body text here.");
        assert_eq!(draft.title, "My Post");
        assert_eq!(draft.content, "Some body text here.");
    }

    #[test]
    fn test_bold_title_line() {
        let draft = parse_response("**Title:** Bold Post\n\nBody.");
        assert_eq!(draft.title, "Bold Post");
    }

    #[test]
    fn test_first_substantial_line_becomes_title() {
        let draft = parse_response("A fairly long opening line\nshort\n- bullet");
        assert_eq!(draft.title, "A fairly long opening line");
        assert!(draft.content.contains("short"));
        assert!(draft.content.contains("- bullet"));
    }

    #[test]
    fn test_short_first_line_fallback_title() {
        let draft = parse_response("Hi\nok");
        // Neither line is substantial enough mid-pass; the raw first line
        // becomes the title afterwards.
        assert_eq!(draft.title, "Hi");
    }

    #[test]
    fn test_overlong_first_line_falls_back_to_constant() {
        let long = "-".repeat(120);
        let draft = parse_response(&long);
        assert_eq!(draft.title, "Generated Content");
        assert!(!draft.content.is_empty());
    }

    #[test]
    fn test_empty_body_fails_safe_to_raw() {
        let raw = "# Only A Title";
        let draft = parse_response(raw);
        assert_eq!(draft.title, "Only A Title");
        assert_eq!(draft.content, raw);
    }

    #[test]
    fn test_tag_splitting_on_comma_and_semicolon() {
        let draft = parse_response("# T\n\nBody here\n\nSuggested Tags: rust; cli , tools,,");
        assert_eq!(draft.tags, vec!["rust", "cli", "tools"]);
    }

    #[test]
    fn test_multi_line_tips_section() {
        let draft = parse_response("# T\n\nBody\n\nEngagement Tips:\nAsk a question\nReply early");
        assert_eq!(draft.engagement_tips, vec!["Ask a question", "Reply early"]);
    }

    #[test]
    fn test_heading_after_tags_resumes_body() {
        let draft = parse_response("# T\n\nIntro\n\nTags: a\n\n## More\nExtra body");
        assert_eq!(draft.tags, vec!["a"]);
        assert!(draft.content.contains("## More"));
        assert!(draft.content.contains("Extra body"));
    }

    #[test]
    fn test_demo_reply_shape_parses() {
        let gen = crate::models::GenerationConfig::default();
        let reply = crate::ai_service::demo_response(r#"about "Testing" ok"#, &gen);
        let draft = parse_response(&reply.content);
        assert_eq!(draft.title, "Testing: A Comprehensive Guide");
        assert_eq!(draft.tags.len(), 4);
        // The whole remainder of the tips header line is one tip
        assert_eq!(draft.engagement_tips.len(), 1);
        assert!(draft.content.contains("## Introduction"));
    }
}
