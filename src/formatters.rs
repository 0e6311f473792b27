//! Output rendering.
//!
//! Pure functions from a finished `ContentResponse` to Markdown, HTML, JSON,
//! or plain text. All four are idempotent for a given response.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ContentResponse, OutputFormat};

/// Renders a response in the requested format.
pub fn format_content(response: &ContentResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Markdown => format_markdown(response),
        OutputFormat::Html => format_html(response),
        OutputFormat::Json => format_json(response),
        OutputFormat::Plain => format_plain(response),
    }
}

fn generation_time(response: &ContentResponse) -> Option<&str> {
    response
        .metadata
        .get("generation_time")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Markdown
// ────────────────────────────────────────────────────────────────────────────

fn format_markdown(response: &ContentResponse) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push(format!("# {}", response.title));
    out.push(String::new());

    out.push("---".to_string());
    out.push(format!("**Word Count:** {}", response.word_count));
    out.push(format!("**Reading Time:** {} minutes", response.estimated_read_time));
    if !response.tags.is_empty() {
        out.push(format!("**Tags:** {}", response.tags.join(", ")));
    }
    if let Some(time) = generation_time(response) {
        out.push(format!("**Generated:** {time}"));
    }
    out.push("---".to_string());
    out.push(String::new());

    out.push(response.content.clone());
    out.push(String::new());

    if !response.engagement_tips.is_empty() {
        out.push("## 💡 Engagement Tips".to_string());
        out.push(String::new());
        for tip in &response.engagement_tips {
            out.push(format!("- {tip}"));
        }
        out.push(String::new());
    }

    if !response.platform_specific_notes.is_empty() {
        out.push("## 📝 Platform Notes".to_string());
        out.push(String::new());
        for note in &response.platform_specific_notes {
            out.push(format!("- {note}"));
        }
        out.push(String::new());
    }

    out.join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// HTML
// ────────────────────────────────────────────────────────────────────────────

const HTML_STYLE: &str = r#"<style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }
        h1 {
            color: #2c3e50;
            border-bottom: 3px solid #3498db;
            padding-bottom: 10px;
        }
        h2 {
            color: #34495e;
            margin-top: 30px;
        }
        .metadata {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 5px;
            margin: 20px 0;
            border-left: 4px solid #3498db;
        }
        .tips, .notes {
            background: #fff3cd;
            padding: 15px;
            border-radius: 5px;
            margin: 20px 0;
            border-left: 4px solid #ffc107;
        }
        .tips ul, .notes ul {
            margin: 0;
            padding-left: 20px;
        }
        .content {
            margin: 30px 0;
        }
        .footer {
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid #eee;
            color: #666;
            font-size: 0.9em;
        }
    </style>"#;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn format_html(response: &ContentResponse) -> String {
    let title = escape_html(&response.title);
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>{title}</title>\n    {HTML_STYLE}\n</head>\n<body>\n    <h1>{title}</h1>\n"
    );

    html.push_str(&format!(
        "\n    <div class=\"metadata\">\n        <strong>Word Count:</strong> {}<br>\n        \
         <strong>Reading Time:</strong> {} minutes<br>\n",
        response.word_count, response.estimated_read_time
    ));
    if !response.tags.is_empty() {
        let tags: Vec<String> = response.tags.iter().map(|t| escape_html(t)).collect();
        html.push_str(&format!("        <strong>Tags:</strong> {}<br>\n", tags.join(", ")));
    }
    if let Some(time) = generation_time(response) {
        html.push_str(&format!("        <strong>Generated:</strong> {time}<br>\n"));
    }
    html.push_str("    </div>\n");

    html.push_str(&format!(
        "\n    <div class=\"content\">\n        {}\n    </div>\n",
        markdown_to_html(&response.content)
    ));

    if !response.engagement_tips.is_empty() {
        html.push_str("\n    <div class=\"tips\">\n        <h2>💡 Engagement Tips</h2>\n        <ul>\n");
        for tip in &response.engagement_tips {
            html.push_str(&format!("            <li>{}</li>\n", escape_html(tip)));
        }
        html.push_str("        </ul>\n    </div>\n");
    }

    if !response.platform_specific_notes.is_empty() {
        html.push_str("\n    <div class=\"notes\">\n        <h2>📝 Platform Notes</h2>\n        <ul>\n");
        for note in &response.platform_specific_notes {
            html.push_str(&format!("            <li>{}</li>\n", escape_html(note)));
        }
        html.push_str("        </ul>\n    </div>\n");
    }

    html.push_str(
        "\n    <div class=\"footer\">\n        Generated by InkForge - AI-powered content creation tool\n    </div>\n</body>\n</html>",
    );
    html
}

static MD_H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### (.+)$").unwrap());
static MD_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.+)$").unwrap());
static MD_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# (.+)$").unwrap());
static MD_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static MD_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static MD_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap());

/// Minimal Markdown conversion: headings, bold, italic, links, paragraphs.
fn markdown_to_html(content: &str) -> String {
    let escaped = escape_html(content);
    let converted = MD_H3.replace_all(&escaped, "<h3>${1}</h3>");
    let converted = MD_H2.replace_all(&converted, "<h2>${1}</h2>");
    let converted = MD_H1.replace_all(&converted, "<h1>${1}</h1>");
    let converted = MD_BOLD.replace_all(&converted, "<strong>${1}</strong>");
    let converted = MD_ITALIC.replace_all(&converted, "<em>${1}</em>");
    let converted = MD_LINK.replace_all(&converted, "<a href=\"${2}\">${1}</a>");

    converted
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with("<h") || p.starts_with("<ul") || p.starts_with("<ol") {
                p.to_string()
            } else {
                format!("<p>{p}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// JSON / plain text
// ────────────────────────────────────────────────────────────────────────────

fn format_json(response: &ContentResponse) -> String {
    // ContentResponse always serializes; fall back to an empty object on the
    // impossible path rather than panicking inside a formatter.
    serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
}

static MD_HEADER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s+").unwrap());
static MD_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.+?)`").unwrap());
static MD_QUOTE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>\s+").unwrap());
static MD_LINK_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.+?)\]\(.+?\)").unwrap());

fn strip_markdown(content: &str) -> String {
    let stripped = MD_HEADER_PREFIX.replace_all(content, "");
    let stripped = MD_BOLD.replace_all(&stripped, "${1}");
    let stripped = MD_ITALIC.replace_all(&stripped, "${1}");
    let stripped = MD_LINK_TEXT.replace_all(&stripped, "${1}");
    let stripped = MD_CODE.replace_all(&stripped, "${1}");
    MD_QUOTE_PREFIX.replace_all(&stripped, "").into_owned()
}

fn format_plain(response: &ContentResponse) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push(response.title.to_uppercase());
    out.push("=".repeat(response.title.chars().count()));
    out.push(String::new());

    out.push(format!("Word Count: {}", response.word_count));
    out.push(format!("Reading Time: {} minutes", response.estimated_read_time));
    if !response.tags.is_empty() {
        out.push(format!("Tags: {}", response.tags.join(", ")));
    }
    out.push(String::new());
    out.push("-".repeat(50));
    out.push(String::new());

    out.push(strip_markdown(&response.content));
    out.push(String::new());

    if !response.engagement_tips.is_empty() {
        out.push("ENGAGEMENT TIPS:".to_string());
        out.push("-".repeat(20));
        for (i, tip) in response.engagement_tips.iter().enumerate() {
            out.push(format!("{}. {tip}", i + 1));
        }
        out.push(String::new());
    }

    if !response.platform_specific_notes.is_empty() {
        out.push("PLATFORM NOTES:".to_string());
        out.push("-".repeat(20));
        for (i, note) in response.platform_specific_notes.iter().enumerate() {
            out.push(format!("{}. {note}", i + 1));
        }
        out.push(String::new());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> ContentResponse {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "generation_time".to_string(),
            serde_json::Value::String("2026-08-29T10:00:00".to_string()),
        );
        ContentResponse::new(
            "Test & Title".to_string(),
            "## Section\n\nSome **bold** body with a [link](https://example.com).\n\nSecond paragraph."
                .to_string(),
            metadata,
            vec!["Tip one".to_string()],
            vec!["Note <one>".to_string()],
            vec!["rust".to_string(), "cli".to_string()],
        )
    }

    #[test]
    fn test_markdown_layout() {
        let md = format_markdown(&response());
        assert!(md.starts_with("# Test & Title\n"));
        assert!(md.contains("**Word Count:** 10"));
        assert!(md.contains("**Tags:** rust, cli"));
        assert!(md.contains("## 💡 Engagement Tips"));
        assert!(md.contains("- Tip one"));
        assert!(md.contains("## 📝 Platform Notes"));
    }

    #[test]
    fn test_markdown_omits_empty_sections() {
        let mut resp = response();
        resp.engagement_tips.clear();
        resp.platform_specific_notes.clear();
        resp.tags.clear();
        let md = format_markdown(&resp);
        assert!(!md.contains("Engagement Tips"));
        assert!(!md.contains("Platform Notes"));
        assert!(!md.contains("**Tags:**"));
    }

    #[test]
    fn test_html_escapes_and_converts() {
        let html = format_html(&response());
        assert!(html.contains("<title>Test &amp; Title</title>"));
        assert!(html.contains("<h2>Section</h2>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<li>Note &lt;one&gt;</li>"));
        assert!(html.contains("<p>Second paragraph.</p>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_json_round_trips() {
        let resp = response();
        let json = format_json(&resp);
        let back: ContentResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, resp.title);
        assert_eq!(back.word_count, resp.word_count);
        assert_eq!(back.tags, resp.tags);
    }

    #[test]
    fn test_plain_strips_markdown() {
        let plain = format_plain(&response());
        assert!(plain.starts_with("TEST & TITLE\n"));
        assert!(plain.contains("Section"));
        assert!(!plain.contains("##"));
        assert!(!plain.contains("**"));
        assert!(plain.contains("link"));
        assert!(!plain.contains("](https"));
        assert!(plain.contains("1. Tip one"));
    }

    #[test]
    fn test_formatters_idempotent() {
        let resp = response();
        for format in [
            OutputFormat::Markdown,
            OutputFormat::Html,
            OutputFormat::Json,
            OutputFormat::Plain,
        ] {
            assert_eq!(
                format_content(&resp, format),
                format_content(&resp, format),
                "{format:?} not idempotent"
            );
        }
    }
}
