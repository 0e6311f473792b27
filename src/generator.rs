//! Generation orchestrator.
//!
//! Pipeline per generation:
//! 1. Refuse outright when no API key is configured
//! 2. Build the prompt and snapshot the sampling config
//! 3. Call the model, parse the reply, score the draft
//! 4. Accept, or retry with a corrective instruction appended to the prompt
//! 5. Post-process accepted content (humanize, engagement, platform)
//! 6. Persist formats + metadata under the session directory
//!
//! Transport failures retry with the same prompt; only low quality mutates
//! it. When every attempt scores below threshold the last draft is still
//! returned, annotated with a quality warning.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::Local;
use rand::Rng;
use tracing::{error, info, warn};

use crate::ai_service::AiService;
use crate::config::Config;
use crate::errors::AppError;
use crate::formatters::format_content;
use crate::models::{AiResponse, ContentRequest, ContentResponse, GenerationConfig, OutputFormat, ParsedDraft};
use crate::parser::parse_response;
use crate::processors::{humanize, optimize_engagement, optimize_platform};
use crate::prompts::build_prompt;
use crate::quality::quality_score;
use crate::session::{new_session_id, AttemptRecord, GenerationRecord, GenerationSummary, SessionData};

const RETRY_ADJUSTMENTS: [&str; 3] = [
    "\n\nIMPORTANT: Please ensure the content is well-structured with clear headings and paragraphs.",
    "\n\nIMPORTANT: Make sure to include engaging elements like questions and direct reader address.",
    "\n\nIMPORTANT: Focus on creating valuable, in-depth content that meets the requested word count.",
];

const GENERIC_RETRY_ADJUSTMENT: &str =
    "\n\nIMPORTANT: Please create high-quality, engaging content that fully addresses the topic.";

pub struct ContentGenerator {
    config: Config,
    service: AiService,
    session_id: String,
    session_dir: PathBuf,
    session: SessionData,
}

impl ContentGenerator {
    /// Creates the session directory and flushes the initial session record.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let session_id = new_session_id();
        let session_dir = config.output_dir.join("sessions").join(&session_id);
        fs::create_dir_all(&session_dir).with_context(|| {
            format!("failed to create session directory {}", session_dir.display())
        })?;

        let service = AiService::new(&config)?;
        let mut session = SessionData::new(session_id.clone(), config.clone());
        session.flush(&session_dir);

        info!(session_id = %session_id, dir = %session_dir.display(), "session started");
        Ok(Self {
            config,
            service,
            session_id,
            session_dir,
            session,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn session(&self) -> &SessionData {
        &self.session
    }

    /// One-line end-of-run summary of this session.
    pub fn session_summary(&self) -> String {
        format!(
            "session {}: {} generations ({} successful)",
            self.session_id,
            self.session.generations.len(),
            self.session.successful_generations()
        )
    }

    pub async fn generate(
        &mut self,
        request: &ContentRequest,
        auto_save: bool,
        save_formats: &[OutputFormat],
    ) -> Result<ContentResponse, AppError> {
        if !self.config.has_api_key() {
            return Err(AppError::Config(
                "API key not configured. Set OPENROUTER_API_KEY (or use the key \"demo-mode\" \
                 for offline demo output)"
                    .to_string(),
            ));
        }

        let generation_id = format!("gen_{}", Local::now().format("%H%M%S"));
        let gen = self.config.generation_config();
        let mut prompt = build_prompt(request);
        info!(
            generation_id = %generation_id,
            topic = %request.topic,
            prompt_len = prompt.len(),
            "starting generation"
        );

        let mut record = GenerationRecord::new(
            generation_id.clone(),
            request.clone(),
            prompt.clone(),
            gen.clone(),
        );

        for attempt in 1..=gen.max_retries {
            let mut attempt_record = AttemptRecord {
                attempt,
                start_time: Local::now().to_rfc3339(),
                end_time: None,
                prompt_length: prompt.len(),
                quality_score: None,
                success: false,
                error: None,
                retry_prompt_adjustment: false,
                final_word_count: None,
            };
            info!(attempt, max = gen.max_retries, "generation attempt");

            let reply = match self.service.generate(&prompt, &gen).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(attempt, error = %e, "generation attempt failed");
                    attempt_record.error = Some(e.to_string());
                    attempt_record.end_time = Some(Local::now().to_rfc3339());
                    record.attempts.push(attempt_record);

                    if attempt < gen.max_retries {
                        // Transport/API failure: retry with the same prompt
                        continue;
                    }
                    record.final_error = Some(e.to_string());
                    record.end_time = Some(Local::now().to_rfc3339());
                    if auto_save {
                        self.save_failed_generation(&record);
                    }
                    return Err(e.into());
                }
            };

            let draft = parse_response(&reply.content);
            let score = quality_score(&draft, request);
            attempt_record.quality_score = Some(score);
            info!(score, threshold = gen.min_quality_score, "quality score");

            if score >= gen.min_quality_score {
                let response = self.assemble(draft, request, &reply, &gen, None);
                attempt_record.success = true;
                attempt_record.final_word_count = Some(response.word_count);
                attempt_record.end_time = Some(Local::now().to_rfc3339());
                record.attempts.push(attempt_record);
                record.success = true;
                record.end_time = Some(Local::now().to_rfc3339());

                if auto_save {
                    self.save_generation(&record, request, &response, &reply, save_formats);
                }
                info!(generation_id = %record.generation_id, "generation completed");
                return Ok(response);
            }

            if attempt < gen.max_retries {
                warn!(score, attempt, "quality below threshold, retrying with adjusted prompt");
                prompt = adjust_prompt_for_retry(&prompt, attempt - 1);
                attempt_record.retry_prompt_adjustment = true;
                attempt_record.end_time = Some(Local::now().to_rfc3339());
                record.attempts.push(attempt_record);
                continue;
            }

            // Retries exhausted: fail open with a warning annotation
            warn!(score, "using low-quality content after max retries");
            let warning = format!(
                "Content quality score ({score:.2}) below threshold ({})",
                gen.min_quality_score
            );
            let response = self.assemble(draft, request, &reply, &gen, Some(warning));
            attempt_record.success = true;
            attempt_record.final_word_count = Some(response.word_count);
            attempt_record.end_time = Some(Local::now().to_rfc3339());
            record.attempts.push(attempt_record);
            record.success = true;
            record.quality_warning = true;
            record.end_time = Some(Local::now().to_rfc3339());

            if auto_save {
                self.save_generation(&record, request, &response, &reply, save_formats);
            }
            return Ok(response);
        }

        // Unreachable while max_retries >= 1; kept as a defensive fallback.
        Err(AppError::Internal(anyhow!(
            "failed to generate content after maximum retries"
        )))
    }

    /// Post-processes the draft and builds the final response.
    fn assemble(
        &self,
        draft: ParsedDraft,
        request: &ContentRequest,
        reply: &AiResponse,
        gen: &GenerationConfig,
        quality_warning: Option<String>,
    ) -> ContentResponse {
        let mut rng = rand::thread_rng();
        let draft = process_draft(draft, request, gen, &mut rng);

        let mut metadata = serde_json::Map::new();
        metadata.insert("generation_model".into(), reply.model.clone().into());
        metadata.insert("generation_time".into(), Local::now().to_rfc3339().into());
        metadata.insert(
            "usage".into(),
            serde_json::to_value(&reply.usage).unwrap_or_default(),
        );
        metadata.insert(
            "request_params".into(),
            serde_json::to_value(request).unwrap_or_default(),
        );
        metadata.insert(
            "response_time_ms".into(),
            reply.metadata.response_time_ms.into(),
        );
        if let Some(warning) = quality_warning {
            metadata.insert("quality_warning".into(), warning.into());
        }

        ContentResponse::new(
            draft.title,
            draft.content,
            metadata,
            draft.engagement_tips,
            draft.platform_notes,
            draft.tags,
        )
    }

    // ── persistence, all failures logged and swallowed ──────────────────────

    fn save_generation(
        &mut self,
        record: &GenerationRecord,
        request: &ContentRequest,
        response: &ContentResponse,
        reply: &AiResponse,
        save_formats: &[OutputFormat],
    ) {
        let gen_dir = self.session_dir.join(&record.generation_id);
        if let Err(e) = fs::create_dir_all(&gen_dir) {
            error!(dir = %gen_dir.display(), error = %e, "failed to create generation directory");
            return;
        }

        write_json(&gen_dir.join("metadata.json"), record);

        let safe_topic = safe_topic(&request.topic);
        for format in save_formats {
            let filename = format!("{safe_topic}_{}{}", record.generation_id, format.extension());
            write_text(&gen_dir.join(filename), &format_content(response, *format));
        }

        write_text(&gen_dir.join("raw_response.txt"), &reply.content);
        write_text(&gen_dir.join("prompt.txt"), &record.prompt);

        self.session.generations.push(GenerationSummary {
            generation_id: record.generation_id.clone(),
            topic: request.topic.clone(),
            success: true,
            word_count: Some(response.word_count),
            error: None,
            formats_saved: save_formats.iter().map(|f| f.as_str().to_string()).collect(),
            directory: record.generation_id.clone(),
        });
        self.session.flush(&self.session_dir);
        info!(dir = %gen_dir.display(), "generation saved");
    }

    fn save_failed_generation(&mut self, record: &GenerationRecord) {
        let dir_name = format!("{}_FAILED", record.generation_id);
        let gen_dir = self.session_dir.join(&dir_name);
        if let Err(e) = fs::create_dir_all(&gen_dir) {
            error!(dir = %gen_dir.display(), error = %e, "failed to create failure directory");
            return;
        }

        write_json(&gen_dir.join("failed_metadata.json"), record);
        write_text(&gen_dir.join("prompt.txt"), &record.prompt);

        self.session.generations.push(GenerationSummary {
            generation_id: record.generation_id.clone(),
            topic: record.request.topic.clone(),
            success: false,
            word_count: None,
            error: record.final_error.clone(),
            formats_saved: Vec::new(),
            directory: dir_name,
        });
        self.session.flush(&self.session_dir);
    }
}

/// The corrective instruction for retry `attempt_index` (0-based), cycling
/// through the three fixed adjustments then a generic directive.
pub fn adjust_prompt_for_retry(prompt: &str, attempt_index: u32) -> String {
    let adjustment = RETRY_ADJUSTMENTS
        .get(attempt_index as usize)
        .copied()
        .unwrap_or(GENERIC_RETRY_ADJUSTMENT);
    format!("{prompt}{adjustment}")
}

/// Runs the enabled post-processing passes in order.
fn process_draft(
    mut draft: ParsedDraft,
    request: &ContentRequest,
    gen: &GenerationConfig,
    rng: &mut impl Rng,
) -> ParsedDraft {
    if gen.enable_humanization {
        draft.content = humanize(&draft.content, rng);
    }
    if gen.enable_engagement_optimization {
        let out = optimize_engagement(&draft.content, request, rng);
        draft.content = out.content;
        draft.engagement_tips.extend(out.notes);
    }
    if gen.enable_platform_optimization {
        let out = optimize_platform(&draft.content, request);
        draft.content = out.content;
        draft.platform_notes = out.notes;
    }
    draft
}

/// Filename-safe topic slug: alphanumerics, space, `-`, `_` kept; spaces
/// become underscores; at most 50 characters.
fn safe_topic(topic: &str) -> String {
    let kept: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().replace(' ', "_").chars().take(50).collect()
}

fn write_text(path: &Path, contents: &str) {
    if let Err(e) = fs::write(path, contents) {
        error!(path = %path.display(), error = %e, "failed to save file");
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(serialized) => write_text(path, &serialized),
        Err(e) => error!(path = %path.display(), error = %e, "failed to serialize record"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, Goal, Industry, Platform, Tone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn demo_config(dir: &Path) -> Config {
        Config {
            api_key: Some("demo-mode".to_string()),
            output_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn request(length: u32) -> ContentRequest {
        ContentRequest::new(
            "Rust Testing",
            Country::US,
            Industry::Technology,
            Platform::Blog,
            Tone::Professional,
            Goal::Engagement,
            None,
            vec![],
            length,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_safe_topic_slug() {
        assert_eq!(safe_topic("Rust: Memory & Safety!"), "Rust_Memory__Safety");
        assert_eq!(safe_topic("plain"), "plain");
        let long = "a".repeat(80);
        assert_eq!(safe_topic(&long).len(), 50);
    }

    #[test]
    fn test_retry_adjustments_cycle_then_generic() {
        let base = "PROMPT";
        let first = adjust_prompt_for_retry(base, 0);
        let second = adjust_prompt_for_retry(&first, 1);
        let third = adjust_prompt_for_retry(&second, 2);
        let beyond = adjust_prompt_for_retry(&third, 3);

        assert!(first.contains("well-structured"));
        assert!(second.contains("engaging elements"));
        assert!(third.contains("requested word count"));
        assert!(beyond.ends_with(GENERIC_RETRY_ADJUSTMENT));
        // Adjustments accumulate; the base prompt is never rewritten
        assert!(beyond.starts_with(base));
        assert_eq!(beyond.matches("IMPORTANT:").count(), 4);
    }

    #[test]
    fn test_process_draft_honors_toggles() {
        let draft = ParsedDraft {
            title: "T".to_string(),
            content: "It is done.\n\nSecond paragraph here.".to_string(),
            ..ParsedDraft::default()
        };
        let gen = GenerationConfig {
            enable_humanization: false,
            enable_engagement_optimization: false,
            enable_platform_optimization: false,
            ..GenerationConfig::default()
        };
        let out = process_draft(
            draft.clone(),
            &request(500),
            &gen,
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(out.content, draft.content);
        assert!(out.platform_notes.is_empty());

        let gen_all = GenerationConfig::default();
        let out = process_draft(draft, &request(500), &gen_all, &mut StdRng::seed_from_u64(1));
        // Humanizer contracts deterministically, platform pass leaves a note
        assert!(out.content.contains("It's"));
        assert!(!out.platform_notes.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_key: None,
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut generator = ContentGenerator::new(config).unwrap();
        let result = generator.generate(&request(500), true, &[OutputFormat::Markdown]).await;
        assert!(matches!(result, Err(AppError::Config(_))));
        // No generation directory was created
        let entries: Vec<_> = fs::read_dir(generator.session_dir()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1); // session_data.json only
    }

    #[tokio::test]
    async fn test_demo_generation_persists_requested_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = ContentGenerator::new(demo_config(dir.path())).unwrap();

        let response = generator
            .generate(&request(100), true, &[OutputFormat::Markdown, OutputFormat::Json])
            .await
            .unwrap();

        assert!(response.word_count > 0);
        assert_eq!(
            response.estimated_read_time,
            crate::models::estimate_read_time(response.word_count)
        );
        assert!(response.metadata["generation_model"]
            .as_str()
            .unwrap()
            .ends_with(" (demo)"));

        let summary = &generator.session().generations[0];
        assert!(summary.success);
        let gen_dir = generator.session_dir().join(&summary.directory);

        let saved: Vec<String> = fs::read_dir(&gen_dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(saved.contains(&"metadata.json".to_string()));
        assert!(saved.contains(&"raw_response.txt".to_string()));
        assert!(saved.contains(&"prompt.txt".to_string()));
        assert_eq!(saved.iter().filter(|f| f.ends_with(".md")).count(), 1);
        assert_eq!(saved.iter().filter(|f| f.ends_with(".json")).count(), 2); // metadata + formatted
        assert!(saved.iter().all(|f| !f.ends_with(".html")));

        // The formatted JSON round-trips to the same title and word count
        let json_file = saved
            .iter()
            .find(|f| f.starts_with("Rust_Testing_") && f.ends_with(".json"))
            .expect("formatted json present");
        let raw = fs::read_to_string(gen_dir.join(json_file)).unwrap();
        let back: ContentResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.title, response.title);
        assert_eq!(back.word_count, response.word_count);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_open_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = demo_config(dir.path());
        // The demo draft tops out at 0.85 for this request, so every attempt
        // scores below threshold.
        config.min_quality_score = 0.95;
        config.max_retries = 2;
        let mut generator = ContentGenerator::new(config).unwrap();

        let response = generator
            .generate(&request(500), true, &[OutputFormat::Markdown])
            .await
            .unwrap();

        assert!(response.metadata.contains_key("quality_warning"));
        let summary = &generator.session().generations[0];
        assert!(summary.success);

        let record_raw =
            fs::read_to_string(generator.session_dir().join(&summary.directory).join("metadata.json"))
                .unwrap();
        let record: GenerationRecord = serde_json::from_str(&record_raw).unwrap();
        assert!(record.quality_warning);
        assert_eq!(record.attempts.len(), 2);
        assert!(record.attempts[0].retry_prompt_adjustment);
        assert!(record.attempts[1].prompt_length > record.attempts[0].prompt_length);
    }

    #[tokio::test]
    async fn test_no_auto_save_leaves_session_dir_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = ContentGenerator::new(demo_config(dir.path())).unwrap();
        generator
            .generate(&request(100), false, &[OutputFormat::Markdown])
            .await
            .unwrap();

        let entries: Vec<_> = fs::read_dir(generator.session_dir()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1); // session_data.json only
        assert!(generator.session().generations.is_empty());
    }
}
