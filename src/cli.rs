//! Command-line surface.
//!
//! Four subcommands: `generate` runs the full pipeline, `config` prints the
//! effective configuration, `sessions` inspects and cleans past session
//! directories, `models` queries the API model catalog.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::ai_service::AiService;
use crate::config::Config;
use crate::errors::AppError;
use crate::generator::ContentGenerator;
use crate::models::{ContentRequest, Country, Goal, Industry, OutputFormat, Platform, Tone};
use crate::session;

/// Sessions older than this are deleted by `sessions --clean`.
const SESSION_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Parser)]
#[command(name = "inkforge", version, about = "AI-powered blog content generator")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a blog post for a topic
    Generate(GenerateArgs),
    /// Print the effective configuration
    Config {
        /// Include the (masked) API key
        #[arg(long)]
        show: bool,
    },
    /// List, inspect, or clean past sessions
    Sessions {
        /// List sessions (the default action)
        #[arg(long)]
        list: bool,
        /// Show one session in detail
        #[arg(long, value_name = "ID")]
        show: Option<String>,
        /// Delete sessions older than a week
        #[arg(long)]
        clean: bool,
    },
    /// List models available through the API
    Models,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Topic to write about
    pub topic: String,

    /// Target country (default from config)
    #[arg(long, value_enum)]
    pub country: Option<Country>,

    /// Industry vertical (default from config)
    #[arg(long, value_enum)]
    pub industry: Option<Industry>,

    /// Publishing platform (default from config)
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Writing tone (default from config)
    #[arg(long, value_enum)]
    pub tone: Option<Tone>,

    /// Optimization goal (default from config)
    #[arg(long, value_enum)]
    pub goal: Option<Goal>,

    /// Content language override (default derived from country)
    #[arg(long)]
    pub language: Option<String>,

    /// Comma-separated keywords to weave in
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Approximate word count
    #[arg(long, default_value_t = 1000)]
    pub length: u32,

    /// Comma-separated output formats (md, html, json, txt)
    #[arg(long, value_delimiter = ',', default_value = "md,html,json")]
    pub save_formats: Vec<String>,

    /// Skip writing output files
    #[arg(long)]
    pub no_auto_save: bool,

    /// Extra free-form instructions appended to the prompt
    #[arg(long)]
    pub instructions: Option<String>,
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<(), AppError> {
        match self.command {
            Command::Generate(args) => run_generate(config, args).await,
            Command::Config { show } => {
                run_config(&config, show);
                Ok(())
            }
            Command::Sessions { show, clean, .. } => run_sessions(&config, show, clean),
            Command::Models => run_models(&config).await,
        }
    }
}

async fn run_generate(config: Config, args: GenerateArgs) -> Result<(), AppError> {
    let request = ContentRequest::new(
        args.topic,
        args.country.unwrap_or(config.default_country),
        args.industry.unwrap_or(config.default_industry),
        args.platform.unwrap_or(config.default_platform),
        args.tone.unwrap_or(config.default_tone),
        args.goal.unwrap_or(config.default_goal),
        args.language,
        args.keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        args.length,
        args.instructions,
    )?;

    let save_formats = parse_save_formats(&args.save_formats)?;
    let auto_save = !args.no_auto_save;

    println!("Generating: {}", request.topic);
    println!(
        "  {} / {} / {} / {} / {} / {} words / lang {}",
        request.country.as_str(),
        request.industry.as_str(),
        request.platform.as_str(),
        request.tone.as_str(),
        request.goal.as_str(),
        request.length,
        request.language
    );

    let mut generator = ContentGenerator::new(config)?;
    let response = generator.generate(&request, auto_save, &save_formats).await?;

    println!("\n{}", response.title);
    println!("{}", "─".repeat(response.title.chars().count().max(20)));
    println!("{}\n", response.content);
    println!(
        "Words: {}   Read time: {} min   Tags: {}",
        response.word_count,
        response.estimated_read_time,
        response.tags.join(", ")
    );
    if let Some(warning) = response.metadata.get("quality_warning").and_then(|v| v.as_str()) {
        println!("Warning: {warning}");
    }
    if !response.engagement_tips.is_empty() {
        println!("\nEngagement tips:");
        for tip in &response.engagement_tips {
            println!("  - {tip}");
        }
    }
    if auto_save {
        println!("\nSaved under {}", generator.session_dir().display());
    }
    println!("{}", generator.session_summary());
    Ok(())
}

fn run_config(config: &Config, show_key: bool) {
    println!("Configuration");
    if show_key {
        println!("  api_key:          {}", config.masked_api_key());
    } else {
        println!(
            "  api_key:          {}",
            if config.has_api_key() { "<set>" } else { "<not set>" }
        );
    }
    println!("  base_url:         {}", config.base_url);
    println!("  model:            {}", config.model);
    println!("  output_dir:       {}", config.output_dir.display());
    println!("  country:          {}", config.default_country.as_str());
    println!("  industry:         {}", config.default_industry.as_str());
    println!("  platform:         {}", config.default_platform.as_str());
    println!("  tone:             {}", config.default_tone.as_str());
    println!("  goal:             {}", config.default_goal.as_str());
    println!("  output_format:    {}", config.default_output_format.as_str());
    println!("  temperature:      {}", config.temperature);
    println!("  max_tokens:       {}", config.max_tokens);
    println!("  min_quality:      {}", config.min_quality_score);
    println!("  max_retries:      {}", config.max_retries);
    println!("  humanization:     {}", config.enable_humanization);
    println!("  engagement_opt:   {}", config.enable_engagement_optimization);
    println!("  platform_opt:     {}", config.enable_platform_optimization);
}

fn run_sessions(config: &Config, show: Option<String>, clean: bool) -> Result<(), AppError> {
    if clean {
        let removed = session::clean_sessions(config, SESSION_RETENTION_DAYS);
        if removed.is_empty() {
            println!("No sessions older than {SESSION_RETENTION_DAYS} days.");
        } else {
            for id in &removed {
                println!("Removed session {id}");
            }
            info!(count = removed.len(), "sessions cleaned");
        }
        return Ok(());
    }

    if let Some(id) = show {
        let dir = session::sessions_root(config).join(&id);
        let data = session::load_session(&dir)
            .ok_or_else(|| AppError::Validation(format!("session {id} not found")))?;
        println!("Session {}", data.session_id);
        println!("  started:     {}", data.start_time);
        println!(
            "  generations: {} ({} successful)",
            data.generations.len(),
            data.successful_generations()
        );
        for generation in &data.generations {
            let status = if generation.success { "ok" } else { "FAILED" };
            let words = generation
                .word_count
                .map(|w| format!("{w} words"))
                .unwrap_or_else(|| generation.error.clone().unwrap_or_default());
            println!(
                "  {} [{}] {} - {}",
                generation.generation_id, status, generation.topic, words
            );
        }
        return Ok(());
    }

    let sessions = session::list_sessions(config);
    if sessions.is_empty() {
        println!("No sessions found under {}.", session::sessions_root(config).display());
        return Ok(());
    }
    for data in sessions {
        println!(
            "{}  {} generations ({} successful)",
            data.session_id,
            data.generations.len(),
            data.successful_generations()
        );
    }
    Ok(())
}

async fn run_models(config: &Config) -> Result<(), AppError> {
    let service = AiService::new(config)?;
    let models = service.list_models().await.map_err(AppError::from)?;
    if models.is_empty() {
        println!("No models reported by {}.", config.base_url);
        return Ok(());
    }
    for model in models {
        match model.name {
            Some(name) => println!("{}  ({name})", model.id),
            None => println!("{}", model.id),
        }
    }
    Ok(())
}

/// Parses the `--save-formats` token list, rejecting unknown formats and
/// dropping duplicates while preserving order.
fn parse_save_formats(tokens: &[String]) -> Result<Vec<OutputFormat>, AppError> {
    let mut formats = Vec::new();
    for token in tokens {
        let format = OutputFormat::from_token(token).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown output format \"{token}\" (expected md, html, json, or txt)"
            ))
        })?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(AppError::Validation(
            "at least one output format is required".to_string(),
        ));
    }
    Ok(formats)
}
