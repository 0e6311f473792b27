//! Application configuration.
//!
//! Layered load: built-in defaults, then an optional `inkforge.toml` file,
//! then environment variables. A `.env` file in the working directory is
//! honored before the environment is read.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{Country, GenerationConfig, Goal, Industry, OutputFormat, Platform, Tone};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "mistralai/mistral-small-3.2-24b-instruct:free";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // API
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,

    // Request defaults
    pub default_country: Country,
    pub default_industry: Industry,
    pub default_platform: Platform,
    pub default_tone: Tone,
    pub default_goal: Goal,
    pub default_output_format: OutputFormat,
    pub output_dir: PathBuf,

    // Sampling
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,

    // Post-processing toggles
    pub enable_humanization: bool,
    pub enable_engagement_optimization: bool,
    pub enable_platform_optimization: bool,

    // Quality control
    pub min_quality_score: f32,
    pub max_retries: u32,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            default_country: Country::US,
            default_industry: Industry::General,
            default_platform: Platform::Medium,
            default_tone: Tone::Professional,
            default_goal: Goal::Engagement,
            default_output_format: OutputFormat::Markdown,
            output_dir: PathBuf::from("./output"),
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
            debug: false,
        }
    }
}

impl Config {
    /// Loads configuration. `path` forces a specific TOML file; otherwise
    /// `inkforge.toml` in the working directory is used when present.
    /// Environment variables win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new("inkforge.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        config.clamp();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("invalid config file {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Environment overrides. Unparseable numeric values are warned about
    /// and ignored rather than failing startup.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("OPENROUTER_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("INKFORGE_MODEL") {
            if !model.trim().is_empty() {
                self.model = model;
            }
        }
        if let Ok(dir) = std::env::var("INKFORGE_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = std::env::var("INKFORGE_MAX_RETRIES") {
            match raw.parse::<u32>() {
                Ok(n) => self.max_retries = n,
                Err(_) => warn!(value = %raw, "ignoring unparseable INKFORGE_MAX_RETRIES"),
            }
        }
        if let Ok(raw) = std::env::var("INKFORGE_MIN_QUALITY_SCORE") {
            match raw.parse::<f32>() {
                Ok(v) => self.min_quality_score = v,
                Err(_) => warn!(value = %raw, "ignoring unparseable INKFORGE_MIN_QUALITY_SCORE"),
            }
        }
        if let Ok(raw) = std::env::var("INKFORGE_DEBUG") {
            self.debug = matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
        }
    }

    /// Pulls every numeric field back into its documented range.
    fn clamp(&mut self) {
        self.temperature = self.temperature.clamp(0.0, 2.0);
        self.max_tokens = self.max_tokens.clamp(100, 8000);
        self.top_p = self.top_p.clamp(0.0, 1.0);
        self.frequency_penalty = self.frequency_penalty.clamp(-2.0, 2.0);
        self.presence_penalty = self.presence_penalty.clamp(-2.0, 2.0);
        self.min_quality_score = self.min_quality_score.clamp(0.0, 1.0);
        self.max_retries = self.max_retries.clamp(1, 10);
    }

    /// True when a non-blank API key is configured. The literal "demo-mode"
    /// counts; it selects the offline reply path downstream.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// HTTP headers for API requests. Fails when no key is configured.
    pub fn headers(&self) -> Result<Vec<(&'static str, String)>, AppError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "OpenRouter API key not configured. Set OPENROUTER_API_KEY or add \
                     api_key to inkforge.toml"
                        .to_string(),
                )
            })?;

        Ok(vec![
            ("Authorization", format!("Bearer {key}")),
            ("Content-Type", "application/json".to_string()),
            (
                "HTTP-Referer",
                "https://github.com/inkforge/inkforge".to_string(),
            ),
            ("X-Title", "InkForge - AI Blog Generator".to_string()),
        ])
    }

    /// Snapshots the sampling settings for one generation run.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            enable_humanization: self.enable_humanization,
            enable_engagement_optimization: self.enable_engagement_optimization,
            enable_platform_optimization: self.enable_platform_optimization,
            min_quality_score: self.min_quality_score,
            max_retries: self.max_retries,
        }
    }

    /// The API key with all but a short prefix masked, for display.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) if key.len() > 8 => format!("{}****", &key[..8]),
            Some(_) => "****".to_string(),
            None => "<not set>".to_string(),
        }
    }
}
