//! Session bookkeeping.
//!
//! One session per generator instance, identified by a local timestamp and
//! persisted as `session_data.json` under
//! `{output_dir}/sessions/{session_id}/`. Per-generation records land in the
//! same file plus per-generation directories written by the orchestrator.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::Config;
use crate::models::{ContentRequest, GenerationConfig};

/// One attempt inside a generation, recorded whatever its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub start_time: String,
    pub end_time: Option<String>,
    pub prompt_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f32>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub retry_prompt_adjustment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_word_count: Option<u32>,
}

/// Full record of one generation, written into `metadata.json` on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation_id: String,
    pub request: ContentRequest,
    pub prompt: String,
    pub config: GenerationConfig,
    pub attempts: Vec<AttemptRecord>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub quality_warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_error: Option<String>,
}

impl GenerationRecord {
    pub fn new(generation_id: String, request: ContentRequest, prompt: String, config: GenerationConfig) -> Self {
        Self {
            generation_id,
            request,
            prompt,
            config,
            attempts: Vec::new(),
            start_time: Local::now().to_rfc3339(),
            end_time: None,
            success: false,
            quality_warning: false,
            final_error: None,
        }
    }
}

/// Per-generation line in the session file, consumed by the sessions CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation_id: String,
    pub topic: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub formats_saved: Vec<String>,
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    pub start_time: String,
    pub config: Config,
    pub generations: Vec<GenerationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl SessionData {
    pub fn new(session_id: String, config: Config) -> Self {
        Self {
            session_id,
            start_time: Local::now().to_rfc3339(),
            config,
            generations: Vec::new(),
            last_updated: None,
        }
    }

    /// Writes `session_data.json`. Failures are logged and swallowed; session
    /// bookkeeping never fails a generation.
    pub fn flush(&mut self, session_dir: &Path) {
        self.last_updated = Some(Local::now().to_rfc3339());
        let path = session_dir.join("session_data.json");
        let serialized = match serde_json::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "failed to serialize session data");
                return;
            }
        };
        if let Err(e) = fs::write(&path, serialized) {
            error!(path = %path.display(), error = %e, "failed to write session data");
        }
    }

    pub fn successful_generations(&self) -> usize {
        self.generations.iter().filter(|g| g.success).count()
    }
}

/// A timestamp-derived session id, second resolution. Two instances started
/// within the same second share a directory.
pub fn new_session_id() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Session directory scanning (sessions subcommand)
// ────────────────────────────────────────────────────────────────────────────

pub fn sessions_root(config: &Config) -> PathBuf {
    config.output_dir.join("sessions")
}

/// Loads every readable `session_data.json`, newest first by id.
pub fn list_sessions(config: &Config) -> Vec<SessionData> {
    let root = sessions_root(config);
    let entries = match fs::read_dir(&root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut sessions: Vec<SessionData> = entries
        .flatten()
        .filter_map(|entry| load_session(&entry.path()))
        .collect();
    sessions.sort_by(|a, b| b.session_id.cmp(&a.session_id));
    sessions
}

pub fn load_session(dir: &Path) -> Option<SessionData> {
    let path = dir.join("session_data.json");
    let raw = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable session file");
            None
        }
    }
}

/// Deletes session directories whose id date prefix is older than `days`.
/// Returns the removed ids.
pub fn clean_sessions(config: &Config, days: i64) -> Vec<String> {
    let root = sessions_root(config);
    let cutoff = Local::now().date_naive() - chrono::Duration::days(days);

    let entries = match fs::read_dir(&root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(date) = session_date(&name) else {
            continue;
        };
        if date < cutoff {
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => removed.push(name),
                Err(e) => error!(session = %name, error = %e, "failed to remove session directory"),
            }
        }
    }
    removed
}

fn session_date(session_id: &str) -> Option<NaiveDate> {
    let prefix = session_id.split('_').next()?;
    NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
}
