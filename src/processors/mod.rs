//! Text post-processing passes applied to accepted drafts.
//!
//! Three passes, each gated by a config toggle at the orchestrator:
//! humanization, engagement optimization, platform optimization. Randomized
//! passes take the RNG as a parameter so tests can fix seeds.

pub mod engagement;
pub mod humanizer;
pub mod platform;

pub use engagement::optimize_engagement;
pub use humanizer::humanize;
pub use platform::optimize_platform;

/// Rewritten content plus the advisory lines a pass produced.
#[derive(Debug, Clone)]
pub struct ProcessorOutput {
    pub content: String,
    pub notes: Vec<String>,
}
