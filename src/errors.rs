use thiserror::Error;

/// Application-level error type.
/// Anything that reaches the CLI boundary is one of these. Per-file
/// persistence failures are deliberately NOT represented here; they are
/// logged and swallowed, since saving output is a side effect rather than
/// the generation contract.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
