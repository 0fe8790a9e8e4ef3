use std::time::Duration;

use thiserror::Error;

/// Failure of an insight request.
///
/// Every remote failure is surfaced as one of these; the client never hands
/// back partially parsed data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InsightError {
    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("AI response did not match the expected shape: {0}")]
    SchemaViolation(String),

    #[error("AI request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("AI configuration error: {0}")]
    Configuration(String),
}

/// Category of an [`InsightError`], without its details.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsightErrorKind {
    Transport,
    SchemaViolation,
    Timeout,
    Configuration,
}

impl InsightError {
    pub fn kind(&self) -> InsightErrorKind {
        match self {
            Self::Transport(_) => InsightErrorKind::Transport,
            Self::SchemaViolation(_) => InsightErrorKind::SchemaViolation,
            Self::Timeout(_) => InsightErrorKind::Timeout,
            Self::Configuration(_) => InsightErrorKind::Configuration,
        }
    }
}

pub type InsightResult<T> = Result<T, InsightError>;
