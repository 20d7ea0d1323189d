//! Parse errors for the scene vocabulary.

use thiserror::Error;

/// Failure to parse one of the named scene enums from a string token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown time segment: {0}")]
    UnknownTimeSegment(String),

    #[error("unknown season: {0}")]
    UnknownSeason(String),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("unknown weather effect type: {0}")]
    UnknownEffect(String),

    #[error("unknown weather condition: {0}")]
    UnknownCondition(String),
}
