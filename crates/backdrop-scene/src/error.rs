//! Error types for the scene engine.

use backdrop_core::ParseError;
use thiserror::Error;

/// Scene engine errors.
///
/// None of these escape the frame loop: palette and weather lookups recover
/// with a fallback, and frame failures are logged and skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// No background surface was supplied at init.
    #[error("render surface not available")]
    MissingSurface,

    /// The engine was torn down and cannot be started again.
    #[error("scene engine was destroyed")]
    Stopped,

    /// The surface has no drawable area.
    #[error("render surface has no drawable area ({width}x{height})")]
    EmptySurface { width: f32, height: f32 },

    /// Unrecognized time segment token.
    #[error("invalid palette key: {0}")]
    InvalidPaletteKey(String),

    /// Unrecognized weather effect type.
    #[error("unknown weather effect type: {0}")]
    UnknownWeatherType(String),

    /// Non-finite or degenerate geometry.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    #[error(transparent)]
    Parse(ParseError),
}

impl From<ParseError> for SceneError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownTimeSegment(key) => Self::InvalidPaletteKey(key),
            ParseError::UnknownEffect(kind) => Self::UnknownWeatherType(kind),
            other => Self::Parse(other),
        }
    }
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
