//! Core types for the backdrop ambient scene renderer.
//!
//! Everything here is plain data: colors and their adjustment primitives,
//! the time-of-day/season/theme vocabulary that drives the scene, the weather
//! effect descriptors supplied by the host, and the tuning knobs consumed by
//! the engine.

mod color;
mod error;
mod scene;
mod tuning;
mod weather;

pub use color::{Rgb, blend, brighten, hsl_to_rgb};
pub use error::ParseError;
pub use scene::{
    NIGHT_END_HOUR, NIGHT_START_HOUR, SceneDescriptor, Season, Theme, TimeSegment, classify,
    is_night_hour,
};
pub use tuning::{BackgroundConfig, EffectsConfig, TreeConfig};
pub use weather::{EffectKind, WeatherCondition, WeatherEffect, WeatherPreferences, WeatherTint};
