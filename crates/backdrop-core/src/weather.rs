//! Weather effect descriptors and the condition-to-effect mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, hsl_to_rgb};
use crate::error::ParseError;

/// Kind of atmospheric effect requested by the weather provider.
///
/// Only rain, snow, fog and sunbeam have particle renderers; the rest are
/// accepted but produce an empty particle pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    None,
    Rain,
    Snow,
    Fog,
    Sunbeam,
    Clouds,
    Lightning,
}

impl EffectKind {
    pub const ALL: [EffectKind; 7] = [
        EffectKind::None,
        EffectKind::Rain,
        EffectKind::Snow,
        EffectKind::Fog,
        EffectKind::Sunbeam,
        EffectKind::Clouds,
        EffectKind::Lightning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Fog => "fog",
            Self::Sunbeam => "sunbeam",
            Self::Clouds => "clouds",
            Self::Lightning => "lightning",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownEffect(s.to_string()))
    }
}

/// An effect type with an intensity in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub intensity: f32,
}

impl WeatherEffect {
    pub const NONE: WeatherEffect = WeatherEffect {
        kind: EffectKind::None,
        intensity: 0.0,
    };

    /// Create an effect, clamping intensity into range. Non-finite
    /// intensities collapse to zero.
    pub fn new(kind: EffectKind, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { kind, intensity }
    }

    /// Parse a `(type, intensity)` pair. Unknown types degrade to [`WeatherEffect::NONE`].
    pub fn from_parts(kind: &str, intensity: f32) -> Self {
        match kind.parse() {
            Ok(kind) => Self::new(kind, intensity),
            Err(_) => Self::NONE,
        }
    }

    /// True when the effect would not draw anything.
    pub fn is_none(&self) -> bool {
        self.kind == EffectKind::None || self.intensity <= 0.0
    }
}

impl Default for WeatherEffect {
    fn default() -> Self {
        Self::NONE
    }
}

/// Coarse weather condition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Foggy,
    Stormy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 6] = [
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Snowy,
        WeatherCondition::Foggy,
        WeatherCondition::Stormy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Foggy => "foggy",
            Self::Stormy => "stormy",
        }
    }

    /// Cycle to the next condition.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Effect to draw for this condition, honoring user preferences.
    pub fn effect(self, prefs: &WeatherPreferences) -> WeatherEffect {
        match self {
            Self::Rainy if prefs.hate_rain => WeatherEffect::NONE,
            Self::Stormy if prefs.fear_thunder => WeatherEffect::NONE,
            Self::Sunny => WeatherEffect::new(EffectKind::Sunbeam, 0.7),
            Self::Cloudy => WeatherEffect::new(EffectKind::Clouds, 0.5),
            Self::Rainy => WeatherEffect::new(EffectKind::Rain, 0.8),
            Self::Snowy => WeatherEffect::new(EffectKind::Snow, 0.6),
            Self::Foggy => WeatherEffect::new(EffectKind::Fog, 0.4),
            Self::Stormy => WeatherEffect::new(EffectKind::Lightning, 0.9),
        }
    }

    /// Background tint for this condition.
    pub fn tint(self, is_day: bool) -> WeatherTint {
        let pick = |day: f32, night: f32| if is_day { day } else { night };
        match self {
            Self::Sunny => WeatherTint::new(pick(10.0, 0.0), pick(1.1, 1.0), pick(1.2, 0.8)),
            Self::Cloudy => WeatherTint::new(0.0, 0.9, pick(0.9, 0.7)),
            Self::Rainy => WeatherTint::new(200.0, 0.8, pick(0.8, 0.6)),
            Self::Snowy => WeatherTint::new(180.0, 0.7, pick(1.1, 0.8)),
            Self::Foggy => WeatherTint::new(0.0, 0.6, pick(0.7, 0.5)),
            Self::Stormy => WeatherTint::new(240.0, 0.9, pick(0.6, 0.4)),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherCondition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownCondition(s.to_string()))
    }
}

/// User preferences that suppress particular effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherPreferences {
    pub hate_rain: bool,
    pub fear_thunder: bool,
}

/// Hue/saturation/brightness adjustment overlaid on the background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherTint {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl WeatherTint {
    pub const NEUTRAL: WeatherTint = WeatherTint {
        hue: 0.0,
        saturation: 1.0,
        brightness: 1.0,
    };

    pub const fn new(hue: f32, saturation: f32, brightness: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// `hsl(hue, saturation%, brightness*50%)`, rounded to whole percents.
    pub fn overlay_color(&self) -> Rgb {
        let saturation = (self.saturation * 100.0).round() / 100.0;
        let lightness = (self.brightness * 50.0).round() / 100.0;
        hsl_to_rgb(self.hue, saturation, lightness)
    }
}

impl Default for WeatherTint {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_mapping() {
        let prefs = WeatherPreferences::default();
        assert_eq!(
            WeatherCondition::Snowy.effect(&prefs),
            WeatherEffect::new(EffectKind::Snow, 0.6)
        );
        assert_eq!(WeatherCondition::Sunny.effect(&prefs).kind, EffectKind::Sunbeam);
        assert_eq!(WeatherCondition::Stormy.effect(&prefs).kind, EffectKind::Lightning);
    }

    #[test]
    fn test_preferences_suppress_effects() {
        let prefs = WeatherPreferences {
            hate_rain: true,
            fear_thunder: true,
        };
        assert!(WeatherCondition::Rainy.effect(&prefs).is_none());
        assert!(WeatherCondition::Stormy.effect(&prefs).is_none());
        assert!(!WeatherCondition::Foggy.effect(&prefs).is_none());
    }

    #[test]
    fn test_unknown_effect_type_is_none() {
        assert_eq!(WeatherEffect::from_parts("hail", 0.9), WeatherEffect::NONE);
        assert_eq!(
            WeatherEffect::from_parts("Snow", 0.5),
            WeatherEffect::new(EffectKind::Snow, 0.5)
        );
    }

    #[test]
    fn test_intensity_clamped() {
        assert_eq!(WeatherEffect::new(EffectKind::Rain, 3.0).intensity, 1.0);
        assert_eq!(WeatherEffect::new(EffectKind::Rain, -1.0).intensity, 0.0);
        assert_eq!(WeatherEffect::new(EffectKind::Rain, f32::NAN).intensity, 0.0);
        assert!(WeatherEffect::new(EffectKind::Rain, 0.0).is_none());
    }

    #[test]
    fn test_tint_neutrality() {
        assert!(WeatherTint::default().is_neutral());
        assert!(!WeatherCondition::Rainy.tint(true).is_neutral());
        assert_eq!(WeatherCondition::Foggy.tint(false).brightness, 0.5);
    }

    #[test]
    fn test_condition_cycle() {
        let mut c = WeatherCondition::Sunny;
        for _ in 0..WeatherCondition::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, WeatherCondition::Sunny);
    }

    #[test]
    fn test_effect_deserializes_type_key() {
        let effect: WeatherEffect = toml::from_str("type = \"fog\"\nintensity = 0.4").unwrap();
        assert_eq!(effect, WeatherEffect::new(EffectKind::Fog, 0.4));
    }
}
