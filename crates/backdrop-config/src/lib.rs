//! Configuration for backdrop.
//!
//! Settings live in `config.toml` under the platform config directory
//! (for example `~/.config/backdrop/config.toml` on Linux). Every key is
//! optional; anything missing falls back to its default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use backdrop_core::{
    BackgroundConfig, EffectsConfig, Theme, TreeConfig, WeatherCondition, WeatherEffect,
    WeatherPreferences, WeatherTint,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no home directory found to locate the config file")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Static weather for the scene, since backdrop does not fetch forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Condition to show, or none for a clear scene.
    pub condition: Option<WeatherCondition>,
    pub hate_rain: bool,
    pub fear_thunder: bool,
    /// Force the day or night tint table. Unset follows the clock.
    pub is_day: Option<bool>,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            condition: None,
            hate_rain: false,
            fear_thunder: false,
            is_day: None,
        }
    }
}

impl WeatherSettings {
    pub fn preferences(&self) -> WeatherPreferences {
        WeatherPreferences {
            hate_rain: self.hate_rain,
            fear_thunder: self.fear_thunder,
        }
    }

    pub fn effect(&self) -> WeatherEffect {
        self.condition
            .map_or(WeatherEffect::NONE, |c| c.effect(&self.preferences()))
    }

    /// Tint for the condition; `night` picks the table unless `is_day` is set.
    pub fn tint(&self, night: bool) -> WeatherTint {
        let is_day = self.is_day.unwrap_or(!night);
        self.condition
            .map_or(WeatherTint::NEUTRAL, |c| c.tint(is_day))
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: Theme,
    /// Logical units per pixel; each terminal cell is two pixels tall.
    pub pixel_scale: f32,
    /// Target frame interval.
    pub frame_ms: u64,
    /// Supersampling grid per axis.
    pub samples: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            pixel_scale: 4.0,
            frame_ms: 16,
            samples: 4,
        }
    }
}

/// The complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub effects: EffectsConfig,
    pub background: BackgroundConfig,
    pub tree: TreeConfig,
    pub weather: WeatherSettings,
    pub display: DisplayConfig,
}

impl Config {
    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "backdrop")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path()?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("loading config from {}", path.display());
                Self::from_toml_str(&content)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use backdrop_core::EffectKind;

    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.effects.max_particles, 100);
        assert_eq!(config.background.transition_duration_ms, 3000);
        assert_eq!(config.tree.branch_count, 8);
        assert_eq!(config.display.pixel_scale, 4.0);
        assert_eq!(config.weather.is_day, None);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [effects]
            max_stars = 120

            [background]
            watercolor_effect = false

            [display]
            theme = "dark"
            "#,
        )
        .unwrap();
        assert_eq!(config.effects.max_stars, 120);
        assert_eq!(config.effects.max_meteors, 3);
        assert!(!config.background.watercolor_effect);
        assert_eq!(config.background.weather_overlay_alpha, 0.2);
        assert_eq!(config.display.theme, Theme::Dark);
        assert_eq!(config.display.frame_ms, 16);
    }

    #[test]
    fn test_weather_settings() {
        let config = Config::from_toml_str(
            r#"
            [weather]
            condition = "rainy"
            hate_rain = true
            "#,
        )
        .unwrap();
        assert_eq!(config.weather.condition, Some(WeatherCondition::Rainy));
        assert!(config.weather.effect().is_none());
        assert!(!config.weather.tint(false).is_neutral());

        let snowy = WeatherSettings {
            condition: Some(WeatherCondition::Snowy),
            ..WeatherSettings::default()
        };
        assert_eq!(snowy.effect(), WeatherEffect::new(EffectKind::Snow, 0.6));
        assert!(WeatherSettings::default().tint(false).is_neutral());
    }

    #[test]
    fn test_tint_follows_night_unless_forced() {
        let sunny = WeatherSettings {
            condition: Some(WeatherCondition::Sunny),
            ..WeatherSettings::default()
        };
        assert_eq!(sunny.tint(false), WeatherCondition::Sunny.tint(true));
        assert_eq!(sunny.tint(true), WeatherCondition::Sunny.tint(false));

        let forced: WeatherSettings = toml::from_str("condition = \"sunny\"\nis_day = true").unwrap();
        assert_eq!(forced.is_day, Some(true));
        assert_eq!(forced.tint(true), WeatherCondition::Sunny.tint(true));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let err = Config::from_toml_str("[effects]\nmax_particles = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.weather.condition = Some(WeatherCondition::Foggy);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[effects]"));
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_missing_and_present_files() {
        let dir = std::env::temp_dir().join(format!("backdrop-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        let _ = fs::remove_file(&path);

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        fs::write(&path, "[tree]\nleaf_count = 10\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().tree.leaf_count, 10);

        fs::remove_dir_all(&dir).unwrap();
    }
}
