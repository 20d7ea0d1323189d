//! Host-side scene inputs shared between the app and the engine.

use std::cell::Cell;

use backdrop_config::WeatherSettings;
use backdrop_core::{WeatherCondition, WeatherEffect, WeatherTint, is_night_hour};
use backdrop_scene::{LocalClock, TimeProvider, WeatherEffectProvider};
use chrono::Timelike;

/// Weather chosen by the user, read by the engine on every scene check.
///
/// The tint table follows `clock` into night mode unless the settings force
/// day or night.
#[derive(Debug, Default)]
pub struct HostWeather<C = LocalClock> {
    settings: Cell<WeatherSettings>,
    clock: C,
}

impl HostWeather {
    pub fn new(settings: WeatherSettings) -> Self {
        Self::with_clock(settings, LocalClock)
    }
}

impl<C: TimeProvider> HostWeather<C> {
    pub fn with_clock(settings: WeatherSettings, clock: C) -> Self {
        Self {
            settings: Cell::new(settings),
            clock,
        }
    }

    pub fn condition(&self) -> Option<WeatherCondition> {
        self.settings.get().condition
    }

    pub fn set_condition(&self, condition: Option<WeatherCondition>) {
        let mut settings = self.settings.get();
        settings.condition = condition;
        self.settings.set(settings);
    }

    /// Step through the conditions, starting from sunny.
    pub fn cycle(&self) {
        let next = self
            .condition()
            .map_or(WeatherCondition::Sunny, WeatherCondition::next);
        self.set_condition(Some(next));
    }
}

impl<C: TimeProvider> WeatherEffectProvider for HostWeather<C> {
    fn effect(&self) -> WeatherEffect {
        self.settings.get().effect()
    }

    fn tint(&self) -> WeatherTint {
        let night = is_night_hour(self.clock.now().hour());
        self.settings.get().tint(night)
    }
}

#[cfg(test)]
mod tests {
    use backdrop_core::EffectKind;
    use chrono::NaiveDate;

    use super::*;

    fn sunny_at(hour: u32) -> HostWeather<chrono::NaiveDateTime> {
        let clock = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        let settings = WeatherSettings {
            condition: Some(WeatherCondition::Sunny),
            ..WeatherSettings::default()
        };
        HostWeather::with_clock(settings, clock)
    }

    #[test]
    fn test_cycle_starts_sunny_and_wraps() {
        let weather: HostWeather = HostWeather::default();
        assert!(weather.effect().is_none());
        weather.cycle();
        assert_eq!(weather.condition(), Some(WeatherCondition::Sunny));
        assert_eq!(weather.effect().kind, EffectKind::Sunbeam);
        for _ in 0..WeatherCondition::ALL.len() {
            weather.cycle();
        }
        assert_eq!(weather.condition(), Some(WeatherCondition::Sunny));
    }

    #[test]
    fn test_preferences_apply() {
        let weather = HostWeather::new(WeatherSettings {
            condition: Some(WeatherCondition::Stormy),
            fear_thunder: true,
            ..WeatherSettings::default()
        });
        assert!(weather.effect().is_none());
        assert!(!weather.tint().is_neutral());
        weather.set_condition(None);
        assert!(weather.tint().is_neutral());
    }

    #[test]
    fn test_tint_follows_the_clock() {
        let night = sunny_at(23).tint();
        assert_eq!(night, WeatherCondition::Sunny.tint(false));
        assert_eq!(night.brightness, 0.8);
        assert_eq!(sunny_at(12).tint(), WeatherCondition::Sunny.tint(true));
    }

    #[test]
    fn test_forced_day_ignores_the_clock() {
        let weather = sunny_at(23);
        let mut settings = weather.settings.get();
        settings.is_day = Some(true);
        weather.settings.set(settings);
        assert_eq!(weather.tint().brightness, 1.2);
    }
}
