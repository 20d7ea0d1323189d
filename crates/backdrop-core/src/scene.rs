//! Time-of-day, season and theme vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// First hour (inclusive) of night mode.
pub const NIGHT_START_HOUR: u32 = 22;
/// First hour (inclusive) after night mode ends.
pub const NIGHT_END_HOUR: u32 = 6;

/// One of ten named subdivisions of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeSegment {
    EarlyMorning,
    Breakfast,
    MidMorning,
    Lunch,
    Afternoon,
    LateAfternoon,
    Dinner,
    Evening,
    Night,
    LateNight,
}

impl TimeSegment {
    pub const ALL: [TimeSegment; 10] = [
        TimeSegment::EarlyMorning,
        TimeSegment::Breakfast,
        TimeSegment::MidMorning,
        TimeSegment::Lunch,
        TimeSegment::Afternoon,
        TimeSegment::LateAfternoon,
        TimeSegment::Dinner,
        TimeSegment::Evening,
        TimeSegment::Night,
        TimeSegment::LateNight,
    ];

    /// Classify a wall-clock hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=7 => Self::EarlyMorning,
            8..=9 => Self::Breakfast,
            10..=11 => Self::MidMorning,
            12..=13 => Self::Lunch,
            14..=15 => Self::Afternoon,
            16..=17 => Self::LateAfternoon,
            18..=19 => Self::Dinner,
            20..=21 => Self::Evening,
            22 | 23 | 0 | 1 => Self::Night,
            _ => Self::LateNight,
        }
    }

    /// Stable token used in palette tables and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarlyMorning => "earlyMorning",
            Self::Breakfast => "breakfast",
            Self::MidMorning => "midMorning",
            Self::Lunch => "lunch",
            Self::Afternoon => "afternoon",
            Self::LateAfternoon => "lateAfternoon",
            Self::Dinner => "dinner",
            Self::Evening => "evening",
            Self::Night => "night",
            Self::LateNight => "lateNight",
        }
    }
}

impl fmt::Display for TimeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSegment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|seg| seg.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownTimeSegment(s.to_string()))
    }
}

/// Meteorological season, by month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Classify a 1-based month.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownSeason(s.to_string()))
    }
}

/// Host color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownTheme(s.to_string()))
    }
}

/// Whether the given hour falls in `[22:00, 06:00)`.
pub fn is_night_hour(hour: u32) -> bool {
    let hour = hour % 24;
    hour >= NIGHT_START_HOUR || hour < NIGHT_END_HOUR
}

/// Classify a wall-clock instant into its time segment and season.
pub fn classify<T: Datelike + Timelike>(now: &T) -> (TimeSegment, Season) {
    (
        TimeSegment::from_hour(now.hour()),
        Season::from_month(now.month()),
    )
}

/// The tuple that drives all visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub time_segment: TimeSegment,
    pub season: Season,
    pub theme: Theme,
    pub is_night: bool,
}

impl SceneDescriptor {
    /// Describe the scene at `now` under `theme`.
    pub fn at<T: Datelike + Timelike>(now: &T, theme: Theme) -> Self {
        let (time_segment, season) = classify(now);
        Self {
            time_segment,
            season,
            theme,
            is_night: is_night_hour(now.hour()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_time_segment_from_hour() {
        assert_eq!(TimeSegment::from_hour(6), TimeSegment::EarlyMorning);
        assert_eq!(TimeSegment::from_hour(9), TimeSegment::Breakfast);
        assert_eq!(TimeSegment::from_hour(11), TimeSegment::MidMorning);
        assert_eq!(TimeSegment::from_hour(12), TimeSegment::Lunch);
        assert_eq!(TimeSegment::from_hour(15), TimeSegment::Afternoon);
        assert_eq!(TimeSegment::from_hour(17), TimeSegment::LateAfternoon);
        assert_eq!(TimeSegment::from_hour(18), TimeSegment::Dinner);
        assert_eq!(TimeSegment::from_hour(21), TimeSegment::Evening);
        assert_eq!(TimeSegment::from_hour(22), TimeSegment::Night);
        assert_eq!(TimeSegment::from_hour(1), TimeSegment::Night);
        assert_eq!(TimeSegment::from_hour(2), TimeSegment::LateNight);
        assert_eq!(TimeSegment::from_hour(5), TimeSegment::LateNight);
    }

    #[test]
    fn test_every_hour_maps_to_a_segment() {
        let mut seen: Vec<TimeSegment> = (0..24).map(TimeSegment::from_hour).collect();
        seen.dedup();
        for seg in TimeSegment::ALL {
            assert!(seen.contains(&seg), "{seg} never produced");
        }
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Autumn);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
    }

    #[test]
    fn test_night_hours() {
        assert!(is_night_hour(22));
        assert!(is_night_hour(0));
        assert!(is_night_hour(5));
        assert!(!is_night_hour(6));
        assert!(!is_night_hour(21));
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("earlyMorning".parse(), Ok(TimeSegment::EarlyMorning));
        assert_eq!("LATENIGHT".parse(), Ok(TimeSegment::LateNight));
        assert_eq!(
            "morning".parse::<TimeSegment>(),
            Err(ParseError::UnknownTimeSegment("morning".into()))
        );
        assert_eq!("dark".parse(), Ok(Theme::Dark));
        assert_eq!("autumn".parse(), Ok(Season::Autumn));
    }

    #[test]
    fn test_descriptor_at() {
        let now = NaiveDate::from_ymd_opt(2024, 10, 3)
            .and_then(|d| d.and_hms_opt(23, 15, 0))
            .unwrap();
        let scene = SceneDescriptor::at(&now, Theme::Dark);
        assert_eq!(scene.time_segment, TimeSegment::Night);
        assert_eq!(scene.season, Season::Autumn);
        assert_eq!(scene.theme, Theme::Dark);
        assert!(scene.is_night);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }
}
