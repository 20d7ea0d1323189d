//! Scene change detection.

use backdrop_core::{SceneDescriptor, Season, Theme, TimeSegment};

/// Direction of a night-mode flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightEdge {
    /// Night mode switched on.
    Dusk,
    /// Night mode switched off.
    Dawn,
}

/// Last observed scene inputs; reports which observations are changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneTracker {
    segment: Option<TimeSegment>,
    season: Option<Season>,
    theme: Theme,
    night: bool,
}

impl SceneTracker {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    /// Record the current time classification. True when segment or season changed.
    pub fn observe_time(&mut self, segment: TimeSegment, season: Season) -> bool {
        let changed = self.segment != Some(segment) || self.season != Some(season);
        self.segment = Some(segment);
        self.season = Some(season);
        changed
    }

    /// Record the current theme. True on change.
    pub fn observe_theme(&mut self, theme: Theme) -> bool {
        let changed = self.theme != theme;
        self.theme = theme;
        changed
    }

    /// Record the night flag and report an edge, if any.
    pub fn observe_night(&mut self, night: bool) -> Option<NightEdge> {
        let was = std::mem::replace(&mut self.night, night);
        match (was, night) {
            (false, true) => Some(NightEdge::Dusk),
            (true, false) => Some(NightEdge::Dawn),
            _ => None,
        }
    }

    pub fn segment(&self) -> Option<TimeSegment> {
        self.segment
    }

    pub fn season(&self) -> Option<Season> {
        self.season
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_night(&self) -> bool {
        self.night
    }

    /// The full descriptor once a time observation has been made.
    pub fn descriptor(&self) -> Option<SceneDescriptor> {
        Some(SceneDescriptor {
            time_segment: self.segment?,
            season: self.season?,
            theme: self.theme,
            is_night: self.night,
        })
    }

    /// Forget everything except the theme.
    pub fn reset(&mut self) {
        *self = Self::new(self.theme);
    }
}
