//! Time-of-day palette resolution and caching.

use std::collections::HashMap;

use backdrop_core::{Rgb, Theme, TimeSegment, blend, brighten};
use serde::Serialize;

use crate::error::{Result, SceneError};

/// Three-stop gradient derived from a (time segment, theme) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub start: Rgb,
    pub middle: Rgb,
    pub end: Rgb,
}

impl Palette {
    /// Derive the gradient from a two-color base pair.
    pub fn derive(base: [Rgb; 2], theme: Theme) -> Self {
        let [first, second] = base;
        let (start_shift, end_shift) = match theme {
            Theme::Light => (20, 10),
            Theme::Dark => (-40, -30),
        };
        Self {
            start: brighten(first, start_shift),
            middle: blend(first, second, 0.5),
            end: brighten(second, end_shift),
        }
    }
}

/// Base color pair for a segment under a theme.
fn base_pair(segment: TimeSegment, theme: Theme) -> [Rgb; 2] {
    use TimeSegment::*;

    let (a, b) = match (theme, segment) {
        (Theme::Light, EarlyMorning) => (0xff9a9e, 0xfecfef),
        (Theme::Light, Breakfast) => (0xffecd2, 0xfcb69f),
        (Theme::Light, MidMorning) => (0xa8edea, 0xfed6e3),
        (Theme::Light, Lunch) => (0xffd89b, 0x19547b),
        (Theme::Light, Afternoon) => (0x667eea, 0x764ba2),
        (Theme::Light, LateAfternoon) => (0xf093fb, 0xf5576c),
        (Theme::Light, Dinner) => (0x4facfe, 0x00f2fe),
        (Theme::Light, Evening) => (0x43e97b, 0x38f9d7),
        (Theme::Light, Night) => (0x0c3483, 0xa2b6df),
        (Theme::Light, LateNight) => (0x1e3c72, 0x2a5298),
        (Theme::Dark, EarlyMorning) => (0x2d1b69, 0x11998e),
        (Theme::Dark, Breakfast) => (0xfc466b, 0x3f5efb),
        (Theme::Dark, MidMorning) => (0x667eea, 0x764ba2),
        (Theme::Dark, Lunch) => (0xf093fb, 0xf5576c),
        (Theme::Dark, Afternoon) => (0x4facfe, 0x00f2fe),
        (Theme::Dark, LateAfternoon) => (0x43e97b, 0x38f9d7),
        (Theme::Dark, Dinner) => (0xfa709a, 0xfee140),
        (Theme::Dark, Evening) => (0xa8edea, 0xfed6e3),
        (Theme::Dark, Night) => (0x0c0c0c, 0x1a1a2e),
        (Theme::Dark, LateNight) => (0x16213e, 0x0f3460),
    };
    [Rgb::from_hex(a), Rgb::from_hex(b)]
}

/// The "morning" fallback segment used when a key cannot be resolved.
pub const FALLBACK_SEGMENT: TimeSegment = TimeSegment::Breakfast;

/// Base color pair for a textual segment key such as `"earlyMorning"`.
pub fn base_colors(key: &str, theme: Theme) -> Result<[Rgb; 2]> {
    let segment: TimeSegment = key.parse().map_err(SceneError::from)?;
    Ok(base_pair(segment, theme))
}

/// Resolve the palette for a segment. Pure and deterministic.
pub fn resolve_palette(segment: TimeSegment, theme: Theme) -> Palette {
    Palette::derive(base_pair(segment, theme), theme)
}

/// Resolve a palette from a textual key, falling back to the morning palette.
pub fn resolve_named_palette(key: &str, theme: Theme) -> Palette {
    match base_colors(key, theme) {
        Ok(base) => Palette::derive(base, theme),
        Err(err) => {
            log::warn!("{err}; using morning palette");
            resolve_palette(FALLBACK_SEGMENT, theme)
        }
    }
}

/// Memoized palettes keyed by `(segment, theme)`.
///
/// Holds at most one entry per pair, so never more than
/// `TimeSegment::ALL.len() * 2` entries.
#[derive(Debug, Default)]
pub struct PaletteCache {
    entries: HashMap<(TimeSegment, Theme), Palette>,
    misses: u64,
}

impl PaletteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached palette, resolving it on first use.
    pub fn get(&mut self, segment: TimeSegment, theme: Theme) -> Palette {
        *self.entries.entry((segment, theme)).or_insert_with(|| {
            self.misses += 1;
            resolve_palette(segment, theme)
        })
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times a palette had to be resolved.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
