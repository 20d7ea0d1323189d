//! Tunable parameters for the scene engine.

use serde::{Deserialize, Serialize};

/// Effects-layer parameters (weather particles, stars, meteors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Weather pool size at intensity 1.0.
    pub max_particles: usize,
    /// Star count while night mode is active.
    pub max_stars: usize,
    /// Concurrent meteor cap.
    pub max_meteors: usize,
    /// Base twinkle phase increment per frame.
    pub star_twinkle_speed: f32,
    /// Base meteor speed; each meteor gets 0.5x-1.5x of it.
    pub meteor_speed: f32,
    /// Spawn probability per frame.
    pub meteor_frequency: f32,
    /// Weather particle lifetime in milliseconds.
    pub particle_lifetime_ms: f32,
    /// Maximum number of trail points per meteor.
    pub meteor_trail_length: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            max_particles: 100,
            max_stars: 80,
            max_meteors: 3,
            star_twinkle_speed: 0.02,
            meteor_speed: 0.8,
            meteor_frequency: 0.001,
            particle_lifetime_ms: 5000.0,
            meteor_trail_length: 15,
        }
    }
}

/// Background-layer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// How often the time segment / season / theme are re-checked.
    pub scene_check_interval_ms: u64,
    /// How often night mode is recomputed.
    pub night_check_interval_ms: u64,
    /// Length of a background color transition.
    pub transition_duration_ms: u64,
    /// Tree animation phase increment per frame.
    pub tree_animation_speed: f32,
    /// Draw the multiply-blended watercolor wash.
    pub watercolor_effect: bool,
    /// Peak alpha of the weather tint overlay.
    pub weather_overlay_alpha: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            scene_check_interval_ms: 1000,
            night_check_interval_ms: 60_000,
            transition_duration_ms: 3000,
            tree_animation_speed: 0.001,
            watercolor_effect: true,
            weather_overlay_alpha: 0.2,
        }
    }
}

/// Static tree layout, relative to the surface size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Horizontal position of the trunk base (fraction of width).
    pub x: f32,
    /// Vertical position of the trunk base (fraction of height).
    pub y: f32,
    /// Overall tree height (fraction of height).
    pub base_height: f32,
    /// Canopy width (fraction of width).
    pub base_width: f32,
    pub branch_count: usize,
    pub leaf_count: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            x: 0.8,
            y: 0.7,
            base_height: 0.4,
            base_width: 0.15,
            branch_count: 8,
            leaf_count: 50,
        }
    }
}
