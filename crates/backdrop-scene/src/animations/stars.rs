//! Night-sky stars.

use std::f32::consts::TAU;

use backdrop_core::Rgb;
use glam::Vec2;

use super::FrameStep;
use crate::rng::SceneRng;
use crate::surface::{Paint, RenderSurface};

/// Dimmest rendered brightness.
pub const MIN_BRIGHTNESS: f32 = 0.3;

/// Brightness above which a star gets a glow halo.
const GLOW_THRESHOLD: f32 = 0.7;

/// A twinkling star.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub position: Vec2,
    /// Radius.
    pub size: f32,
    /// Current brightness, within `MIN_BRIGHTNESS..=1.0`.
    pub brightness: f32,
    pub twinkle_phase: f32,
    /// Phase increment per frame.
    pub twinkle_speed: f32,
}

/// Brightness for a twinkle phase; oscillates within `[0.3, 1.0]`.
pub fn brightness_at(phase: f32) -> f32 {
    let wave = 0.5 + 0.5 * phase.sin();
    (MIN_BRIGHTNESS + (1.0 - MIN_BRIGHTNESS) * wave).clamp(MIN_BRIGHTNESS, 1.0)
}

impl Star {
    /// A star in the upper 60% of the surface.
    pub fn spawn(bounds: Vec2, twinkle_speed: f32, rng: &mut SceneRng) -> Self {
        let twinkle_phase = rng.unit() * TAU;
        Self {
            position: Vec2::new(rng.unit() * bounds.x, rng.unit() * bounds.y * 0.6),
            size: rng.range(0.5, 2.5),
            brightness: brightness_at(twinkle_phase),
            twinkle_phase,
            twinkle_speed: twinkle_speed * (0.5 + rng.unit()),
        }
    }

    pub fn twinkle(&mut self, step: FrameStep) {
        // Keep the phase small so sin() stays precise over long sessions.
        self.twinkle_phase = (self.twinkle_phase + self.twinkle_speed * step.frames).rem_euclid(TAU);
        self.brightness = brightness_at(self.twinkle_phase);
    }
}

/// A full star field for night mode.
pub fn init_stars(count: usize, bounds: Vec2, twinkle_speed: f32, rng: &mut SceneRng) -> Vec<Star> {
    (0..count)
        .map(|_| Star::spawn(bounds, twinkle_speed, rng))
        .collect()
}

pub fn update_stars(stars: &mut [Star], step: FrameStep) {
    for star in stars {
        star.twinkle(step);
    }
}

pub fn render_stars<S: RenderSurface + ?Sized>(surface: &mut S, stars: &[Star]) {
    let white = Paint::solid(Rgb::WHITE);
    surface.save();
    for star in stars {
        surface.set_alpha(star.brightness * 0.8);
        surface.fill_circle(star.position, star.size, &white);

        if star.brightness > GLOW_THRESHOLD {
            surface.set_alpha((star.brightness - GLOW_THRESHOLD) * 2.0);
            surface.fill_circle(star.position, star.size * 2.0, &white);
        }
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_bounds() {
        let mut phase = -20.0;
        while phase < 20.0 {
            let b = brightness_at(phase);
            assert!((MIN_BRIGHTNESS..=1.0).contains(&b), "phase {phase} -> {b}");
            phase += 0.01;
        }
        assert!((brightness_at(std::f32::consts::FRAC_PI_2) - 1.0).abs() < 1e-6);
        assert!((brightness_at(-std::f32::consts::FRAC_PI_2) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_stars_stay_in_upper_sky() {
        let mut rng = SceneRng::from_seed_u64(1);
        let bounds = Vec2::new(400.0, 300.0);
        let stars = init_stars(80, bounds, 0.02, &mut rng);
        assert_eq!(stars.len(), 80);
        for star in &stars {
            assert!(star.position.y < 180.0);
            assert!((0.5..2.5).contains(&star.size));
            assert!((0.01..0.03).contains(&star.twinkle_speed));
        }
    }

    #[test]
    fn test_twinkle_keeps_brightness_in_range() {
        let mut rng = SceneRng::from_seed_u64(2);
        let mut stars = init_stars(20, Vec2::new(100.0, 100.0), 0.5, &mut rng);
        for _ in 0..500 {
            update_stars(&mut stars, FrameStep::NOMINAL);
            assert!(
                stars
                    .iter()
                    .all(|s| (MIN_BRIGHTNESS..=1.0).contains(&s.brightness))
            );
        }
    }
}
