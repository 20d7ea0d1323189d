//! Shooting stars with fading trails.

use std::collections::VecDeque;

use backdrop_core::Rgb;
use glam::Vec2;

use super::FrameStep;
use crate::rng::SceneRng;
use crate::surface::{Paint, RenderSurface};

/// One remembered trail position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub opacity: f32,
}

/// A meteor travelling in a straight line from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Meteor {
    pub start: Vec2,
    pub end: Vec2,
    pub current: Vec2,
    /// Fraction of the path covered, `0.0..1.0` while alive.
    pub progress: f32,
    pub speed: f32,
    pub size: f32,
    trail: VecDeque<TrailPoint>,
    trail_cap: usize,
}

impl Meteor {
    /// Enter from a random side edge, heading down toward the middle of the surface.
    pub fn spawn(bounds: Vec2, base_speed: f32, trail_cap: usize, rng: &mut SceneRng) -> Self {
        let (w, h) = (bounds.x, bounds.y);
        let start_x = if rng.chance(0.5) { -50.0 } else { w + 50.0 };
        let start = Vec2::new(start_x, rng.unit() * h * 0.3);
        let end = Vec2::new(
            w * 0.3 + rng.unit() * w * 0.4,
            start.y + h * 0.2 + rng.unit() * h * 0.3,
        );
        Self {
            start,
            end,
            current: start,
            progress: 0.0,
            speed: base_speed * (0.5 + rng.unit()),
            size: rng.range(1.0, 4.0),
            trail: VecDeque::with_capacity(trail_cap + 1),
            trail_cap,
        }
    }

    /// Advance along the path. Returns `false` once the meteor has finished.
    pub fn advance(&mut self, step: FrameStep) -> bool {
        self.progress += self.speed * 0.01 * step.frames;
        if self.progress >= 1.0 {
            return false;
        }

        self.current = self.start.lerp(self.end, self.progress);
        self.trail.push_back(TrailPoint {
            position: self.current,
            opacity: 1.0,
        });
        while self.trail.len() > self.trail_cap {
            self.trail.pop_front();
        }

        // Oldest point is dimmest.
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter_mut().enumerate() {
            point.opacity = i as f32 / len;
        }
        true
    }

    pub fn trail(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }
}

/// Move every meteor forward and drop the finished ones.
pub fn update_meteors(meteors: &mut Vec<Meteor>, step: FrameStep) {
    meteors.retain_mut(|meteor| meteor.advance(step));
}

/// Per-frame meteor spawn roll, scaled to the number of elapsed frames.
pub fn spawn_chance(frequency: f32, step: FrameStep) -> f32 {
    let p = frequency.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powf(step.frames)
}

/// Maybe add a meteor. Only while night mode is on and under `max_meteors`.
#[allow(clippy::too_many_arguments)]
pub fn maybe_spawn(
    meteors: &mut Vec<Meteor>,
    night: bool,
    max_meteors: usize,
    frequency: f32,
    base_speed: f32,
    trail_cap: usize,
    bounds: Vec2,
    step: FrameStep,
    rng: &mut SceneRng,
) -> bool {
    if !night || meteors.len() >= max_meteors {
        return false;
    }
    if !rng.chance(spawn_chance(frequency, step)) {
        return false;
    }
    meteors.push(Meteor::spawn(bounds, base_speed, trail_cap, rng));
    true
}

pub fn render_meteors<S: RenderSurface + ?Sized>(surface: &mut S, meteors: &[Meteor]) {
    let white = Paint::solid(Rgb::WHITE);
    surface.save();
    for meteor in meteors {
        let len = meteor.trail_len() as f32;
        for (i, point) in meteor.trail().enumerate() {
            surface.set_alpha(point.opacity * 0.8);
            surface.fill_circle(point.position, meteor.size * (i as f32 / len), &white);
        }

        surface.set_alpha(1.0);
        surface.fill_circle(meteor.current, meteor.size, &white);

        // Halo
        surface.set_alpha(0.3);
        surface.fill_circle(meteor.current, meteor.size * 3.0, &white);
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(400.0, 300.0);

    #[test]
    fn test_spawn_geometry() {
        let mut rng = SceneRng::from_seed_u64(4);
        for _ in 0..100 {
            let m = Meteor::spawn(BOUNDS, 0.8, 15, &mut rng);
            assert!(m.start.x == -50.0 || m.start.x == BOUNDS.x + 50.0);
            assert!(m.start.y < BOUNDS.y * 0.3);
            assert!((120.0..280.0).contains(&m.end.x));
            assert!(m.end.y >= m.start.y + 60.0);
            assert!((0.4..1.2).contains(&m.speed));
            assert!((1.0..4.0).contains(&m.size));
        }
    }

    #[test]
    fn test_trail_is_bounded_and_brightens_toward_head() {
        let mut rng = SceneRng::from_seed_u64(8);
        let mut meteor = Meteor::spawn(BOUNDS, 0.1, 15, &mut rng);
        while meteor.advance(FrameStep::NOMINAL) {
            assert!(meteor.trail_len() <= 15);
            let opacities: Vec<f32> = meteor.trail().map(|p| p.opacity).collect();
            assert!(opacities.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(opacities.first().copied(), Some(0.0));
        }
        assert!(meteor.progress >= 1.0);
    }

    #[test]
    fn test_finished_meteors_are_removed() {
        let mut rng = SceneRng::from_seed_u64(12);
        let mut meteors = vec![Meteor::spawn(BOUNDS, 0.8, 15, &mut rng)];
        // Slowest meteor (0.4) needs 250 frames.
        for _ in 0..300 {
            update_meteors(&mut meteors, FrameStep::NOMINAL);
        }
        assert!(meteors.is_empty());
    }

    #[test]
    fn test_spawn_only_at_night_and_under_cap() {
        let mut rng = SceneRng::from_seed_u64(16);
        let mut meteors = Vec::new();
        assert!(!maybe_spawn(
            &mut meteors, false, 3, 1.0, 0.8, 15, BOUNDS, FrameStep::NOMINAL, &mut rng
        ));
        for _ in 0..10 {
            maybe_spawn(&mut meteors, true, 3, 1.0, 0.8, 15, BOUNDS, FrameStep::NOMINAL, &mut rng);
        }
        assert_eq!(meteors.len(), 3);
    }

    #[test]
    fn test_spawn_chance_scaling() {
        assert!((spawn_chance(0.001, FrameStep::NOMINAL) - 0.001).abs() < 1e-6);
        assert_eq!(spawn_chance(0.5, FrameStep::from_delta_ms(0.0)), 0.0);
        assert!(spawn_chance(0.001, FrameStep::from_delta_ms(32.0)) > 0.001);
    }
}
