//! Weather particles: rain, snow, fog and sunbeams.
//!
//! Every kind shares one lifecycle. Life counts down by elapsed time and a
//! particle whose life runs out is re-created in place as the same kind, so
//! the pool never changes size between re-seeds.

use std::f32::consts::{PI, TAU};

use backdrop_core::{EffectKind, Rgb, WeatherEffect};
use glam::Vec2;

use super::FrameStep;
use crate::rng::SceneRng;
use crate::surface::{GradientStop, Paint, RenderSurface, Rgba};

const RAIN_COLOR: Rgb = Rgb::from_hex(0x87ceeb);
const FOG_COLOR: Rgb = Rgb::new(200, 200, 200);

/// Particle kinds that have a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Rain,
    Snow,
    Fog,
    Sunbeam,
}

impl ParticleKind {
    /// Particle kind for an effect; `None` for effects with no particles.
    pub fn for_effect(kind: EffectKind) -> Option<Self> {
        match kind {
            EffectKind::Rain => Some(Self::Rain),
            EffectKind::Snow => Some(Self::Snow),
            EffectKind::Fog => Some(Self::Fog),
            EffectKind::Sunbeam => Some(Self::Sunbeam),
            EffectKind::None | EffectKind::Clouds | EffectKind::Lightning => None,
        }
    }
}

// ========== PARTICLE ==========

/// Kind-specific kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Rain {
        /// Pixels per frame.
        speed: f32,
        /// Streak length.
        length: f32,
        /// Heading in radians, `PI` is straight down.
        angle: f32,
    },
    Snow {
        speed: f32,
        size: f32,
        /// Horizontal pixels per frame.
        drift: f32,
        rotation: f32,
        rotation_speed: f32,
    },
    Fog {
        speed: f32,
        /// Blob radius.
        size: f32,
        /// Heading in radians.
        direction: f32,
    },
    Sunbeam {
        speed: f32,
        width: f32,
        length: f32,
        /// Tilt from vertical.
        angle: f32,
    },
}

/// A single weather particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Remaining life in milliseconds, within `0.0..=max_life`.
    pub life: f32,
    pub max_life: f32,
    pub opacity: f32,
    pub motion: Motion,
}

impl Particle {
    /// Create a fresh particle of `kind` somewhere on a surface of size `bounds`.
    pub fn spawn(kind: ParticleKind, bounds: Vec2, lifetime_ms: f32, rng: &mut SceneRng) -> Self {
        let (w, h) = (bounds.x, bounds.y);
        let life = lifetime_ms.max(0.0);
        let (position, opacity, motion) = match kind {
            ParticleKind::Rain => (
                Vec2::new(rng.unit() * w, rng.unit() * h),
                rng.range(0.6, 1.0),
                Motion::Rain {
                    speed: rng.range(3.0, 7.0),
                    length: rng.range(10.0, 25.0),
                    angle: PI + rng.range(-0.1, 0.1),
                },
            ),
            ParticleKind::Snow => (
                Vec2::new(rng.unit() * w, rng.unit() * h),
                rng.range(0.7, 1.0),
                Motion::Snow {
                    speed: rng.range(1.0, 3.0),
                    size: rng.range(2.0, 5.0),
                    drift: rng.range(-1.0, 1.0),
                    rotation: 0.0,
                    rotation_speed: rng.range(-0.05, 0.05),
                },
            ),
            ParticleKind::Fog => (
                Vec2::new(rng.unit() * w, h * 0.7 + rng.unit() * h * 0.3),
                rng.range(0.1, 0.3),
                Motion::Fog {
                    speed: rng.range(0.5, 1.5),
                    size: rng.range(50.0, 150.0),
                    direction: rng.unit() * TAU,
                },
            ),
            ParticleKind::Sunbeam => (
                Vec2::new(w * 0.2 + rng.unit() * w * 0.6, rng.unit() * h * 0.4),
                rng.range(0.1, 0.25),
                Motion::Sunbeam {
                    speed: rng.range(0.2, 0.5),
                    width: rng.range(2.0, 5.0),
                    length: rng.range(100.0, 300.0),
                    angle: rng.range(0.15, 0.25),
                },
            ),
        };
        Self {
            position,
            life,
            max_life: life,
            opacity,
            motion,
        }
    }

    pub fn kind(&self) -> ParticleKind {
        match self.motion {
            Motion::Rain { .. } => ParticleKind::Rain,
            Motion::Snow { .. } => ParticleKind::Snow,
            Motion::Fog { .. } => ParticleKind::Fog,
            Motion::Sunbeam { .. } => ParticleKind::Sunbeam,
        }
    }

    /// Remaining life as a fraction of the full lifetime.
    pub fn fade(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Draw opacity: base opacity faded by remaining life.
    pub fn alpha(&self) -> f32 {
        self.opacity * self.fade()
    }

    /// Advance by one step, recycling in place when life runs out.
    pub fn step(&mut self, step: FrameStep, bounds: Vec2, rng: &mut SceneRng) {
        self.life = (self.life - step.delta_ms).max(0.0);
        if self.life <= 0.0 {
            *self = Self::spawn(self.kind(), bounds, self.max_life, rng);
            return;
        }

        let f = step.frames;
        let (w, h) = (bounds.x, bounds.y);
        match &mut self.motion {
            Motion::Rain { speed, angle, .. } => {
                self.position += rain_heading(*angle) * *speed * f;
                if self.position.y > h + 50.0 {
                    self.position = Vec2::new(rng.unit() * w, -50.0);
                }
            }
            Motion::Snow {
                speed,
                drift,
                rotation,
                rotation_speed,
                ..
            } => {
                self.position += Vec2::new(*drift, *speed) * f;
                *rotation += *rotation_speed * f;
                if self.position.y > h + 10.0 {
                    self.position = Vec2::new(rng.unit() * w, -10.0);
                }
                if self.position.x < -10.0 || self.position.x > w + 10.0 {
                    self.position.x = rng.unit() * w;
                }
            }
            Motion::Fog {
                speed,
                size,
                direction,
            } => {
                let (sin, cos) = direction.sin_cos();
                self.position += Vec2::new(cos, sin * 0.5) * *speed * f;
                if self.position.x < -*size || self.position.x > w + *size {
                    self.position.x = rng.unit() * w;
                }
            }
            Motion::Sunbeam { speed, length, .. } => {
                self.position.y += *speed * f;
                self.opacity *= 0.999_f32.powf(f);
                if self.position.y > h + *length {
                    self.position = Vec2::new(w * 0.2 + rng.unit() * w * 0.6, -*length);
                    self.opacity = rng.range(0.1, 0.25);
                }
            }
        }
    }
}

/// Unit heading for a rain angle; `PI` points straight down the screen.
fn rain_heading(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), -angle.cos())
}

// ========== POOL ==========

/// Number of particles for an effect at a given cap.
pub fn pool_size(max_particles: usize, intensity: f32) -> usize {
    if intensity.is_nan() || intensity <= 0.0 {
        return 0;
    }
    (max_particles as f32 * intensity.min(1.0)).floor() as usize
}

/// Fixed-size collection of weather particles for the active effect.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    effect: WeatherEffect,
    particles: Vec<Particle>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every particle and create a fresh set for `effect`.
    pub fn reseed(
        &mut self,
        effect: WeatherEffect,
        max_particles: usize,
        lifetime_ms: f32,
        bounds: Vec2,
        rng: &mut SceneRng,
    ) {
        self.effect = effect;
        self.particles.clear();

        if effect.is_none() {
            return;
        }
        let Some(kind) = ParticleKind::for_effect(effect.kind) else {
            log::debug!("weather effect {} has no particles", effect.kind.as_str());
            return;
        };

        let count = pool_size(max_particles, effect.intensity);
        self.particles
            .extend((0..count).map(|_| Particle::spawn(kind, bounds, lifetime_ms, rng)));
        log::debug!(
            "re-seeded {count} {} particles at intensity {}",
            effect.kind.as_str(),
            effect.intensity
        );
    }

    pub fn update(&mut self, step: FrameStep, bounds: Vec2, rng: &mut SceneRng) {
        for particle in &mut self.particles {
            particle.step(step, bounds, rng);
        }
    }

    pub fn clear(&mut self) {
        self.effect = WeatherEffect::NONE;
        self.particles.clear();
    }

    pub fn effect(&self) -> WeatherEffect {
        self.effect
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

// ========== RENDERING ==========

/// Draw every particle at its faded opacity.
pub fn render_particles<S: RenderSurface + ?Sized>(surface: &mut S, pool: &ParticlePool) {
    for particle in pool.iter() {
        let alpha = particle.alpha();
        if alpha <= 0.0 {
            continue;
        }
        surface.save();
        surface.set_alpha(alpha);
        render_particle(surface, particle);
        surface.restore();
    }
}

fn render_particle<S: RenderSurface + ?Sized>(surface: &mut S, particle: &Particle) {
    let p = particle.position;
    match particle.motion {
        Motion::Rain { length, angle, .. } => {
            let tail = p - rain_heading(angle) * length;
            surface.stroke_line(tail, p, 1.0, &Paint::solid(RAIN_COLOR));
        }
        Motion::Snow { size, rotation, .. } => {
            let white = Paint::solid(Rgb::WHITE);
            surface.translate(p.x, p.y);
            surface.rotate(rotation);
            surface.fill_circle(Vec2::ZERO, size, &white);
            for _ in 0..6 {
                surface.rotate(PI / 3.0);
                surface.stroke_line(Vec2::new(0.0, -size), Vec2::new(0.0, size), 0.5, &white);
            }
        }
        Motion::Fog { size, .. } => {
            let paint = Paint::Radial {
                center: p,
                radius: size,
                stops: vec![
                    GradientStop::new(0.0, Rgba::with_alpha(FOG_COLOR, 0.3)),
                    GradientStop::new(1.0, Rgba::with_alpha(FOG_COLOR, 0.0)),
                ],
            };
            surface.fill_circle(p, size, &paint);
        }
        Motion::Sunbeam {
            width,
            length,
            angle,
            ..
        } => {
            let edge = Rgba::with_alpha(Rgb::WHITE, 0.0);
            let paint = Paint::Linear {
                start: Vec2::new(-width / 2.0, 0.0),
                end: Vec2::new(width / 2.0, 0.0),
                stops: vec![
                    GradientStop::new(0.0, edge),
                    GradientStop::new(0.5, Rgba::WHITE),
                    GradientStop::new(1.0, edge),
                ],
            };
            surface.translate(p.x, p.y);
            surface.rotate(angle);
            surface.fill_rect(Vec2::new(-width / 2.0, 0.0), Vec2::new(width, length), &paint);
        }
    }
}
