//! Per-frame composition of the background and effects layers.

use backdrop_core::{Season, WeatherTint};
use glam::Vec2;

use crate::animations::meteors::{self, Meteor};
use crate::animations::stars::{self, Star};
use crate::animations::tree::TreeModel;
use crate::animations::weather::{self, ParticlePool};
use crate::palette::Palette;
use crate::rng::SceneRng;
use crate::surface::{BlendMode, GradientStop, Paint, RenderSurface, Rgba};

const WATERCOLOR_ALPHA: f32 = 0.1;
const WATERCOLOR_LAYERS: usize = 3;

/// Inputs for one background frame.
#[derive(Debug, Clone)]
pub struct BackgroundPass<'a> {
    pub palette: Palette,
    pub season: Season,
    pub tint: WeatherTint,
    /// Alpha of the tint overlay, already scaled by any running transition.
    pub overlay_alpha: f32,
    pub watercolor: bool,
    pub tree: &'a TreeModel,
}

/// Sky gradient, weather tint, tree, then the watercolor wash.
pub fn render_background<S: RenderSurface + ?Sized>(
    surface: &mut S,
    pass: &BackgroundPass<'_>,
    rng: &mut SceneRng,
) {
    let (w, h) = surface.size();
    let full = Vec2::new(w, h);
    surface.clear();

    let sky = Paint::Radial {
        center: Vec2::new(w * 0.5, h * 0.3),
        radius: w.max(h) * 0.8,
        stops: vec![
            GradientStop::new(0.0, pass.palette.start),
            GradientStop::new(0.6, pass.palette.middle),
            GradientStop::new(1.0, pass.palette.end),
        ],
    };
    surface.fill_rect(Vec2::ZERO, full, &sky);

    if !pass.tint.is_neutral() && pass.overlay_alpha > 0.0 {
        surface.save();
        surface.set_blend_mode(BlendMode::Overlay);
        surface.set_alpha(pass.overlay_alpha);
        surface.fill_rect(Vec2::ZERO, full, &Paint::solid(pass.tint.overlay_color()));
        surface.restore();
    }

    pass.tree.render(surface, pass.season, rng);

    if pass.watercolor {
        render_watercolor(surface, pass.palette, rng);
    }
}

/// Soft multiply-blended blotches of the palette's start color.
fn render_watercolor<S: RenderSurface + ?Sized>(surface: &mut S, palette: Palette, rng: &mut SceneRng) {
    let (w, h) = surface.size();
    surface.save();
    surface.set_blend_mode(BlendMode::Multiply);
    surface.set_alpha(WATERCOLOR_ALPHA);
    for _ in 0..WATERCOLOR_LAYERS {
        let wash = Paint::Radial {
            center: Vec2::new(rng.unit() * w, rng.unit() * h),
            radius: w * 0.5,
            stops: vec![
                GradientStop::new(0.0, palette.start),
                GradientStop::new(1.0, Rgba::with_alpha(palette.start, 0.0)),
            ],
        };
        surface.fill_rect(Vec2::ZERO, Vec2::new(w, h), &wash);
    }
    surface.restore();
}

/// Weather particles, then stars and meteors while night mode is on.
pub fn render_effects<S: RenderSurface + ?Sized>(
    surface: &mut S,
    particles: &ParticlePool,
    night: bool,
    stars: &[Star],
    meteors: &[Meteor],
) {
    surface.clear();
    weather::render_particles(surface, particles);
    if night {
        stars::render_stars(surface, stars);
        meteors::render_meteors(surface, meteors);
    }
}
