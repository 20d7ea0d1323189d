//! The procedural seasonal tree.
//!
//! The trunk is fixed, but branch lengths and foliage placement are re-rolled
//! on every frame. The resulting flicker is part of the look.

use std::f32::consts::{PI, TAU};

use backdrop_core::{Rgb, Season, TreeConfig, hsl_to_rgb};
use glam::Vec2;

use super::FrameStep;
use crate::rng::SceneRng;
use crate::surface::{GradientStop, Paint, RenderSurface, Rgba};

const TRUNK_LIGHT: Rgb = Rgb::from_hex(0x8b4513);
const TRUNK_MID: Rgb = Rgb::from_hex(0xa0522d);
const BARK: Rgb = Rgb::from_hex(0x654321);
const TRUNK_OUTLINE: Rgb = Rgb::from_hex(0x5d4037);
const PETAL: Rgb = Rgb::from_hex(0xffb6c1);
const GOLD: Rgb = Rgb::from_hex(0xffd700);
const FALLING_LEAF: Rgb = Rgb::from_hex(0xff6b35);

const AUTUMN_COLORS: [Rgb; 5] = [
    Rgb::from_hex(0xff6b35),
    Rgb::from_hex(0xf7931e),
    Rgb::from_hex(0xffd700),
    Rgb::from_hex(0xdc143c),
    Rgb::from_hex(0xb8860b),
];

/// Share of a half-turn covered by the branch fan.
const BRANCH_ARC: f32 = PI * 0.8;
const FALLING_LEAF_COUNT: usize = 8;
const SNOW_DOT_COUNT: usize = 15;

/// Tree layout resolved against a surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeGeometry {
    /// Center of the trunk base.
    pub base: Vec2,
    /// Top of the trunk where branches start.
    pub apex: Vec2,
    pub trunk_width: f32,
    pub trunk_height: f32,
    /// Canopy width.
    pub width: f32,
    /// Canopy height; also the nominal branch length.
    pub canopy_height: f32,
}

impl TreeGeometry {
    pub fn new(config: &TreeConfig, bounds: Vec2) -> Self {
        let base = Vec2::new(bounds.x * config.x, bounds.y * config.y);
        let tree_height = bounds.y * config.base_height;
        let width = bounds.x * config.base_width;
        let trunk_height = tree_height * 0.6;
        Self {
            base,
            apex: base - Vec2::new(0.0, trunk_height),
            trunk_width: width * 0.3,
            trunk_height,
            width,
            canopy_height: tree_height * 0.4,
        }
    }

    /// Center of the foliage ellipse, above the apex.
    pub fn canopy_center(&self) -> Vec2 {
        self.apex - Vec2::new(0.0, self.canopy_height * 0.5)
    }

    /// Radii of the foliage ellipse.
    pub fn canopy_radii(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.canopy_height * 0.6)
    }

    /// Trunk silhouette: wide at the base, narrower at the apex.
    pub fn trunk_outline(&self) -> [Vec2; 4] {
        let (x, y) = (self.base.x, self.base.y);
        let (w, top) = (self.trunk_width, self.apex.y);
        [
            Vec2::new(x - w / 2.0, y),
            Vec2::new(x - w / 3.0, top),
            Vec2::new(x + w / 3.0, top),
            Vec2::new(x + w / 2.0, y),
        ]
    }
}

/// Heading of branch `i` of `count`, measured from vertical.
pub fn branch_angle(i: usize, count: usize) -> f32 {
    let step = BRANCH_ARC / count.max(1) as f32;
    -BRANCH_ARC / 2.0 + step * (i as f32 + 0.5)
}

/// Point `length` away from `from` along `angle`, vertically squashed.
fn reach(from: Vec2, angle: f32, length: f32, squash: f32) -> Vec2 {
    from + Vec2::new(angle.sin() * length, -angle.cos() * length * squash)
}

/// Number of foliage dots drawn for a season.
pub fn foliage_count(season: Season, leaf_count: usize) -> usize {
    match season {
        Season::Spring | Season::Autumn => leaf_count,
        Season::Summer => (leaf_count * 3).div_ceil(2),
        Season::Winter => leaf_count.div_ceil(10),
    }
}

/// Static tree configuration plus the animation phase driving falling leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeModel {
    pub config: TreeConfig,
    pub animation_phase: f32,
}

impl TreeModel {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            animation_phase: 0.0,
        }
    }

    /// Advance the phase by `speed` per nominal frame.
    pub fn advance(&mut self, speed: f32, step: FrameStep) {
        self.animation_phase += speed * step.frames;
    }

    pub fn render<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        season: Season,
        rng: &mut SceneRng,
    ) {
        let (w, h) = surface.size();
        let geometry = TreeGeometry::new(&self.config, Vec2::new(w, h));

        surface.save();
        render_trunk(surface, &geometry);
        render_branches(surface, &geometry, self.config.branch_count, rng);
        let count = foliage_count(season, self.config.leaf_count);
        match season {
            Season::Spring => render_spring(surface, &geometry, count, rng),
            Season::Summer => render_summer(surface, &geometry, count, rng),
            Season::Autumn => {
                render_autumn(surface, &geometry, count, rng);
                render_falling_leaves(surface, &geometry, self.animation_phase);
            }
            Season::Winter => render_winter(surface, &geometry, count, rng),
        }
        surface.restore();
    }
}

fn render_trunk<S: RenderSurface + ?Sized>(surface: &mut S, g: &TreeGeometry) {
    let outline = g.trunk_outline();
    let half = g.trunk_width / 2.0;
    let paint = Paint::Linear {
        start: Vec2::new(g.base.x - half, g.base.y),
        end: Vec2::new(g.base.x + half, g.base.y),
        stops: vec![
            GradientStop::new(0.0, TRUNK_LIGHT),
            GradientStop::new(0.5, TRUNK_MID),
            GradientStop::new(1.0, BARK),
        ],
    };
    surface.fill_polygon(&outline, &paint);
    surface.stroke_polygon(&outline, 2.0, &Paint::solid(TRUNK_OUTLINE));
}

fn render_branches<S: RenderSurface + ?Sized>(
    surface: &mut S,
    g: &TreeGeometry,
    count: usize,
    rng: &mut SceneRng,
) {
    let bark = Paint::solid(BARK);
    for i in 0..count {
        let angle = branch_angle(i, count);
        let length = g.canopy_height * (0.6 + rng.unit() * 0.4);
        let tip = reach(g.apex, angle, length, 0.8);
        let ctrl = g.apex + Vec2::new(angle.sin() * length * 0.5, -angle.cos() * length * 0.3);
        surface.stroke_quadratic(g.apex, ctrl, tip, 3.0, &bark);

        for offset in [-0.5, 0.5] {
            let end = reach(tip, angle + offset, length * 0.3, 0.8);
            surface.stroke_line(tip, end, 1.0, &bark);
        }
    }
}

/// Uniform random point inside the canopy ellipse.
fn canopy_point(g: &TreeGeometry, rng: &mut SceneRng) -> Vec2 {
    let r = rng.unit().sqrt();
    let theta = rng.unit() * TAU;
    g.canopy_center() + Vec2::new(theta.cos(), theta.sin()) * g.canopy_radii() * r
}

fn render_spring<S: RenderSurface + ?Sized>(
    surface: &mut S,
    g: &TreeGeometry,
    count: usize,
    rng: &mut SceneRng,
) {
    for _ in 0..count {
        let at = canopy_point(g, rng);
        let radius = rng.range(3.0, 5.0);
        let leaf = hsl_to_rgb(120.0, 0.7, rng.range(0.6, 0.8));
        surface.fill_circle(at, radius, &Paint::solid(leaf));

        if rng.chance(0.2) {
            render_flower(surface, at);
        }
    }
}

fn render_flower<S: RenderSurface + ?Sized>(surface: &mut S, at: Vec2) {
    const PETALS: usize = 5;
    const PETAL_LENGTH: f32 = 3.0;

    let petal = Paint::solid(PETAL);
    surface.save();
    surface.translate(at.x, at.y);
    for _ in 0..PETALS {
        surface.rotate(TAU / PETALS as f32);
        surface.fill_ellipse(
            Vec2::new(0.0, -PETAL_LENGTH / 2.0),
            Vec2::new(PETAL_LENGTH / 3.0, PETAL_LENGTH / 2.0),
            0.0,
            &petal,
        );
    }
    surface.fill_circle(Vec2::ZERO, 1.0, &Paint::solid(GOLD));
    surface.restore();
}

fn render_summer<S: RenderSurface + ?Sized>(
    surface: &mut S,
    g: &TreeGeometry,
    count: usize,
    rng: &mut SceneRng,
) {
    for _ in 0..count {
        let at = canopy_point(g, rng);
        let radius = rng.range(4.0, 7.0);
        let leaf = hsl_to_rgb(120.0, 0.8, rng.range(0.3, 0.5));
        surface.fill_circle(at, radius, &Paint::solid(leaf));
    }
}

fn render_autumn<S: RenderSurface + ?Sized>(
    surface: &mut S,
    g: &TreeGeometry,
    count: usize,
    rng: &mut SceneRng,
) {
    for _ in 0..count {
        let at = canopy_point(g, rng);
        let radius = rng.range(3.0, 5.0);
        let color = AUTUMN_COLORS[rng.index(AUTUMN_COLORS.len())];
        surface.fill_circle(at, radius, &Paint::solid(color));
    }
}

/// Vertical offset of falling leaf `i` below the apex; cycles over twice the
/// canopy height.
pub fn falling_leaf_drop(phase: f32, i: usize, canopy_height: f32) -> f32 {
    let time = phase * 100.0;
    let span = canopy_height * 2.0;
    if span <= 0.0 {
        return canopy_height;
    }
    canopy_height + (time + i as f32 * 20.0).rem_euclid(span)
}

fn render_falling_leaves<S: RenderSurface + ?Sized>(surface: &mut S, g: &TreeGeometry, phase: f32) {
    let time = phase * 100.0;
    let paint = Paint::solid(FALLING_LEAF);
    for i in 0..FALLING_LEAF_COUNT {
        let spin = time + i as f32;
        let x = g.apex.x + spin.sin() * g.width * 0.3;
        let y = g.apex.y + falling_leaf_drop(phase, i, g.canopy_height);
        surface.fill_ellipse(Vec2::new(x, y), Vec2::new(3.0, 5.0), spin, &paint);
    }
}

fn render_winter<S: RenderSurface + ?Sized>(
    surface: &mut S,
    g: &TreeGeometry,
    count: usize,
    rng: &mut SceneRng,
) {
    let residual = Paint::solid(TRUNK_LIGHT);
    for _ in 0..count {
        let at = canopy_point(g, rng);
        surface.fill_circle(at, 2.0, &residual);
    }

    // Snow resting on the branches.
    let snow = Paint::Solid(Rgba::with_alpha(Rgb::WHITE, 0.8));
    let center = g.canopy_center();
    let extent = g.canopy_radii() * 2.0;
    for _ in 0..SNOW_DOT_COUNT {
        let at = center + Vec2::new(rng.unit() - 0.5, rng.unit() - 0.5) * extent;
        surface.fill_circle(at, rng.range(1.0, 2.0), &snow);
    }
}
