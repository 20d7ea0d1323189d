//! Render surface abstraction.
//!
//! The engine paints through [`RenderSurface`], a small 2D raster API with
//! canvas-style state: an affine transform stack, a global alpha and a
//! blend mode. Shapes are specified in user space and painted with a
//! [`Paint`] evaluated in that same space.

use backdrop_core::Rgb;
use glam::Vec2;

/// A straight (non-premultiplied) color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// An 8-bit color at the given alpha.
    pub fn with_alpha(color: Rgb, a: f32) -> Self {
        let [r, g, b] = color.to_unit();
        Self::new(r, g, b, a.clamp(0.0, 1.0))
    }

    /// Linear interpolation of every channel.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Flatten onto `backdrop` and quantize.
    pub fn over(self, backdrop: Rgb) -> Rgb {
        let [br, bg, bb] = backdrop.to_unit();
        let mix = |c: f32, b: f32| ((c * self.a + b * (1.0 - self.a)) * 255.0).round() as u8;
        Rgb::new(mix(self.r, br), mix(self.g, bg), mix(self.b, bb))
    }
}

impl From<Rgb> for Rgba {
    fn from(color: Rgb) -> Self {
        Self::with_alpha(color, 1.0)
    }
}

/// How a source color combines with what is already on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Overlay,
    Multiply,
}

/// A color stop along a gradient, `offset` in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f32, color: impl Into<Rgba>) -> Self {
        Self {
            offset,
            color: color.into(),
        }
    }
}

/// Fill source for shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Gradient along the line `start -> end`.
    Linear {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
    /// Concentric gradient from `center` out to `radius`.
    Radial {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn solid(color: Rgb) -> Self {
        Self::Solid(color.into())
    }

    /// Color of this paint at a user-space point.
    pub fn color_at(&self, p: Vec2) -> Rgba {
        match self {
            Self::Solid(c) => *c,
            Self::Linear { start, end, stops } => {
                let axis = *end - *start;
                let len_sq = axis.length_squared();
                let t = if len_sq > 0.0 {
                    (p - *start).dot(axis) / len_sq
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
            Self::Radial {
                center,
                radius,
                stops,
            } => {
                let t = if *radius > 0.0 {
                    p.distance(*center) / radius
                } else {
                    1.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Self::Solid(c)
    }
}

impl From<Rgb> for Paint {
    fn from(c: Rgb) -> Self {
        Self::solid(c)
    }
}

/// Evaluate sorted gradient stops at `t`, padding beyond the ends.
fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return a.color.lerp(b.color, local);
        }
    }
    last.color
}

/// Segments used to flatten quadratic curves.
const CURVE_SEGMENTS: usize = 12;

/// An addressable 2D raster target.
///
/// Sizes are logical units; the device pixel ratio maps them to pixels.
pub trait RenderSurface {
    /// Logical size.
    fn size(&self) -> (f32, f32);

    /// Backing pixel dimensions.
    fn pixel_size(&self) -> (usize, usize);

    /// Reallocate for a new logical size. Resets the transform stack, alpha
    /// and blend mode, then applies the `dpr` scale.
    fn resize(&mut self, width: f32, height: f32, dpr: f32);

    /// Make every pixel transparent.
    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    fn set_alpha(&mut self, alpha: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: &Paint);
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint);

    /// Stroke the closed outline of a polygon.
    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, paint: &Paint) {
        if points.len() < 2 {
            return;
        }
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.stroke_line(from, to, width, paint);
        }
    }

    /// Stroke a quadratic Bezier curve.
    fn stroke_quadratic(&mut self, from: Vec2, ctrl: Vec2, to: Vec2, width: f32, paint: &Paint) {
        let mut prev = from;
        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let mt = 1.0 - t;
            let next = from * (mt * mt) + ctrl * (2.0 * mt * t) + to * (t * t);
            self.stroke_line(prev, next, width, paint);
            prev = next;
        }
    }
}
