//! Software raster implementing [`RenderSurface`].

use glam::{Affine2, Vec2};

use crate::surface::{BlendMode, Paint, RenderSurface, Rgba};

/// Default supersampling grid per axis.
pub const DEFAULT_SAMPLES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    transform: Affine2,
    alpha: f32,
    blend: BlendMode,
}

impl DrawState {
    fn scaled(dpr: f32) -> Self {
        Self {
            transform: Affine2::from_scale(Vec2::splat(dpr)),
            alpha: 1.0,
            blend: BlendMode::SourceOver,
        }
    }
}

/// An in-memory RGBA raster with canvas-style drawing state.
///
/// Coverage is estimated with an `n x n` sample grid per pixel so shapes
/// smaller than a pixel still leave a faint mark.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f32,
    height: f32,
    dpr: f32,
    pixel_width: usize,
    pixel_height: usize,
    pixels: Vec<Rgba>,
    state: DrawState,
    stack: Vec<DrawState>,
    samples: u32,
}

impl Canvas {
    /// Create a transparent canvas of the given logical size.
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        let mut canvas = Self {
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
            pixel_width: 0,
            pixel_height: 0,
            pixels: Vec::new(),
            state: DrawState::scaled(1.0),
            stack: Vec::new(),
            samples: DEFAULT_SAMPLES,
        };
        canvas.resize(width, height, dpr);
        canvas
    }

    /// Set the supersampling grid (clamped to `1..=8`).
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.clamp(1, 8);
        self
    }

    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    pub fn transform(&self) -> Affine2 {
        self.state.transform
    }

    pub fn alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    /// Pixel at device coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.pixel_width || y >= self.pixel_height {
            return None;
        }
        self.pixels.get(y * self.pixel_width + x).copied()
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Device-space bounding box of a user-space rectangle, clipped to the raster.
    fn device_bounds(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        let t = self.state.transform;
        let corners = [
            t.transform_point2(min),
            t.transform_point2(Vec2::new(max.x, min.y)),
            t.transform_point2(max),
            t.transform_point2(Vec2::new(min.x, max.y)),
        ];
        let lo = corners.iter().fold(Vec2::splat(f32::INFINITY), |a, c| a.min(*c));
        let hi = corners
            .iter()
            .fold(Vec2::splat(f32::NEG_INFINITY), |a, c| a.max(*c));
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }

        let x0 = lo.x.floor().max(0.0) as usize;
        let y0 = lo.y.floor().max(0.0) as usize;
        let x1 = (hi.x.ceil().max(0.0) as usize).min(self.pixel_width);
        let y1 = (hi.y.ceil().max(0.0) as usize).min(self.pixel_height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Rasterize a shape given its user-space bounds and membership test.
    fn fill_shape(&mut self, min: Vec2, max: Vec2, paint: &Paint, contains: impl Fn(Vec2) -> bool) {
        if self.state.alpha <= 0.0 {
            return;
        }
        let inverse = self.state.transform.inverse();
        if !inverse.is_finite() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.device_bounds(min, max) else {
            return;
        };

        let n = self.samples;
        let step = 1.0 / n as f32;
        let total = (n * n) as f32;

        for py in y0..y1 {
            for px in x0..x1 {
                let mut hits = 0u32;
                for sy in 0..n {
                    for sx in 0..n {
                        let device = Vec2::new(
                            px as f32 + (sx as f32 + 0.5) * step,
                            py as f32 + (sy as f32 + 0.5) * step,
                        );
                        if contains(inverse.transform_point2(device)) {
                            hits += 1;
                        }
                    }
                }
                if hits == 0 {
                    continue;
                }

                let center = inverse.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                let src = paint.color_at(center);
                let alpha = src.a * self.state.alpha * (hits as f32 / total);
                let idx = py * self.pixel_width + px;
                self.pixels[idx] = composite(self.pixels[idx], src, alpha, self.state.blend);
            }
        }
    }
}

/// Composite `src` at `alpha` onto `dst` with the given blend mode.
fn composite(dst: Rgba, src: Rgba, alpha: f32, mode: BlendMode) -> Rgba {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.a;

    let blend = |cb: f32, cs: f32| -> f32 {
        let mixed = match mode {
            BlendMode::SourceOver => cs,
            BlendMode::Multiply => cs * cb,
            BlendMode::Overlay => {
                if cb <= 0.5 {
                    2.0 * cs * cb
                } else {
                    1.0 - 2.0 * (1.0 - cs) * (1.0 - cb)
                }
            }
        };
        (1.0 - da) * cs + da * mixed
    };

    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    let channel = |cb: f32, cs: f32| {
        ((blend(cb, cs) * sa + cb * da * (1.0 - sa)) / out_a).clamp(0.0, 1.0)
    };
    Rgba::new(
        channel(dst.r, src.r),
        channel(dst.g, src.g),
        channel(dst.b, src.b),
        out_a,
    )
}

/// Squared distance from `p` to the segment `a -> b`.
fn segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance_squared(a + ab * t)
}

/// Even-odd point-in-polygon test.
fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl RenderSurface for Canvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn pixel_size(&self) -> (usize, usize) {
        (self.pixel_width, self.pixel_height)
    }

    fn resize(&mut self, width: f32, height: f32, dpr: f32) {
        let sane = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.width = sane(width);
        self.height = sane(height);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.pixel_width = (self.width * self.dpr).round() as usize;
        self.pixel_height = (self.height * self.dpr).round() as usize;
        self.pixels = vec![Rgba::TRANSPARENT; self.pixel_width * self.pixel_height];
        self.stack.clear();
        self.state = DrawState::scaled(self.dpr);
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(angle);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::new(sx, sy));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint) {
        let min = origin.min(origin + size);
        let max = origin.max(origin + size);
        self.fill_shape(min, max, paint, |p| {
            p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let r = Vec2::splat(radius);
        let r_sq = radius * radius;
        self.fill_shape(center - r, center + r, paint, |p| {
            p.distance_squared(center) <= r_sq
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: &Paint) {
        if radii.is_nan() || radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let extent = Vec2::splat(radii.x.max(radii.y));
        let (sin, cos) = (-rotation).sin_cos();
        self.fill_shape(center - extent, center + extent, paint, |p| {
            let d = p - center;
            let local = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
            (local.x / radii.x).powi(2) + (local.y / radii.y).powi(2) <= 1.0
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        if points.len() < 3 {
            return;
        }
        let min = points.iter().fold(Vec2::splat(f32::INFINITY), |a, p| a.min(*p));
        let max = points
            .iter()
            .fold(Vec2::splat(f32::NEG_INFINITY), |a, p| a.max(*p));
        self.fill_shape(min, max, paint, |p| polygon_contains(points, p));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint) {
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let half_sq = half * half;
        let pad = Vec2::splat(half);
        self.fill_shape(from.min(to) - pad, from.max(to) + pad, paint, |p| {
            segment_distance_sq(p, from, to) <= half_sq
        });
    }
}

#[cfg(test)]
mod tests {
    use backdrop_core::Rgb;

    use super::*;

    fn red() -> Paint {
        Paint::solid(Rgb::new(255, 0, 0))
    }

    #[test]
    fn test_resize_uses_dpr_and_resets_state() {
        let mut canvas = Canvas::new(10.0, 5.0, 2.0);
        assert_eq!(canvas.pixel_size(), (20, 10));
        canvas.translate(3.0, 4.0);
        canvas.set_alpha(0.5);
        canvas.save();
        canvas.resize(8.0, 8.0, 0.5);
        assert_eq!(canvas.size(), (8.0, 8.0));
        assert_eq!(canvas.pixel_size(), (4, 4));
        assert_eq!(canvas.transform(), Affine2::from_scale(Vec2::splat(0.5)));
        assert_eq!(canvas.alpha(), 1.0);
        // The old saved state must not survive the resize.
        canvas.restore();
        assert_eq!(canvas.transform(), Affine2::from_scale(Vec2::splat(0.5)));
    }

    #[test]
    fn test_repeated_resize_does_not_accumulate_scale() {
        let mut canvas = Canvas::new(4.0, 4.0, 2.0);
        canvas.resize(4.0, 4.0, 2.0);
        canvas.resize(4.0, 4.0, 2.0);
        assert_eq!(canvas.transform(), Affine2::from_scale(Vec2::splat(2.0)));
    }

    #[test]
    fn test_fill_rect_covers_pixels() {
        let mut canvas = Canvas::new(4.0, 4.0, 1.0);
        canvas.fill_rect(Vec2::ZERO, Vec2::new(2.0, 4.0), &red());
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(canvas.pixel(3, 3), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_global_alpha_and_clear() {
        let mut canvas = Canvas::new(2.0, 2.0, 1.0);
        canvas.set_alpha(0.25);
        canvas.fill_rect(Vec2::ZERO, Vec2::new(2.0, 2.0), &red());
        let px = canvas.pixel(1, 1).unwrap();
        assert!((px.a - 0.25).abs() < 1e-6);
        canvas.clear();
        assert!(canvas.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_translate_moves_shapes() {
        let mut canvas = Canvas::new(8.0, 8.0, 1.0);
        canvas.save();
        canvas.translate(6.0, 6.0);
        canvas.fill_circle(Vec2::ZERO, 1.0, &red());
        canvas.restore();
        assert!(canvas.pixel(6, 6).unwrap().a > 0.0);
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.transform(), Affine2::IDENTITY);
    }

    #[test]
    fn test_subpixel_circle_has_partial_coverage() {
        let mut canvas = Canvas::new(4.0, 4.0, 1.0);
        canvas.fill_circle(Vec2::new(1.5, 1.5), 0.3, &red());
        let a = canvas.pixel(1, 1).unwrap().a;
        assert!(a > 0.0 && a < 1.0, "coverage was {a}");
    }

    #[test]
    fn test_polygon_fill() {
        let mut canvas = Canvas::new(10.0, 10.0, 1.0);
        let tri = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ];
        canvas.fill_polygon(&tri, &red());
        assert_eq!(canvas.pixel(1, 1).unwrap().a, 1.0);
        assert_eq!(canvas.pixel(9, 9).unwrap().a, 0.0);
    }

    #[test]
    fn test_multiply_darkens_backdrop() {
        let mut canvas = Canvas::new(1.0, 1.0, 1.0);
        canvas.fill_rect(Vec2::ZERO, Vec2::ONE, &Paint::solid(Rgb::new(255, 255, 255)));
        canvas.set_blend_mode(BlendMode::Multiply);
        canvas.fill_rect(Vec2::ZERO, Vec2::ONE, &Paint::solid(Rgb::new(0, 0, 0)));
        let px = canvas.pixel(0, 0).unwrap();
        assert_eq!((px.r, px.a), (0.0, 1.0));
    }

    #[test]
    fn test_overlay_on_dark_backdrop() {
        let mut canvas = Canvas::new(1.0, 1.0, 1.0);
        canvas.fill_rect(Vec2::ZERO, Vec2::ONE, &Paint::Solid(Rgba::new(0.25, 0.25, 0.25, 1.0)));
        canvas.set_blend_mode(BlendMode::Overlay);
        canvas.fill_rect(Vec2::ZERO, Vec2::ONE, &Paint::Solid(Rgba::new(1.0, 1.0, 1.0, 1.0)));
        // 2 * 1.0 * 0.25
        assert!((canvas.pixel(0, 0).unwrap().r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stroke_line_marks_path() {
        let mut canvas = Canvas::new(10.0, 10.0, 1.0);
        canvas.stroke_line(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0), 2.0, &red());
        assert!(canvas.pixel(5, 4).unwrap().a > 0.9);
        assert_eq!(canvas.pixel(5, 0).unwrap().a, 0.0);
    }
}
