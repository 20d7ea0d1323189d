//! Terminal presentation of the two scene layers.

use backdrop_core::Rgb;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    widgets::Widget,
};

use crate::canvas::Canvas;

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '\u{2580}';

/// Logical surface size and device pixel ratio for a terminal area.
///
/// Each cell holds two vertical pixels. `pixel_scale` logical units map to
/// one pixel, so shapes keep their logical sizes on small terminals.
pub fn surface_geometry(area: Rect, pixel_scale: f32) -> (f32, f32, f32) {
    let scale = if pixel_scale.is_finite() && pixel_scale > 0.0 {
        pixel_scale
    } else {
        1.0
    };
    let width = f32::from(area.width) * scale;
    let height = f32::from(area.height) * 2.0 * scale;
    (width, height, 1.0 / scale)
}

/// Widget compositing the effects canvas over the background canvas.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    background: &'a Canvas,
    effects: Option<&'a Canvas>,
    /// Shown where both layers are transparent.
    backdrop: Rgb,
}

impl<'a> SceneView<'a> {
    pub fn new(background: &'a Canvas) -> Self {
        Self {
            background,
            effects: None,
            backdrop: Rgb::BLACK,
        }
    }

    pub fn effects(mut self, effects: Option<&'a Canvas>) -> Self {
        self.effects = effects;
        self
    }

    pub fn backdrop(mut self, backdrop: Rgb) -> Self {
        self.backdrop = backdrop;
        self
    }

    /// Final color of one pixel after both layers.
    fn pixel(&self, x: usize, y: usize) -> Rgb {
        let mut color = match self.background.pixel(x, y) {
            Some(px) => px.over(self.backdrop),
            None => self.backdrop,
        };
        if let Some(px) = self.effects.and_then(|fx| fx.pixel(x, y)) {
            color = px.over(color);
        }
        color
    }
}

impl Widget for SceneView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let x = usize::from(col);
                let y = usize::from(row) * 2;
                let top: Color = self.pixel(x, y).into();
                let bottom: Color = self.pixel(x, y + 1).into();
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_char(HALF_BLOCK).set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}
