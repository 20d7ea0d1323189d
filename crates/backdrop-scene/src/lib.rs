//! Ambient scene and particle engine.
//!
//! A [`SceneEngine`] owns two render surfaces. The background layer shows a
//! time-of-day gradient, an optional weather tint and a seasonal tree. The
//! effects layer carries weather particles and, at night, stars and meteors.
//! [`Canvas`] is the bundled software raster and [`SceneView`] presents a
//! pair of canvases in a terminal.

pub mod animations;
mod canvas;
mod engine;
mod error;
mod layers;
mod palette;
mod provider;
mod rng;
mod surface;
mod timer;
mod tracker;
mod transition;
mod view;

pub use canvas::{Canvas, DEFAULT_SAMPLES};
pub use engine::{BackgroundInfo, EngineConfig, LoopState, SceneEngine};
pub use error::{Result, SceneError};
pub use layers::{BackgroundPass, render_background, render_effects};
pub use palette::{
    FALLBACK_SEGMENT, Palette, PaletteCache, base_colors, resolve_named_palette, resolve_palette,
};
pub use provider::{LocalClock, ThemeProvider, TimeProvider, WeatherEffectProvider};
pub use rng::SceneRng;
pub use surface::{BlendMode, GradientStop, Paint, RenderSurface, Rgba};
pub use timer::Interval;
pub use tracker::{NightEdge, SceneTracker};
pub use transition::{Transition, ease_in_out_cubic};
pub use view::{SceneView, surface_geometry};
