//! The scene engine: one instance per pair of render surfaces.
//!
//! The host calls [`SceneEngine::advance`] once per display refresh with a
//! monotonically increasing millisecond clock. Scene and night checks run as
//! polled timers inside that call, so every mutation happens sequentially on
//! the caller's thread.

use backdrop_core::{
    BackgroundConfig, EffectKind, EffectsConfig, SceneDescriptor, Season, Theme, TimeSegment,
    TreeConfig, WeatherEffect, WeatherTint, classify, is_night_hour,
};
use chrono::Timelike;
use glam::Vec2;
use serde::Serialize;

use crate::animations::FrameStep;
use crate::animations::meteors::{self, Meteor};
use crate::animations::stars::{self, Star};
use crate::animations::tree::TreeModel;
use crate::animations::weather::ParticlePool;
use crate::error::{Result, SceneError};
use crate::layers::{self, BackgroundPass};
use crate::palette::{FALLBACK_SEGMENT, Palette, PaletteCache};
use crate::provider::{ThemeProvider, TimeProvider, WeatherEffectProvider};
use crate::rng::SceneRng;
use crate::surface::RenderSurface;
use crate::timer::Interval;
use crate::tracker::{NightEdge, SceneTracker};
use crate::transition::Transition;

/// Everything tunable about the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub effects: EffectsConfig,
    pub background: BackgroundConfig,
    pub tree: TreeConfig,
}

/// Lifecycle of the frame loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, not yet initialized.
    #[default]
    Idle,
    Running,
    /// Initialization failed; every call is a no-op.
    Inert,
    /// Torn down.
    Stopped,
}

/// Snapshot of what the background is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundInfo {
    pub time_segment: TimeSegment,
    pub season: Season,
    pub theme: Theme,
    pub is_night: bool,
    pub palette: Palette,
}

/// Ambient scene engine driving a background and an effects surface.
pub struct SceneEngine<S: RenderSurface> {
    config: EngineConfig,
    time: Box<dyn TimeProvider>,
    theme: Box<dyn ThemeProvider>,
    weather: Box<dyn WeatherEffectProvider>,

    background: Option<S>,
    effects: Option<S>,
    state: LoopState,

    tracker: SceneTracker,
    palettes: PaletteCache,
    transition: Option<Transition>,
    tint: WeatherTint,
    /// Last effect read from the weather provider.
    pulled_weather: Option<WeatherEffect>,

    tree: TreeModel,
    particles: ParticlePool,
    stars: Vec<Star>,
    meteors: Vec<Meteor>,

    scene_timer: Interval,
    night_timer: Interval,
    last_frame_ms: Option<u64>,
    frames_rendered: u64,
    frames_skipped: u64,
    rng: SceneRng,
}

impl<S: RenderSurface> SceneEngine<S> {
    pub fn new(
        config: EngineConfig,
        time: impl TimeProvider + 'static,
        theme: impl ThemeProvider + 'static,
        weather: impl WeatherEffectProvider + 'static,
    ) -> Self {
        let initial_theme = theme.theme();
        Self {
            scene_timer: Interval::new(config.background.scene_check_interval_ms),
            night_timer: Interval::new(config.background.night_check_interval_ms),
            tree: TreeModel::new(config.tree.clone()),
            config,
            time: Box::new(time),
            theme: Box::new(theme),
            weather: Box::new(weather),
            background: None,
            effects: None,
            state: LoopState::Idle,
            tracker: SceneTracker::new(initial_theme),
            palettes: PaletteCache::new(),
            transition: None,
            tint: WeatherTint::NEUTRAL,
            pulled_weather: None,
            particles: ParticlePool::new(),
            stars: Vec::new(),
            meteors: Vec::new(),
            last_frame_ms: None,
            frames_rendered: 0,
            frames_skipped: 0,
            rng: SceneRng::default(),
        }
    }

    /// Replace the random source, e.g. with a seeded one for tests.
    pub fn with_rng(mut self, rng: SceneRng) -> Self {
        self.rng = rng;
        self
    }

    /// Attach the surfaces and start the loop.
    ///
    /// Without a background surface the engine logs a warning and stays
    /// inert. The effects surface is optional. Calling `init` on a running
    /// engine is a no-op; an inert or destroyed engine reports why it
    /// cannot start.
    pub fn init(&mut self, background: Option<S>, effects: Option<S>, now_ms: u64) -> Result<()> {
        match self.state {
            LoopState::Idle => {}
            LoopState::Running => return Ok(()),
            LoopState::Inert => return Err(SceneError::MissingSurface),
            LoopState::Stopped => return Err(SceneError::Stopped),
        }

        let Some(background) = background else {
            log::warn!("background surface not found; scene engine stays inert");
            self.state = LoopState::Inert;
            return Err(SceneError::MissingSurface);
        };
        if effects.is_none() {
            log::warn!("effects surface not found; drawing background only");
        }
        self.background = Some(background);
        self.effects = effects;

        self.notify_theme_changed();
        self.check_scene(now_ms);
        self.on_night_tick();
        self.on_weather_updated(None);

        self.scene_timer.start(now_ms);
        self.night_timer.start(now_ms);
        self.last_frame_ms = Some(now_ms);
        self.state = LoopState::Running;
        log::debug!("scene engine running");
        Ok(())
    }

    /// Resize both surfaces. Safe to call at any time.
    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) {
        for surface in [self.background.as_mut(), self.effects.as_mut()]
            .into_iter()
            .flatten()
        {
            surface.resize(width, height, dpr);
        }
    }

    /// Stop the loop, cancel timers and empty every pool. Idempotent.
    pub fn destroy(&mut self) {
        if self.state != LoopState::Stopped {
            log::debug!("scene engine stopped");
        }
        self.state = LoopState::Stopped;
        self.scene_timer.stop();
        self.night_timer.stop();
        self.particles.clear();
        self.stars.clear();
        self.meteors.clear();
        self.palettes.clear();
        self.transition = None;
        self.pulled_weather = None;
        self.last_frame_ms = None;
    }

    /// Run one frame at `now_ms`. Returns whether the loop is still running.
    ///
    /// A failing frame is logged and skipped; it never stops the loop.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        if self.state != LoopState::Running {
            return false;
        }

        if self.scene_timer.poll(now_ms) {
            self.on_scene_tick(now_ms);
        }
        if self.night_timer.poll(now_ms) {
            self.on_night_tick();
        }

        let delta_ms = self
            .last_frame_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.last_frame_ms = Some(now_ms);
        let step = FrameStep::from_delta_ms(delta_ms as f32);

        match self.try_frame(step, now_ms) {
            Ok(()) => self.frames_rendered += 1,
            Err(err) => {
                self.frames_skipped += 1;
                log::warn!("skipping frame: {err}");
            }
        }
        true
    }

    fn try_frame(&mut self, step: FrameStep, now_ms: u64) -> Result<()> {
        let background = self.background.as_ref().ok_or(SceneError::MissingSurface)?;
        let (width, height) = background.size();
        if !(width.is_finite() && height.is_finite()) {
            return Err(SceneError::InvalidGeometry("non-finite surface size"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(SceneError::EmptySurface { width, height });
        }

        // Update
        self.tree
            .advance(self.config.background.tree_animation_speed, step);
        if let Some(transition) = self.transition.as_mut() {
            transition.update(now_ms);
            if transition.is_finished() {
                self.transition = None;
            }
        }

        let night = self.tracker.is_night();
        if self.effects.is_some() {
            let bounds = self.effects_bounds();
            let fx = &self.config.effects;
            self.particles.update(step, bounds, &mut self.rng);
            if night {
                stars::update_stars(&mut self.stars, step);
                meteors::update_meteors(&mut self.meteors, step);
                meteors::maybe_spawn(
                    &mut self.meteors,
                    night,
                    fx.max_meteors,
                    fx.meteor_frequency,
                    fx.meteor_speed,
                    fx.meteor_trail_length,
                    bounds,
                    step,
                    &mut self.rng,
                );
            }
        }

        // Background layer
        let (palette, season) = match self.tracker.descriptor() {
            Some(d) => (self.palettes.get(d.time_segment, d.theme), d.season),
            None => {
                log::warn!("no time segment observed yet; using morning palette");
                (
                    self.palettes.get(FALLBACK_SEGMENT, self.tracker.theme()),
                    Season::Spring,
                )
            }
        };
        let pass = BackgroundPass {
            palette,
            season,
            tint: self.tint,
            overlay_alpha: self.overlay_alpha(),
            watercolor: self.config.background.watercolor_effect,
            tree: &self.tree,
        };
        if let Some(background) = self.background.as_mut() {
            layers::render_background(background, &pass, &mut self.rng);
        }

        // Effects layer
        if let Some(effects) = self.effects.as_mut() {
            layers::render_effects(effects, &self.particles, night, &self.stars, &self.meteors);
        }
        Ok(())
    }

    /// Scene-check timer body: theme, time classification and weather.
    ///
    /// The weather provider is diffed against its previous value, so a pushed
    /// effect stays active until the provider itself changes.
    pub fn on_scene_tick(&mut self, now_ms: u64) {
        if matches!(self.state, LoopState::Inert | LoopState::Stopped) {
            return;
        }
        self.notify_theme_changed();
        self.check_scene(now_ms);

        self.tint = self.weather.tint();
        let effect = self.weather.effect();
        if self.pulled_weather != Some(effect) {
            self.pulled_weather = Some(effect);
            self.apply_weather(effect);
        }
    }

    fn check_scene(&mut self, now_ms: u64) {
        let (segment, season) = classify(&self.time.now());
        if self.tracker.observe_time(segment, season) {
            log::info!(
                "scene changed to {segment} in {season}; starting background transition"
            );
            self.transition = Some(Transition::start(
                now_ms,
                self.config.background.transition_duration_ms,
            ));
        }
    }

    /// Re-read the theme provider; a change clears the palette cache.
    pub fn notify_theme_changed(&mut self) {
        let theme = self.theme.theme();
        if self.tracker.observe_theme(theme) {
            log::debug!("theme changed to {theme}; clearing palette cache");
            self.palettes.clear();
        }
    }

    /// Apply a pushed weather effect, or pull one from the provider when `None`.
    pub fn on_weather_updated(&mut self, effect: Option<WeatherEffect>) {
        if matches!(self.state, LoopState::Inert | LoopState::Stopped) {
            return;
        }
        let effect = match effect {
            Some(effect) => effect,
            None => {
                let pulled = self.weather.effect();
                self.pulled_weather = Some(pulled);
                pulled
            }
        };
        self.tint = self.weather.tint();
        self.apply_weather(effect);
    }

    /// Apply a raw `(type, intensity)` event. Unknown types count as no weather.
    pub fn on_weather_event(&mut self, kind: &str, intensity: f32) {
        let effect = match kind.parse::<EffectKind>() {
            Ok(kind) => WeatherEffect::new(kind, intensity),
            Err(err) => {
                log::debug!("{}; treating as none", SceneError::from(err));
                WeatherEffect::NONE
            }
        };
        self.on_weather_updated(Some(effect));
    }

    /// Logical size of the effects surface, zero when there is none.
    fn effects_bounds(&self) -> Vec2 {
        self.effects.as_ref().map_or(Vec2::ZERO, |s| {
            let (w, h) = s.size();
            Vec2::new(w, h)
        })
    }

    fn apply_weather(&mut self, effect: WeatherEffect) {
        if effect == self.particles.effect() {
            return;
        }
        let bounds = self.effects_bounds();
        let fx = &self.config.effects;
        self.particles.reseed(
            effect,
            fx.max_particles,
            fx.particle_lifetime_ms,
            bounds,
            &mut self.rng,
        );
    }

    /// Night-check timer body: recompute night mode from the wall clock.
    pub fn on_night_tick(&mut self) {
        if matches!(self.state, LoopState::Inert | LoopState::Stopped) {
            return;
        }
        let night = is_night_hour(self.time.now().hour());
        match self.tracker.observe_night(night) {
            Some(NightEdge::Dusk) => {
                let bounds = self.effects_bounds();
                let fx = &self.config.effects;
                self.stars =
                    stars::init_stars(fx.max_stars, bounds, fx.star_twinkle_speed, &mut self.rng);
                log::info!("night mode on; {} stars", self.stars.len());
            }
            Some(NightEdge::Dawn) => {
                self.stars.clear();
                self.meteors.clear();
                log::info!("night mode off");
            }
            None => {}
        }
    }

    /// Current scene and palette, once a scene has been observed.
    ///
    /// `None` after teardown, so the palette cache stays empty.
    pub fn background_info(&mut self) -> Option<BackgroundInfo> {
        if matches!(self.state, LoopState::Inert | LoopState::Stopped) {
            return None;
        }
        let d = self.tracker.descriptor()?;
        Some(BackgroundInfo {
            time_segment: d.time_segment,
            season: d.season,
            theme: d.theme,
            is_night: d.is_night,
            palette: self.palettes.get(d.time_segment, d.theme),
        })
    }

    /// Alpha of the weather tint overlay, scaled by any running transition.
    pub fn overlay_alpha(&self) -> f32 {
        let factor = self.transition.map_or(1.0, |t| t.eased());
        self.config.background.weather_overlay_alpha * factor
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn descriptor(&self) -> Option<SceneDescriptor> {
        self.tracker.descriptor()
    }

    pub fn is_night(&self) -> bool {
        self.tracker.is_night()
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn meteors(&self) -> &[Meteor] {
        &self.meteors
    }

    pub fn palette_cache(&self) -> &PaletteCache {
        &self.palettes
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn tint(&self) -> WeatherTint {
        self.tint
    }

    pub fn background_surface(&self) -> Option<&S> {
        self.background.as_ref()
    }

    pub fn effects_surface(&self) -> Option<&S> {
        self.effects.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}

impl<S: RenderSurface> std::fmt::Debug for SceneEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEngine")
            .field("state", &self.state)
            .field("scene", &self.tracker.descriptor())
            .field("particles", &self.particles.len())
            .field("stars", &self.stars.len())
            .field("meteors", &self.meteors.len())
            .finish_non_exhaustive()
    }
}
