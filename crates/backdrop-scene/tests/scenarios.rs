//! End-to-end engine scenarios driven by a controllable clock.

use std::cell::Cell;
use std::rc::Rc;

use backdrop_core::{EffectKind, Season, Theme, TimeSegment, WeatherEffect};
use backdrop_scene::animations::weather::ParticleKind;
use backdrop_scene::{
    Canvas, EngineConfig, LoopState, RenderSurface, SceneEngine, SceneError, SceneRng,
    resolve_palette,
};
use chrono::{NaiveDate, NaiveDateTime};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Coarse frame step; the engine clamps longer gaps to this anyway.
const STEP_MS: u64 = 250;

fn small_canvas() -> Canvas {
    Canvas::new(64.0, 48.0, 0.5).with_samples(1)
}

struct Harness {
    clock: Rc<Cell<NaiveDateTime>>,
    theme: Rc<Cell<Theme>>,
    weather: Rc<Cell<WeatherEffect>>,
    engine: SceneEngine<Canvas>,
}

impl Harness {
    fn with_config(config: EngineConfig, now: NaiveDateTime) -> Self {
        let clock = Rc::new(Cell::new(now));
        let theme = Rc::new(Cell::new(Theme::Light));
        let weather = Rc::new(Cell::new(WeatherEffect::NONE));
        let engine = SceneEngine::new(
            config,
            Rc::clone(&clock),
            Rc::clone(&theme),
            Rc::clone(&weather),
        )
        .with_rng(SceneRng::from_seed_u64(2024));
        Self {
            clock,
            theme,
            weather,
            engine,
        }
    }

    fn started(now: NaiveDateTime) -> Self {
        let mut harness = Self::with_config(EngineConfig::default(), now);
        harness
            .engine
            .init(Some(small_canvas()), Some(small_canvas()), 0)
            .unwrap();
        harness
    }

    /// Advance in coarse steps up to and including `until_ms`.
    fn run_until(&mut self, from_ms: u64, until_ms: u64) {
        let mut now = from_ms;
        while now < until_ms {
            now = (now + STEP_MS).min(until_ms);
            assert!(self.engine.advance(now));
        }
    }
}

#[test]
fn snow_at_half_intensity_seeds_fifty_particles() {
    let mut h = Harness::started(at(12, 0));
    h.engine.on_weather_event("snow", 0.5);

    let particles = h.engine.particles();
    assert_eq!(particles.len(), 50);
    assert!(particles.iter().all(|p| p.kind() == ParticleKind::Snow));
}

#[test]
fn unknown_weather_type_empties_the_pool() {
    let mut h = Harness::started(at(12, 0));
    h.engine.on_weather_event("rain", 0.8);
    assert_eq!(h.engine.particles().len(), 80);

    h.engine.on_weather_event("hail", 0.9);
    assert!(h.engine.particles().is_empty());

    // Types without a particle renderer also leave it empty.
    h.engine.on_weather_event("lightning", 0.9);
    assert!(h.engine.particles().is_empty());
}

#[test]
fn night_edges_create_and_drop_stars() {
    let mut h = Harness::started(at(21, 59));
    assert!(!h.engine.is_night());
    assert!(h.engine.stars().is_empty());

    h.clock.set(at(22, 0));
    h.run_until(0, 60_000);
    assert!(h.engine.is_night());
    assert_eq!(h.engine.stars().len(), EngineConfig::default().effects.max_stars);

    h.clock.set(at(6, 0));
    h.run_until(60_000, 120_000);
    assert!(!h.engine.is_night());
    assert!(h.engine.stars().is_empty());
    assert!(h.engine.meteors().is_empty());
}

#[test]
fn starting_at_night_shows_stars_immediately() {
    let h = Harness::started(at(23, 30));
    assert!(h.engine.is_night());
    assert_eq!(h.engine.stars().len(), 80);
}

#[test]
fn night_to_early_morning_runs_a_transition() {
    let mut h = Harness::started(at(23, 0));
    let baseline = EngineConfig::default().background.weather_overlay_alpha;
    assert_eq!(
        h.engine.descriptor().map(|d| d.time_segment),
        Some(TimeSegment::Night)
    );

    // Let the startup fade finish.
    h.run_until(0, 5_000);
    assert!(h.engine.transition().is_none());
    assert_eq!(h.engine.overlay_alpha(), baseline);

    h.clock.set(at(6, 30));
    h.run_until(5_000, 6_000);
    let descriptor = h.engine.descriptor().unwrap();
    assert_eq!(descriptor.time_segment, TimeSegment::EarlyMorning);
    assert_eq!(descriptor.season, Season::Winter);
    assert!(h.engine.transition().is_some());
    assert!(h.engine.overlay_alpha() < baseline);

    let info = h.engine.background_info().unwrap();
    assert_eq!(
        info.palette,
        resolve_palette(TimeSegment::EarlyMorning, Theme::Light)
    );

    // Progress only moves forward while the fade runs.
    let mut last = 0.0;
    let mut now = 6_000;
    while let Some(transition) = h.engine.transition() {
        assert!(transition.progress() >= last);
        last = transition.progress();
        now += 16;
        h.engine.advance(now);
        assert!(now < 10_000, "transition never finished");
    }
    assert_eq!(h.engine.overlay_alpha(), baseline);
}

#[test]
fn palette_cache_hits_and_theme_eviction() {
    let mut h = Harness::started(at(12, 0));
    h.run_until(0, 500);
    assert_eq!(h.engine.palette_cache().len(), 1);
    assert_eq!(h.engine.palette_cache().misses(), 1);

    h.theme.set(Theme::Dark);
    h.engine.notify_theme_changed();
    assert!(h.engine.palette_cache().is_empty());

    h.run_until(500, 700);
    assert_eq!(h.engine.palette_cache().len(), 1);
    assert_eq!(h.engine.palette_cache().misses(), 2);
    assert_eq!(h.engine.background_info().unwrap().theme, Theme::Dark);
}

#[test]
fn theme_change_is_picked_up_by_scene_check() {
    let mut h = Harness::started(at(12, 0));
    h.theme.set(Theme::Dark);
    h.run_until(0, 1_000);
    assert_eq!(h.engine.descriptor().unwrap().theme, Theme::Dark);
}

#[test]
fn pushed_weather_survives_until_provider_changes() {
    let mut h = Harness::started(at(12, 0));
    h.engine
        .on_weather_updated(Some(WeatherEffect::new(EffectKind::Rain, 0.8)));
    h.run_until(0, 3_000);
    assert_eq!(h.engine.particles().effect().kind, EffectKind::Rain);
    assert_eq!(h.engine.particles().len(), 80);

    h.weather.set(WeatherEffect::new(EffectKind::Snow, 0.6));
    h.run_until(3_000, 4_000);
    assert_eq!(h.engine.particles().effect().kind, EffectKind::Snow);
    assert_eq!(h.engine.particles().len(), 60);
}

#[test]
fn particle_life_stays_in_range_through_the_loop() {
    let mut h = Harness::started(at(12, 0));
    h.engine.on_weather_event("fog", 1.0);
    let mut now = 0;
    for _ in 0..800 {
        now += 16;
        h.engine.advance(now);
        for p in h.engine.particles().iter() {
            assert!(p.life >= 0.0 && p.life <= p.max_life);
            assert_eq!(p.kind(), ParticleKind::Fog);
        }
    }
    assert_eq!(h.engine.particles().len(), 100);
}

#[test]
fn meteors_respect_cap_and_trail_length() {
    let mut config = EngineConfig::default();
    config.effects.meteor_frequency = 1.0;
    let mut h = Harness::with_config(config, at(0, 30));
    h.engine
        .init(Some(small_canvas()), Some(small_canvas()), 0)
        .unwrap();

    let mut now = 0;
    for _ in 0..300 {
        now += 16;
        h.engine.advance(now);
        assert!(h.engine.meteors().len() <= 3);
        for meteor in h.engine.meteors() {
            assert!(meteor.trail_len() <= 15);
            assert!(meteor.progress < 1.0);
        }
    }
    assert!(!h.engine.meteors().is_empty());
}

#[test]
fn frames_paint_both_layers() {
    let mut h = Harness::started(at(23, 0));
    assert!(h.engine.advance(16));
    assert!(h.engine.advance(32));
    let background = h.engine.background_surface().unwrap();
    assert!(background.pixels().iter().all(|p| p.a > 0.99));
    let effects = h.engine.effects_surface().unwrap();
    assert!(effects.pixels().iter().any(|p| p.a > 0.0));
    assert_eq!(h.engine.frames_rendered(), 2);
}

#[test]
fn bad_frames_are_skipped_without_stopping() {
    let mut h = Harness::started(at(12, 0));
    h.engine.resize(0.0, 0.0, 1.0);
    assert!(h.engine.advance(16));
    assert!(h.engine.advance(32));
    assert_eq!(h.engine.frames_skipped(), 2);
    assert_eq!(h.engine.state(), LoopState::Running);

    h.engine.resize(64.0, 48.0, 0.5);
    assert!(h.engine.advance(48));
    assert_eq!(h.engine.frames_rendered(), 1);
    assert_eq!(
        h.engine.background_surface().unwrap().pixel_size(),
        (32, 24)
    );
}

#[test]
fn missing_surface_leaves_engine_inert() {
    let mut h = Harness::with_config(EngineConfig::default(), at(12, 0));
    let err = h.engine.init(None, None, 0).unwrap_err();
    assert_eq!(err, SceneError::MissingSurface);
    assert_eq!(h.engine.state(), LoopState::Inert);

    assert!(!h.engine.advance(16));
    h.engine.on_weather_event("rain", 1.0);
    assert!(h.engine.particles().is_empty());
    assert!(h.engine.background_info().is_none());
}

#[test]
fn destroy_twice_is_harmless() {
    let mut h = Harness::started(at(23, 0));
    h.engine.on_weather_event("rain", 1.0);
    h.run_until(0, 100);

    h.engine.destroy();
    h.engine.destroy();
    assert_eq!(h.engine.state(), LoopState::Stopped);
    assert!(!h.engine.advance(200));
    assert!(h.engine.particles().is_empty());
    assert!(h.engine.stars().is_empty());
    assert!(h.engine.meteors().is_empty());
    assert!(h.engine.palette_cache().is_empty());

    assert!(h.engine.background_info().is_none());
    assert!(h.engine.palette_cache().is_empty());
}

#[test]
fn destroy_before_init_is_harmless() {
    let mut h = Harness::with_config(EngineConfig::default(), at(12, 0));
    h.engine.destroy();
    assert_eq!(h.engine.state(), LoopState::Stopped);
    assert_eq!(
        h.engine.init(Some(small_canvas()), Some(small_canvas()), 0),
        Err(SceneError::Stopped)
    );
    assert_eq!(h.engine.state(), LoopState::Stopped);
    assert!(!h.engine.advance(16));
}

#[test]
fn init_reports_why_it_cannot_start() {
    let mut h = Harness::with_config(EngineConfig::default(), at(12, 0));
    assert_eq!(
        h.engine.init(None, Some(small_canvas()), 0),
        Err(SceneError::MissingSurface)
    );
    assert_eq!(
        h.engine.init(Some(small_canvas()), None, 0),
        Err(SceneError::MissingSurface)
    );
    assert_eq!(h.engine.state(), LoopState::Inert);

    let mut running = Harness::started(at(12, 0));
    assert_eq!(
        running.engine.init(Some(small_canvas()), None, 0),
        Ok(())
    );
    assert_eq!(running.engine.state(), LoopState::Running);
}

#[test]
fn background_info_serializes_camel_case() {
    let mut h = Harness::started(at(1, 0));
    let info = h.engine.background_info().unwrap();
    let json = serde_json::to_value(info).unwrap();
    assert_eq!(json["timeSegment"], "night");
    assert_eq!(json["season"], "winter");
    assert_eq!(json["theme"], "light");
    assert_eq!(json["isNight"], true);
    assert!(json["palette"]["start"].is_object());
}
