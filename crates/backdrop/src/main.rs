use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use backdrop_config::Config;
use backdrop_core::{Rgb, Theme};
use backdrop_scene::{
    BackgroundInfo, Canvas, EngineConfig, LocalClock, SceneEngine, SceneView, surface_geometry,
};
use color_eyre::eyre::{bail, eyre};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
};

use crate::providers::HostWeather;

mod logging;
mod providers;

const USAGE: &str = "\
Usage: backdrop [OPTIONS]

Options:
  -c, --config <PATH>  Read settings from PATH instead of the default location
      --info           Print the current background as JSON and exit
      --print-config   Print the effective configuration as TOML and exit
  -h, --help           Show this help";

/// Terminal size assumed when rendering without a terminal.
const HEADLESS_AREA: Rect = Rect::new(0, 0, 80, 24);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    logging::init();
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }
    if args.info {
        let info = background_info(&config)?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// Command line options.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    info: bool,
    print_config: bool,
    help: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> color_eyre::Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| eyre!("{arg} needs a path\n\n{USAGE}"))?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--info" => parsed.info = true,
                "--print-config" => parsed.print_config = true,
                "-h" | "--help" => parsed.help = true,
                other => bail!("unknown argument '{other}'\n\n{USAGE}"),
            }
        }
        Ok(parsed)
    }
}

fn engine_config(config: &Config) -> EngineConfig {
    EngineConfig {
        effects: config.effects.clone(),
        background: config.background.clone(),
        tree: config.tree.clone(),
    }
}

fn new_canvas(config: &Config, area: Rect) -> Canvas {
    let (width, height, dpr) = surface_geometry(area, config.display.pixel_scale);
    Canvas::new(width, height, dpr).with_samples(config.display.samples)
}

/// Resolve the scene once, without a terminal.
fn background_info(config: &Config) -> color_eyre::Result<BackgroundInfo> {
    let weather = HostWeather::new(config.weather);
    let mut engine = SceneEngine::new(
        engine_config(config),
        LocalClock,
        config.display.theme,
        weather,
    );
    engine.init(Some(new_canvas(config, HEADLESS_AREA)), None, 0)?;
    let info = engine
        .background_info()
        .ok_or_else(|| eyre!("scene was not resolved"))?;
    engine.destroy();
    Ok(info)
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Theme shared with the engine.
    theme: Rc<Cell<Theme>>,
    /// Weather shared with the engine.
    weather: Rc<HostWeather>,
    engine: SceneEngine<Canvas>,
    /// Terminal area the surfaces are sized for.
    area: Rect,
    started: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        let theme = Rc::new(Cell::new(config.display.theme));
        let weather = Rc::new(HostWeather::new(config.weather));
        let engine = SceneEngine::new(
            engine_config(&config),
            LocalClock,
            Rc::clone(&theme),
            Rc::clone(&weather),
        );
        Self {
            running: false,
            config,
            theme,
            weather,
            engine,
            area: Rect::default(),
            started: Instant::now(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        self.area = Rect::new(0, 0, size.width, size.height);
        let background = new_canvas(&self.config, self.area);
        let effects = new_canvas(&self.config, self.area);
        self.engine.init(Some(background), Some(effects), 0)?;
        log::info!("scene started at {}x{} cells", self.area.width, self.area.height);

        self.running = true;
        while self.running {
            self.engine.advance(self.elapsed_ms());
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        self.engine.destroy();
        log::info!(
            "scene stopped after {} frames ({} skipped)",
            self.engine.frames_rendered(),
            self.engine.frames_skipped()
        );
        Ok(())
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if let Some(background) = self.engine.background_surface() {
            let backdrop = match self.theme.get() {
                Theme::Light => Rgb::WHITE,
                Theme::Dark => Rgb::BLACK,
            };
            let view = SceneView::new(background)
                .effects(self.engine.effects_surface())
                .backdrop(backdrop);
            frame.render_widget(view, area);
        }

        let [_, status] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        frame.render_widget(self.status_line(), status);
    }

    /// Scene summary plus key hints.
    fn status_line(&self) -> Line<'static> {
        let scene = self
            .engine
            .descriptor()
            .map(|d| format!("{} / {}", d.time_segment, d.season))
            .unwrap_or_default();
        let weather = self
            .weather
            .condition()
            .map_or("clear", |c| c.as_str());
        Line::from(vec![
            format!("{scene} / {weather}  ").white(),
            "q".bold(),
            " quit  ".dark_gray(),
            "t".bold(),
            " theme  ".dark_gray(),
            "w".bold(),
            " weather  ".dark_gray(),
            "n".bold(),
            " clear".dark_gray(),
        ])
        .centered()
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the frame interval as timeout so the scene keeps animating.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        let timeout = Duration::from_millis(self.config.display.frame_ms.max(1));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(width, height) => self.resize(Rect::new(0, 0, width, height)),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('t')) => self.toggle_theme(),
            (_, KeyCode::Char('w')) => self.cycle_weather(),
            (_, KeyCode::Char('n')) => self.clear_weather(),
            _ => {}
        }
    }

    fn resize(&mut self, area: Rect) {
        if area == self.area {
            return;
        }
        self.area = area;
        let (width, height, dpr) = surface_geometry(area, self.config.display.pixel_scale);
        self.engine.resize(width, height, dpr);
    }

    /// Switch between the light and dark palettes.
    fn toggle_theme(&mut self) {
        self.theme.set(self.theme.get().toggle());
        self.engine.notify_theme_changed();
    }

    fn cycle_weather(&mut self) {
        self.weather.cycle();
        self.engine.on_weather_updated(None);
    }

    fn clear_weather(&mut self) {
        self.weather.set_condition(None);
        self.engine.on_weather_updated(None);
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
