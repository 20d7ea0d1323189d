//! Collaborator interfaces the engine reads scene inputs from.
//!
//! Providers are pulled by the engine on its own schedule. Hosts that want
//! to push changes share a `Cell` behind an `Rc` and update it in place.

use std::cell::Cell;
use std::rc::Rc;

use backdrop_core::{Theme, WeatherEffect, WeatherTint};
use chrono::{Local, NaiveDateTime};

/// Wall-clock source.
pub trait TimeProvider {
    fn now(&self) -> NaiveDateTime;
}

/// Active theme source.
pub trait ThemeProvider {
    fn theme(&self) -> Theme;
}

/// Current weather effect and background tint.
pub trait WeatherEffectProvider {
    fn effect(&self) -> WeatherEffect;

    fn tint(&self) -> WeatherTint {
        WeatherTint::NEUTRAL
    }
}

/// Local time from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl TimeProvider for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl TimeProvider for NaiveDateTime {
    fn now(&self) -> NaiveDateTime {
        *self
    }
}

impl TimeProvider for Cell<NaiveDateTime> {
    fn now(&self) -> NaiveDateTime {
        self.get()
    }
}

impl ThemeProvider for Theme {
    fn theme(&self) -> Theme {
        *self
    }
}

impl ThemeProvider for Cell<Theme> {
    fn theme(&self) -> Theme {
        self.get()
    }
}

impl WeatherEffectProvider for WeatherEffect {
    fn effect(&self) -> WeatherEffect {
        *self
    }
}

impl WeatherEffectProvider for Cell<WeatherEffect> {
    fn effect(&self) -> WeatherEffect {
        self.get()
    }
}

impl<P: TimeProvider + ?Sized> TimeProvider for Rc<P> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

impl<P: ThemeProvider + ?Sized> ThemeProvider for Rc<P> {
    fn theme(&self) -> Theme {
        (**self).theme()
    }
}

impl<P: WeatherEffectProvider + ?Sized> WeatherEffectProvider for Rc<P> {
    fn effect(&self) -> WeatherEffect {
        (**self).effect()
    }

    fn tint(&self) -> WeatherTint {
        (**self).tint()
    }
}
