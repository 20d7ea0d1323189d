//! Background color transitions.

/// Cubic ease-in-out. Maps `0 -> 0` and `1 -> 1`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// A bounded sub-animation started on a scene change.
///
/// Progress never decreases and clamps at exactly `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    started_ms: u64,
    duration_ms: u64,
    progress: f32,
}

impl Transition {
    pub fn start(now_ms: u64, duration_ms: u64) -> Self {
        let mut transition = Self {
            started_ms: now_ms,
            duration_ms,
            progress: 0.0,
        };
        transition.update(now_ms);
        transition
    }

    /// Recompute progress at `now_ms` and return it.
    pub fn update(&mut self, now_ms: u64) -> f32 {
        let target = if self.duration_ms == 0 {
            1.0
        } else {
            let elapsed = now_ms.saturating_sub(self.started_ms);
            (elapsed as f64 / self.duration_ms as f64).min(1.0) as f32
        };
        self.progress = self.progress.max(target);
        self.progress
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Eased progress, used as the overlay alpha multiplier.
    pub fn eased(&self) -> f32 {
        ease_in_out_cubic(self.progress)
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}
