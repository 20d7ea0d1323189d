//! Procedural scene elements: weather particles, stars, meteors and the tree.

pub mod meteors;
pub mod stars;
pub mod tree;
pub mod weather;

/// Nominal frame budget in milliseconds (60 Hz).
pub const FRAME_MS: f32 = 16.0;

/// Longest frame delta honored; anything longer is treated as this.
pub const MAX_FRAME_DELTA_MS: f32 = 250.0;

/// Timing for one update step.
///
/// `frames` is the elapsed time expressed in nominal frames, so per-frame
/// rates (px/frame, phase/frame) stay correct at any refresh rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    pub delta_ms: f32,
    pub frames: f32,
}

impl FrameStep {
    /// Exactly one nominal frame.
    pub const NOMINAL: FrameStep = FrameStep {
        delta_ms: FRAME_MS,
        frames: 1.0,
    };

    pub fn from_delta_ms(delta_ms: f32) -> Self {
        let delta_ms = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, MAX_FRAME_DELTA_MS)
        } else {
            0.0
        };
        Self {
            delta_ms,
            frames: delta_ms / FRAME_MS,
        }
    }
}
