//! Playback pacer
//!
//! Decides when enough wall-clock time has passed to decode the next frame.

use std::time::Duration;

use crate::error::{PlayerError, Result};

/// Outcome of feeding elapsed time to the pacer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerTick {
    Tick,
    NoTick,
}

/// Threshold pacer: one tick once the accumulated time exceeds a frame
/// interval, then the accumulator restarts from zero
///
/// There is no catch-up. A caller that stalls for several intervals still
/// gets a single tick.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    accumulator: Duration,
}

impl FramePacer {
    pub fn new(frame_rate: f64) -> Result<Self> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(PlayerError::InvalidFrameRate(frame_rate));
        }

        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / frame_rate),
            accumulator: Duration::ZERO,
        })
    }

    pub fn advance(&mut self, elapsed: Duration) -> PacerTick {
        self.accumulator = self.accumulator.saturating_add(elapsed);

        if self.accumulator > self.interval {
            self.accumulator = Duration::ZERO;
            PacerTick::Tick
        } else {
            PacerTick::NoTick
        }
    }

    /// Time between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated since the last tick
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }
}
