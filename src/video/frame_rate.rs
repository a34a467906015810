//! Frame rate derivation
//!
//! Turns a stream's declared average frame rate into frames per second.

use tracing::warn;

use crate::config::FrameRateMode;

/// Derive frames per second from an average frame rate rational
///
/// A zero component means the container did not declare a rate; a
/// non-positive result cannot drive the pacer. Both fall back to `default`.
pub fn derive_frame_rate(rational: (i32, i32), mode: FrameRateMode, default: f64) -> f64 {
    let (num, den) = rational;

    if num == 0 || den == 0 {
        warn!(
            "Unable to retrieve video frame rate, using {} fps",
            default
        );
        return default;
    }

    let fps = match mode {
        FrameRateMode::Truncate => (num / den) as f64,
        FrameRateMode::Nearest => (num as f64 / den as f64).round(),
    };

    if fps <= 0.0 {
        warn!(
            "Declared frame rate {}/{} yields {} fps, using {} fps",
            num, den, fps, default
        );
        return default;
    }

    fps
}
