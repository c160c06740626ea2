//! Fixed-rate frame pacing for the animation loop.

use crate::ease::Millis;

/// Gates per-frame work to a target rate.
///
/// The host keeps scheduling ticks at display rate; `ready` only lets one
/// through every `interval` milliseconds.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Millis,
    last_frame: Millis,
    frames: u64,
}

impl FramePacer {
    /// Creates a pacer targeting `fps` frames per second. Non-positive rates
    /// fall back to 30 Hz.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            interval: 1000.0 / fps,
            last_frame: 0.0,
            frames: 0,
        }
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }

    /// Number of frames let through since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Resets the baseline, e.g. when the loop (re)starts.
    pub fn start(&mut self, now: Millis) {
        self.last_frame = now;
    }

    /// Returns true (and records `now`) when a full interval has elapsed
    /// since the last accepted frame.
    pub fn ready(&mut self, now: Millis) -> bool {
        if now - self.last_frame >= self.interval {
            self.last_frame = now;
            self.frames += 1;
            true
        } else {
            false
        }
    }
}
