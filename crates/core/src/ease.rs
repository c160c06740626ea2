//! Easing for the outer drift cycle.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in milliseconds (same unit as `performance.now()`).
pub type Millis = f64;

/// Easing curve applied to the raw cycle phase before it reaches the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    InOutQuad,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Raw phase of a repeating cycle: `(now mod period) / period`, in [0, 1).
///
/// A non-positive period yields 0.
pub fn cycle_phase(now: Millis, period: Millis) -> f64 {
    if period <= 0.0 || !now.is_finite() {
        return 0.0;
    }
    now.rem_euclid(period) / period
}

/// Eased phase of a repeating cycle, ready to pass to `GradientField::animate`.
pub fn cycle_progress(now: Millis, period: Millis, ease: Ease) -> f64 {
    ease.apply(cycle_phase(now, period))
}
