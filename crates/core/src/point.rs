//! A single blob light source of the mesh gradient.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// One radial-gradient blob.
///
/// `color` always lies on the channel-space segment between `origin_color`
/// and `target_color`. `radius` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobPoint {
    pub(crate) position: DVec2,
    pub(crate) radius: f64,
    pub(crate) color: Rgb,
    pub(crate) origin_color: Rgb,
    pub(crate) target_color: Rgb,
}

impl BlobPoint {
    pub(crate) fn new(position: DVec2, radius: f64, color: Rgb) -> Self {
        Self {
            position,
            radius,
            color,
            origin_color: color,
            target_color: color,
        }
    }

    /// Center in surface coordinates.
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Gradient radius in pixels.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Current (possibly mid-transition) color.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Color snapshot taken when the current transition started.
    pub fn origin_color(&self) -> Rgb {
        self.origin_color
    }

    /// Color the current transition ends on.
    pub fn target_color(&self) -> Rgb {
        self.target_color
    }

    /// Starts a new blend from the live color toward `target`.
    pub(crate) fn retarget(&mut self, target: Rgb) {
        self.origin_color = self.color;
        self.target_color = target;
    }

    pub(crate) fn blend(&mut self, fraction: f64) {
        self.color = self.origin_color.lerp(self.target_color, fraction);
    }

    /// Moves by `delta` and clamps into `[0, bounds.x] x [0, bounds.y]`.
    pub(crate) fn drift(&mut self, delta: DVec2, bounds: DVec2) {
        self.position = (self.position + delta).clamp(DVec2::ZERO, bounds);
    }
}
