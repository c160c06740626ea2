//! The mesh-gradient field: a fixed set of blurred radial blobs.
//!
//! A [`GradientField`] owns its blob points and two mutually exclusive
//! per-frame behaviors:
//!
//! - **Transition**: after [`GradientField::update_colors`], each blob blends
//!   linearly from the color it had at that moment toward its new target over
//!   `transition_ms` (500 ms by default).
//! - **Drift**: otherwise, every blob moves along a bounded closed path keyed
//!   to the caller's outer cycle progress.
//!
//! Time is passed in explicitly as monotonic milliseconds, so the field never
//! reads a clock of its own.

use glam::DVec2;
use std::f64::consts::{PI, TAU};
use tracing::{debug, trace};

use crate::color::Rgb;
use crate::config::MeshConfig;
use crate::ease::Millis;
use crate::error::MeshError;
use crate::palette::Palette;
use crate::point::BlobPoint;
use crate::prng::RandomSource;
use crate::surface::{RadialBlob, Surface};

/// Per-field tunables that are not part of the construction contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOptions {
    pub blur_amount: f64,
    pub transition_ms: Millis,
    pub drift_factor: f64,
    pub radius_min: f64,
    pub radius_max: f64,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            blur_amount: 80.0,
            transition_ms: 500.0,
            drift_factor: 0.05,
            radius_min: 0.1,
            radius_max: 0.3,
        }
    }
}

impl From<&MeshConfig> for FieldOptions {
    fn from(config: &MeshConfig) -> Self {
        Self {
            blur_amount: config.blur_amount,
            transition_ms: config.transition_ms,
            drift_factor: config.drift_factor,
            radius_min: config.radius_min,
            radius_max: config.radius_max,
        }
    }
}

impl FieldOptions {
    fn validate(&self) -> Result<(), MeshError> {
        if !(self.transition_ms.is_finite() && self.transition_ms > 0.0) {
            return Err(MeshError::InvalidConfiguration(format!(
                "transition duration must be positive, got {}",
                self.transition_ms
            )));
        }
        if !(0.0..=self.radius_max).contains(&self.radius_min) {
            return Err(MeshError::InvalidConfiguration(format!(
                "radius range [{}, {}] is empty or negative",
                self.radius_min, self.radius_max
            )));
        }
        if !(self.blur_amount >= 0.0 && self.drift_factor >= 0.0) {
            return Err(MeshError::InvalidConfiguration(
                "blur amount and drift factor must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// A mesh gradient over a `width` x `height` surface.
#[derive(Debug, Clone)]
pub struct GradientField {
    width: f64,
    height: f64,
    points: Vec<BlobPoint>,
    base_palette: Palette,
    target_palette: Palette,
    transition_started: Option<Millis>,
    options: FieldOptions,
}

impl GradientField {
    /// Creates `point_count` blobs at uniformly random positions with
    /// radius `max(width, height) * uniform(0.1, 0.3)`, colored round-robin
    /// from `colors` (the greyscale palette when `colors` is empty).
    ///
    /// Returns `MeshError::InvalidConfiguration` if `point_count` is 0 or
    /// either dimension is not a positive finite number.
    pub fn initialize<R: RandomSource + ?Sized>(
        point_count: usize,
        colors: &[Rgb],
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Result<Self, MeshError> {
        Self::with_options(
            point_count,
            colors,
            width,
            height,
            FieldOptions::default(),
            rng,
        )
    }

    /// Like [`GradientField::initialize`] with explicit options.
    pub fn with_options<R: RandomSource + ?Sized>(
        point_count: usize,
        colors: &[Rgb],
        width: f64,
        height: f64,
        options: FieldOptions,
        rng: &mut R,
    ) -> Result<Self, MeshError> {
        if point_count < 1 {
            return Err(MeshError::InvalidConfiguration(
                "point count must be at least 1".into(),
            ));
        }
        check_dimensions(width, height)?;
        options.validate()?;

        let base_palette = if colors.is_empty() {
            Palette::greyscale()
        } else {
            Palette::new(colors.to_vec())?
        };

        let mut field = Self {
            width,
            height,
            points: Vec::with_capacity(point_count),
            target_palette: base_palette.clone(),
            base_palette,
            transition_started: None,
            options,
        };
        field.points = (0..point_count)
            .map(|i| field.random_point(field.base_palette.color_for(i), rng))
            .collect();
        debug!(point_count, width, height, "gradient field initialized");
        Ok(field)
    }

    /// Builds a field from a [`MeshConfig`]: point count, options and initial colors.
    pub fn from_config<R: RandomSource + ?Sized>(
        config: &MeshConfig,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Result<Self, MeshError> {
        Self::with_options(
            config.point_count,
            config.initial_colors.colors(),
            width,
            height,
            FieldOptions::from(config),
            rng,
        )
    }

    fn random_point<R: RandomSource + ?Sized>(&self, color: Rgb, rng: &mut R) -> BlobPoint {
        let x = rng.next_f64() * self.width;
        let y = rng.next_f64() * self.height;
        let radius = self.width.max(self.height)
            * rng.next_range(self.options.radius_min, self.options.radius_max);
        BlobPoint::new(DVec2::new(x, y), radius, color)
    }

    /// Field width in surface pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Field height in surface pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Blob points in paint order.
    pub fn points(&self) -> &[BlobPoint] {
        &self.points
    }

    /// Tunables the field was built with.
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Palette the field last settled on.
    pub fn base_palette(&self) -> &Palette {
        &self.base_palette
    }

    /// Expanded palette of the current (or last) transition.
    pub fn target_palette(&self) -> &Palette {
        &self.target_palette
    }

    /// Whether a palette transition is in progress.
    pub fn is_transitioning(&self) -> bool {
        self.transition_started.is_some()
    }

    /// Interpolation fraction of the active transition at `now`, or `None`
    /// when no transition is running.
    pub fn transition_fraction(&self, now: Millis) -> Option<f64> {
        self.transition_started.map(|started| {
            ((now - started) / self.options.transition_ms).clamp(0.0, 1.0)
        })
    }

    /// Retargets every blob toward `palette`, cycling it over the points.
    ///
    /// Each blob's origin is snapshotted from its live color, so a call that
    /// lands mid-transition continues smoothly from where the blob is now.
    /// An empty palette is ignored and leaves the transition clock untouched.
    pub fn update_colors(&mut self, palette: &[Rgb], now: Millis) {
        if palette.is_empty() {
            trace!("empty palette ignored");
            return;
        }
        let Ok(palette) = Palette::new(palette.to_vec()) else {
            return;
        };
        let expanded = palette.expanded(self.points.len());
        for (i, point) in self.points.iter_mut().enumerate() {
            point.retarget(expanded.color_for(i));
        }
        self.target_palette = expanded;
        self.transition_started = Some(now);
        debug!(colors = palette.len(), now, "color transition started");
    }

    /// Advances one frame.
    ///
    /// `progress` is the eased phase in [0, 1] of the caller's outer cycle.
    /// During a transition only colors change; otherwise only positions do.
    pub fn animate(&mut self, progress: f64, now: Millis) {
        match self.transition_fraction(now) {
            Some(fraction) => self.step_transition(fraction),
            None => self.step_drift(progress),
        }
    }

    fn step_transition(&mut self, fraction: f64) {
        for point in &mut self.points {
            point.blend(fraction);
        }
        if fraction >= 1.0 {
            self.transition_started = None;
            self.base_palette = self.target_palette.clone();
            for point in &mut self.points {
                point.origin_color = point.color;
            }
            debug!("color transition finished");
        }
    }

    /// Displacement applied to every blob for a given cycle progress.
    ///
    /// Angle `sin(2πp)·2π`, magnitude `sin(πp)·min(w, h)·drift_factor`.
    pub fn drift_vector(&self, progress: f64) -> DVec2 {
        let progress = if progress.is_finite() { progress } else { 0.0 };
        let max_move = self.width.min(self.height) * self.options.drift_factor;
        let angle = (progress * TAU).sin() * TAU;
        let magnitude = (progress * PI).sin() * max_move;
        DVec2::new(angle.cos(), angle.sin()) * magnitude
    }

    fn step_drift(&mut self, progress: f64) {
        let delta = self.drift_vector(progress);
        let bounds = DVec2::new(self.width, self.height);
        for point in &mut self.points {
            point.drift(delta, bounds);
        }
    }

    /// Paints every blob onto `surface` in insertion order after clearing it.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        for point in &self.points {
            surface.fill_blob(&RadialBlob {
                center: point.position,
                radius: point.radius,
                color: point.color,
                glow: self.options.blur_amount,
            });
        }
    }

    /// Changes the surface bounds and clamps every blob back inside them.
    ///
    /// Radii are left unchanged.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), MeshError> {
        check_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        let bounds = DVec2::new(width, height);
        for point in &mut self.points {
            point.drift(DVec2::ZERO, bounds);
        }
        Ok(())
    }

    /// Re-randomizes positions and radii, keeping every blob's colors.
    pub fn reseed<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let mut points = std::mem::take(&mut self.points);
        for point in &mut points {
            let fresh = self.random_point(point.color, rng);
            point.position = fresh.position;
            point.radius = fresh.radius;
        }
        self.points = points;
    }
}

fn check_dimensions(width: f64, height: f64) -> Result<(), MeshError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(MeshError::InvalidConfiguration(format!(
            "surface dimensions must be positive, got {width}x{height}"
        )))
    }
}
