//! Tunables for the gradient field and the orchestrator.
//!
//! Every field has a default matching the original backdrop page, and the
//! whole struct deserializes from JSON with missing keys filled in.

use serde::{Deserialize, Serialize};

use crate::ease::{Ease, Millis};
use crate::error::MeshError;
use crate::layers::Track;
use crate::palette::Palette;

/// Full configuration for a mesh-gradient backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Number of blob points. Fixed for the lifetime of a field.
    pub point_count: usize,
    /// Glow (shadow blur) radius in pixels.
    pub blur_amount: f64,
    /// Target frame rate of the animation loop.
    pub fps: f64,
    /// Length of the outer drift cycle.
    pub cycle_ms: Millis,
    /// Easing applied to the outer cycle phase.
    pub cycle_ease: Ease,
    /// Duration of one color transition.
    pub transition_ms: Millis,
    /// Maximum drift per frame as a fraction of `min(width, height)`.
    pub drift_factor: f64,
    /// Blob radius range as fractions of `max(width, height)`.
    pub radius_min: f64,
    pub radius_max: f64,
    /// Colors the field starts with.
    pub initial_colors: Palette,
    /// Substituted whenever palette extraction fails or times out.
    pub fallback_palette: Palette,
    /// Number of colors requested from the palette extractor.
    pub palette_size: usize,
    pub palette_timeout_ms: Millis,
    pub rotation_interval_ms: Millis,
    pub auto_zoom_interval_ms: Millis,
    pub initial_zoom_delay_ms: Millis,
    pub zoom_step_ms: Millis,
    pub layer_retire_delay_ms: Millis,
    /// Suppresses the continuous frame loop.
    pub reduced_motion: bool,
    /// PRNG seed for blob placement and track picks; 0 selects a fixed fallback.
    pub seed: u64,
    /// Key that starts a zoom cycle (compared case-insensitively).
    pub zoom_key: String,
    /// Tracks rotated through by the orchestrator.
    pub tracks: Vec<Track>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            point_count: 7,
            blur_amount: 80.0,
            fps: 30.0,
            cycle_ms: 20_000.0,
            cycle_ease: Ease::InOutQuad,
            transition_ms: 500.0,
            drift_factor: 0.05,
            radius_min: 0.1,
            radius_max: 0.3,
            initial_colors: Palette::greyscale(),
            fallback_palette: Palette::greyscale(),
            palette_size: 7,
            palette_timeout_ms: 10_000.0,
            rotation_interval_ms: 60_000.0,
            auto_zoom_interval_ms: 120_000.0,
            initial_zoom_delay_ms: 2_000.0,
            zoom_step_ms: 12_000.0,
            layer_retire_delay_ms: 1_000.0,
            reduced_motion: false,
            seed: 0,
            zoom_key: "a".to_string(),
            tracks: Track::samples(),
        }
    }
}

impl MeshConfig {
    /// Parses a config from JSON, filling missing keys with defaults, then validates it.
    pub fn from_json(json: &str) -> Result<Self, MeshError> {
        let config: MeshConfig = serde_json::from_str(json)
            .map_err(|e| MeshError::InvalidConfiguration(format!("config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the field or orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), MeshError> {
        let invalid = |msg: String| Err(MeshError::InvalidConfiguration(msg));
        if self.point_count < 1 {
            return invalid("point_count must be at least 1".into());
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return invalid(format!("fps must be positive, got {}", self.fps));
        }
        if !(self.blur_amount.is_finite() && self.blur_amount >= 0.0) {
            return invalid(format!("blur_amount must be >= 0, got {}", self.blur_amount));
        }
        if !(self.drift_factor.is_finite() && self.drift_factor >= 0.0) {
            return invalid(format!("drift_factor must be >= 0, got {}", self.drift_factor));
        }
        if !(0.0..=self.radius_max).contains(&self.radius_min) {
            return invalid(format!(
                "radius range [{}, {}] is empty or negative",
                self.radius_min, self.radius_max
            ));
        }
        if self.palette_size < 1 {
            return invalid("palette_size must be at least 1".into());
        }
        if self.zoom_key.trim().is_empty() {
            return invalid("zoom_key must not be empty".into());
        }
        let durations = [
            ("cycle_ms", self.cycle_ms),
            ("transition_ms", self.transition_ms),
            ("palette_timeout_ms", self.palette_timeout_ms),
            ("rotation_interval_ms", self.rotation_interval_ms),
            ("auto_zoom_interval_ms", self.auto_zoom_interval_ms),
            ("zoom_step_ms", self.zoom_step_ms),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }
        for (name, value) in [
            ("initial_zoom_delay_ms", self.initial_zoom_delay_ms),
            ("layer_retire_delay_ms", self.layer_retire_delay_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{name} must be >= 0, got {value}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backdrop_page() {
        let c = MeshConfig::default();
        assert_eq!(c.point_count, 7);
        assert_eq!(c.blur_amount, 80.0);
        assert_eq!(c.fps, 30.0);
        assert_eq!(c.cycle_ms, 20_000.0);
        assert_eq!(c.transition_ms, 500.0);
        assert_eq!(c.zoom_step_ms, 12_000.0);
        assert_eq!(c.layer_retire_delay_ms, 1_000.0);
        assert_eq!(c.fallback_palette, Palette::greyscale());
        assert_eq!(c.tracks.len(), 5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_keys() {
        let c = MeshConfig::from_json(r#"{"point_count": 3, "seed": 9}"#).unwrap();
        assert_eq!(c.point_count, 3);
        assert_eq!(c.seed, 9);
        assert_eq!(c.fps, 30.0);
    }

    #[test]
    fn from_json_reads_palettes_as_hex() {
        let c = MeshConfig::from_json(r##"{"fallback_palette": ["#101010"]}"##).unwrap();
        assert_eq!(c.fallback_palette.len(), 1);
    }

    #[test]
    fn from_json_rejects_empty_palette() {
        assert!(MeshConfig::from_json(r#"{"fallback_palette": []}"#).is_err());
    }

    #[test]
    fn from_json_rejects_malformed_json() {
        let err = MeshConfig::from_json("{point_count").unwrap_err();
        assert!(matches!(err, MeshError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_points_is_invalid() {
        let c = MeshConfig {
            point_count: 0,
            ..MeshConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(MeshError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn inverted_radius_range_is_invalid() {
        let c = MeshConfig {
            radius_min: 0.4,
            radius_max: 0.2,
            ..MeshConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn non_positive_durations_are_invalid() {
        let c = MeshConfig {
            transition_ms: 0.0,
            ..MeshConfig::default()
        };
        assert!(c.validate().is_err());
        let c = MeshConfig {
            fps: -1.0,
            ..MeshConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn blank_zoom_key_is_invalid() {
        for key in ["", " "] {
            let c = MeshConfig {
                zoom_key: key.to_string(),
                ..MeshConfig::default()
            };
            assert!(matches!(
                c.validate(),
                Err(MeshError::InvalidConfiguration(_))
            ));
        }
        assert!(MeshConfig::from_json(r#"{"zoom_key": ""}"#).is_err());
    }

    #[test]
    fn json_round_trip() {
        let c = MeshConfig {
            reduced_motion: true,
            ..MeshConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(MeshConfig::from_json(&json).unwrap(), c);
    }
}
