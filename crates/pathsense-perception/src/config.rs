//! Tunable constants of the obstacle pipeline.
//!
//! Every field has a serde default, so a `[pipeline]` table in a config file
//! only needs to name the values it changes.

use pathsense_types::PathSenseError;
use serde::{Deserialize, Serialize};

/// Upper bound on [`PipelineConfig::bin_count`].
pub const MAX_BINS: usize = 10_000;

/// Numeric parameters for one [`ObstaclePipeline`][crate::pipeline::ObstaclePipeline].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Forward search range (metres). Points farther ahead are dropped.
    #[serde(default = "default_near_field")]
    pub near_field_m: f32,

    /// Half-width of the walking corridor (metres).
    #[serde(default = "default_corridor_half_width")]
    pub corridor_half_width_m: f32,

    /// Histogram bin width (metres).
    #[serde(default = "default_bin_width")]
    pub bin_width_m: f32,

    /// A bin must hold strictly more points than this to count as a peak.
    #[serde(default = "default_peak_threshold")]
    pub peak_threshold: u32,

    /// Half-thickness of the slab around a background plane inside which
    /// points are scrubbed (metres).
    #[serde(default = "default_occlusion_slab")]
    pub occlusion_slab_m: f32,
}

fn default_near_field() -> f32 {
    4.0
}
fn default_corridor_half_width() -> f32 {
    0.5
}
fn default_bin_width() -> f32 {
    0.1
}
fn default_peak_threshold() -> u32 {
    100
}
fn default_occlusion_slab() -> f32 {
    0.2
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            near_field_m: default_near_field(),
            corridor_half_width_m: default_corridor_half_width(),
            bin_width_m: default_bin_width(),
            peak_threshold: default_peak_threshold(),
            occlusion_slab_m: default_occlusion_slab(),
        }
    }
}

impl PipelineConfig {
    /// Number of histogram bins covering the near field.
    pub fn bin_count(&self) -> usize {
        (self.near_field_m / self.bin_width_m).round() as usize
    }

    /// Reject values that would make the histogram or the filters meaningless.
    pub fn validate(&self) -> Result<(), PathSenseError> {
        let positive = [
            ("near_field_m", self.near_field_m),
            ("corridor_half_width_m", self.corridor_half_width_m),
            ("bin_width_m", self.bin_width_m),
            ("occlusion_slab_m", self.occlusion_slab_m),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PathSenseError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if self.bin_width_m > self.near_field_m {
            return Err(PathSenseError::InvalidConfig(format!(
                "bin_width_m ({}) exceeds near_field_m ({})",
                self.bin_width_m, self.near_field_m
            )));
        }
        let bins = self.bin_count();
        if bins > MAX_BINS {
            return Err(PathSenseError::InvalidConfig(format!(
                "near_field_m / bin_width_m gives {bins} bins, more than {MAX_BINS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_four_metres_in_forty_bins() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.bin_count(), 40);
        assert_eq!(cfg.peak_threshold, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_table_falls_back_to_defaults() {
        let cfg: PipelineConfig = toml::from_str("peak_threshold = 50").unwrap();
        assert_eq!(cfg.peak_threshold, 50);
        assert_eq!(cfg.near_field_m, 4.0);
        assert_eq!(cfg.corridor_half_width_m, 0.5);
    }

    #[test]
    fn validate_rejects_non_positive_values() {
        let cfg = PipelineConfig { bin_width_m: 0.0, ..PipelineConfig::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("bin_width_m"));

        let cfg = PipelineConfig { near_field_m: f32::NAN, ..PipelineConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_histograms() {
        let cfg = PipelineConfig {
            near_field_m: 1e6,
            bin_width_m: 1e-6,
            ..PipelineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, PathSenseError::InvalidConfig(_)));
        assert!(err.to_string().contains("bins"));

        let at_limit = PipelineConfig { near_field_m: 1000.0, bin_width_m: 0.1, ..PipelineConfig::default() };
        assert_eq!(at_limit.bin_count(), MAX_BINS);
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bin_wider_than_range() {
        let cfg = PipelineConfig { bin_width_m: 5.0, ..PipelineConfig::default() };
        assert!(matches!(cfg.validate(), Err(PathSenseError::InvalidConfig(_))));
    }
}
