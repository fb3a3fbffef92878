//! Forward-distance histogram and peak extraction.
//!
//! Bin edges run from `0` down to `-near_field` in steps of `bin_width`
//! (`[0, -0.1, …, -4.0]` by default, 40 bins).  A point with forward
//! coordinate `z` lands in bin `i` iff `edge[i] >= z > edge[i + 1]`.
//!
//! Peaks are found on the count vector with a `0` sentinel prepended: padded
//! bin `i` is a peak iff it beats both neighbours and the noise threshold.
//! The last bin has no right neighbour and is never reported.
//!
//! # Example
//!
//! ```rust
//! use pathsense_perception::{ObstacleHistogram, PipelineConfig};
//!
//! let mut hist = ObstacleHistogram::new(&PipelineConfig::default());
//! for _ in 0..150 {
//!     hist.insert(-1.25);
//! }
//! assert_eq!(hist.counts()[12], 150);
//!
//! let peaks = hist.peaks(100);
//! assert_eq!(peaks.len(), 1);
//! assert!((peaks[0] - 1.2).abs() < 1e-5);
//! ```

use pathsense_types::ObstacleList;

use crate::config::PipelineConfig;

/// Fixed-length count of points per forward-distance interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleHistogram {
    /// Descending bin edges, `bins + 1` entries starting at 0.
    edges: Vec<f32>,
    counts: Vec<u32>,
}

impl ObstacleHistogram {
    /// Empty histogram covering `[0, -near_field_m]` in
    /// [`PipelineConfig::bin_count`] bins of `bin_width_m`.
    pub fn new(config: &PipelineConfig) -> Self {
        let bins = config.bin_count();
        let bin_width = f64::from(config.bin_width_m);
        let edges = (0..=bins)
            .map(|i| -((i as f64 * bin_width) as f32))
            .collect();
        Self {
            edges,
            counts: vec![0; bins],
        }
    }

    /// Build a histogram from forward coordinates.
    pub fn from_forward<I>(config: &PipelineConfig, forward: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let mut hist = Self::new(config);
        for z in forward {
            hist.insert(z);
        }
        hist
    }

    /// Index of the bin holding `z`, or `None` when `z` is behind the
    /// observer, beyond the last edge, or NaN.
    pub fn bin_index(&self, z: f32) -> Option<usize> {
        // Edges descend, so `edge >= z` holds for a leading run.
        let at_or_above = self.edges.partition_point(|&edge| edge >= z);
        if at_or_above == 0 || at_or_above > self.counts.len() {
            return None;
        }
        Some(at_or_above - 1)
    }

    /// Count `z`; out-of-range values are ignored.
    pub fn insert(&mut self, z: f32) {
        if let Some(i) = self.bin_index(z) {
            self.counts[i] += 1;
        }
    }

    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Counts with the leading `0` sentinel.
    pub fn padded(&self) -> Vec<u32> {
        std::iter::once(0).chain(self.counts.iter().copied()).collect()
    }

    /// Distances (positive metres) of every local-maximum bin holding more
    /// than `threshold` points, in bin order.
    pub fn peaks(&self, threshold: u32) -> ObstacleList {
        let padded = self.padded();
        padded
            .windows(3)
            .enumerate()
            .filter(|(_, w)| w[1] > w[0] && w[1] > w[2] && w[1] > threshold)
            // Window `i` is centred on padded bin `i + 1`, i.e. unpadded bin `i`.
            .map(|(i, _)| -self.edges[i])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_hist() -> ObstacleHistogram {
        ObstacleHistogram::new(&PipelineConfig::default())
    }

    fn fill(hist: &mut ObstacleHistogram, z: f32, n: usize) {
        for _ in 0..n {
            hist.insert(z);
        }
    }

    #[test]
    fn default_layout_has_forty_bins() {
        let hist = default_hist();
        assert_eq!(hist.counts().len(), 40);
        assert_eq!(hist.edges().len(), 41);
        assert_eq!(hist.edges()[0], 0.0);
        assert!((hist.edges()[40] + 4.0).abs() < 1e-6);
        assert_eq!(hist.padded().len(), 41);
    }

    #[test]
    fn bin_boundaries_are_half_open() {
        let hist = default_hist();
        assert_eq!(hist.bin_index(0.0), Some(0));
        assert_eq!(hist.bin_index(-0.05), Some(0));
        assert_eq!(hist.bin_index(-0.1), Some(1));
        assert_eq!(hist.bin_index(-3.95), Some(39));
        assert_eq!(hist.bin_index(-4.0), None);
        assert_eq!(hist.bin_index(0.01), None);
        assert_eq!(hist.bin_index(f32::NAN), None);
    }

    #[test]
    fn single_cluster_yields_single_peak() {
        let mut hist = default_hist();
        fill(&mut hist, -1.2, 150);
        let peaks = hist.peaks(100);
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0] - 1.2).abs() <= 0.1 + 1e-5);
        assert_eq!(hist.counts().iter().sum::<u32>(), 150);
    }

    #[test]
    fn threshold_is_strict() {
        let mut hist = default_hist();
        fill(&mut hist, -2.05, 100);
        assert!(hist.peaks(100).is_empty());
        hist.insert(-2.05);
        assert_eq!(hist.peaks(100).len(), 1);
    }

    #[test]
    fn plateau_is_not_a_peak() {
        let mut hist = default_hist();
        fill(&mut hist, -1.05, 200);
        fill(&mut hist, -1.15, 200);
        assert!(hist.peaks(100).is_empty());
    }

    #[test]
    fn first_bin_peak_uses_sentinel() {
        let mut hist = default_hist();
        fill(&mut hist, -0.05, 120);
        let peaks = hist.peaks(100);
        assert_eq!(peaks, vec![0.0]);
    }

    #[test]
    fn last_bin_is_never_a_peak() {
        let mut hist = default_hist();
        fill(&mut hist, -3.95, 500);
        assert!(hist.peaks(100).is_empty());
    }

    #[test]
    fn peaks_follow_bin_order() {
        let hist = ObstacleHistogram::from_forward(
            &PipelineConfig::default(),
            std::iter::repeat_n(-2.55, 130).chain(std::iter::repeat_n(-0.75, 110)),
        );
        let peaks = hist.peaks(100);
        assert_eq!(peaks.len(), 2);
        assert!((peaks[0] - 0.7).abs() < 1e-5);
        assert!((peaks[1] - 2.5).abs() < 1e-5);
    }
}
