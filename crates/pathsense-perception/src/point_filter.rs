//! Confidence and occlusion filtering of raw depth samples.
//!
//! A sample survives only when the sensor reported it at the highest
//! [`ConfidenceLevel`] *and* it does not lie on any background plane (one
//! whose [`PlaneDecision::filter_occluded`] is set).  Occlusion flags
//! accumulate across planes by logical OR; input order is preserved.

use nalgebra::{Matrix4, Vector3};
use pathsense_types::{
    CameraPose, ConfidenceLevel, DepthSample, PathSenseError, PlaneAnchor, PlaneDecision,
};

use crate::pose::{invert_rigid, to_world_absolute, transform_point};

// ────────────────────────────────────────────────────────────────────────────
// Occlusion mask
// ────────────────────────────────────────────────────────────────────────────

/// Per-point flag: `true` when the point lies on a filtered plane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcclusionMask {
    flags: Vec<bool>,
}

impl OcclusionMask {
    /// An all-clear mask for `len` points.
    pub fn new(len: usize) -> Self {
        Self { flags: vec![false; len] }
    }

    /// Flag every world-space point lying within `slab` of a plane marked
    /// `filter_occluded`.  `planes` and `decisions` are paired by index.
    pub fn build(
        world_points: &[Vector3<f32>],
        planes: &[PlaneAnchor],
        decisions: &[PlaneDecision],
        slab: f32,
    ) -> Self {
        let mut mask = Self::new(world_points.len());
        for (plane, decision) in planes.iter().zip(decisions) {
            if decision.filter_occluded {
                mask.mark_plane(world_points, plane, slab);
            }
        }
        mask
    }

    /// OR this plane's occlusion into the mask.
    pub fn mark_plane(&mut self, world_points: &[Vector3<f32>], plane: &PlaneAnchor, slab: f32) {
        let world_to_plane = invert_rigid(&plane.transform);
        for (flag, point) in self.flags.iter_mut().zip(world_points) {
            if !*flag && lies_on_plane(point, plane, &world_to_plane, slab) {
                *flag = true;
            }
        }
    }

    pub fn is_occluded(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn occluded_count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }
}

/// True when `point` (world space) sits within `slab` of the plane surface and
/// inside its rectangle.
pub fn lies_on_plane(
    point: &Vector3<f32>,
    plane: &PlaneAnchor,
    world_to_plane: &Matrix4<f32>,
    slab: f32,
) -> bool {
    let local = transform_point(world_to_plane, point);
    local.y.abs() < slab && plane.contains_local(local.x, local.z)
}

// ────────────────────────────────────────────────────────────────────────────
// PointCloudFilter
// ────────────────────────────────────────────────────────────────────────────

/// Samples that passed the filter plus the mask that was applied.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Metric camera-local positions of the surviving samples, in input order.
    pub points: Vec<Vector3<f32>>,
    pub mask: OcclusionMask,
}

/// Builds the confidence + occlusion mask for a frame.
#[derive(Debug, Clone, Copy)]
pub struct PointCloudFilter {
    occlusion_slab: f32,
}

impl PointCloudFilter {
    pub fn new(occlusion_slab: f32) -> Self {
        Self { occlusion_slab }
    }

    /// Filter one frame's samples.
    ///
    /// # Errors
    ///
    /// Returns [`PathSenseError::InvalidInput`] when the sample and confidence
    /// arrays differ in length.
    pub fn apply(
        &self,
        samples: &[DepthSample],
        confidences: &[ConfidenceLevel],
        pose: &CameraPose,
        planes: &[PlaneAnchor],
        decisions: &[PlaneDecision],
    ) -> Result<FilterOutcome, PathSenseError> {
        if samples.len() != confidences.len() {
            return Err(PathSenseError::InvalidInput {
                samples: samples.len(),
                confidences: confidences.len(),
            });
        }

        let local: Vec<Vector3<f32>> = samples.iter().map(DepthSample::position).collect();

        let mask = if decisions.iter().any(|d| d.filter_occluded) {
            let world: Vec<Vector3<f32>> =
                local.iter().map(|p| to_world_absolute(p, pose)).collect();
            OcclusionMask::build(&world, planes, decisions, self.occlusion_slab)
        } else {
            OcclusionMask::new(local.len())
        };

        let points = local
            .into_iter()
            .zip(confidences)
            .enumerate()
            .filter(|(i, (_, confidence))| {
                **confidence == ConfidenceLevel::MAX && !mask.is_occluded(*i)
            })
            .map(|(_, (point, _))| point)
            .collect();

        Ok(FilterOutcome { points, mask })
    }
}

impl Default for PointCloudFilter {
    fn default() -> Self {
        Self::new(0.2)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
