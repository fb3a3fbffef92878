//! Near-field corridor isolation.
//!
//! Operates on yaw-stabilized points where −Z is "ahead":
//!
//! 1. drop everything farther than the near field (`z < -near_field`);
//! 2. shift heights so the lowest remaining point sits at `y = 0`;
//! 3. keep only points inside the walking corridor (`|x| ≤ half_width`).

use nalgebra::Vector3;
use pathsense_types::FilteredPointCloud;

use crate::config::PipelineConfig;

/// Crop a yaw-stabilized cloud to the corridor directly ahead.
///
/// An empty input (or one that is empty after the near-field crop) yields an
/// empty cloud.
pub fn isolate_obstacles(points: Vec<Vector3<f32>>, config: &PipelineConfig) -> FilteredPointCloud {
    let mut near: Vec<Vector3<f32>> = points
        .into_iter()
        .filter(|p| p.z >= -config.near_field_m)
        .collect();

    let Some(y_offset) = near.iter().map(|p| p.y).reduce(f32::min) else {
        return Vec::new();
    };
    for p in &mut near {
        p.y -= y_offset;
    }

    near.retain(|p| p.x.abs() <= config.corridor_half_width_m);
    near
}
