//! Pose math: camera → world mapping and yaw stabilization.
//!
//! Depth samples arrive in camera-local space.  Before they can be binned by
//! forward distance they are rotated into the world frame and then rotated
//! about the vertical axis so that "ahead" follows the observer rather than
//! whatever heading the handset happens to have this frame.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use pathsense_perception::pose::{to_world, YawRotation};
//! use pathsense_types::CameraPose;
//!
//! let pose = CameraPose::identity();
//! let p = Vector3::new(0.1, 0.0, -1.5);
//!
//! let yaw = YawRotation::from_pose(&pose);
//! let stabilized = yaw.apply(&to_world(&p, &pose));
//! assert!((stabilized - p).norm() < 1e-6);
//! ```

use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};
use pathsense_types::CameraPose;

// ────────────────────────────────────────────────────────────────────────────
// Camera → world
// ────────────────────────────────────────────────────────────────────────────

/// Rotate a camera-local point into the world frame.
///
/// Only the rotation block of the pose is applied.  The point is treated as a
/// direction from the camera, so its distance from the observer is preserved
/// and every sample in the frame shares the same rotation normalization.
pub fn to_world(point: &Vector3<f32>, pose: &CameraPose) -> Vector3<f32> {
    pose.rotation() * point
}

/// Map a camera-local point to its absolute world position (rotation and
/// translation, `w = 1`).
pub fn to_world_absolute(point: &Vector3<f32>, pose: &CameraPose) -> Vector3<f32> {
    transform_point(&pose.transform, point)
}

/// Apply a homogeneous transform to a point with `w = 1`.
pub fn transform_point(transform: &Matrix4<f32>, point: &Vector3<f32>) -> Vector3<f32> {
    transform.transform_point(&Point3::from(*point)).coords
}

/// Invert a rigid (rotation + translation) transform.
///
/// Uses the transpose of the rotation block, so it never fails the way a
/// general 4×4 inverse can.
pub fn invert_rigid(transform: &Matrix4<f32>) -> Matrix4<f32> {
    let rotation_t = transform.fixed_view::<3, 3>(0, 0).transpose();
    let translation = transform.fixed_view::<3, 1>(0, 3).into_owned();

    let mut inverse = Matrix4::identity();
    inverse.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation_t);
    inverse
        .fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&(-(rotation_t * translation)));
    inverse
}

// ────────────────────────────────────────────────────────────────────────────
// Yaw
// ────────────────────────────────────────────────────────────────────────────

/// Camera yaw relative to the world Z axis: `atan2(basisX.z, basisZ.z)`.
pub fn yaw_angle(pose: &CameraPose) -> f32 {
    pose.basis_x().z.atan2(pose.basis_z().z)
}

/// A rotation about the world vertical (+Y) axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawRotation {
    angle: f32,
    rotation: UnitQuaternion<f32>,
}

impl YawRotation {
    /// Rotation by `angle` radians about +Y.
    pub fn from_angle(angle: f32) -> Self {
        let axis: Unit<Vector3<f32>> = Vector3::y_axis();
        Self {
            angle,
            rotation: UnitQuaternion::from_axis_angle(&axis, angle),
        }
    }

    /// The stabilizing rotation for `pose`: `-yaw_angle(pose)` about +Y.
    pub fn from_pose(pose: &CameraPose) -> Self {
        Self::from_angle(-yaw_angle(pose))
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// The opposite rotation; `r.inverse().apply(&r.apply(&p)) ≈ p`.
    pub fn inverse(&self) -> Self {
        Self::from_angle(-self.angle)
    }

    pub fn apply(&self, point: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * point
    }
}

/// Remove the camera's yaw from a world-frame point.
pub fn yaw_stabilize(point: &Vector3<f32>, pose: &CameraPose) -> Vector3<f32> {
    YawRotation::from_pose(pose).apply(point)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
