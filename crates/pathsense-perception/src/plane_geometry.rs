//! Per-plane geometry tests: forward-ray intersection and corner visibility.
//!
//! Both tests look at one [`PlaneAnchor`] at a time.  Plane-local space has
//! the surface normal along +Y and the rectangle lying in the XZ plane; the
//! camera looks down its own −Z axis.

use nalgebra::{Matrix4, Vector3};
use pathsense_types::{CameraIntrinsics, CameraPose, FrameSize, PlaneAnchor};

use crate::pose::{invert_rigid, transform_point};

/// Below this magnitude the forward ray is treated as parallel to the plane.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Camera-local → plane-local transform: `inverse(planeToWorld) · cameraToWorld`.
pub fn camera_to_plane(plane: &PlaneAnchor, pose: &CameraPose) -> Matrix4<f32> {
    invert_rigid(&plane.transform) * pose.transform
}

/// True when the camera's forward ray pierces the plane's rectangle in front
/// of the camera.
///
/// With `t` the camera origin (translation column) and `f = -basisZ` the
/// forward direction, both in plane space, the hit parameter is
/// `lambda = -t.y / f.y`, which equals `t.y / basisZ.y`.  A ray running
/// parallel to the plane never intersects it.
pub fn ray_intersects_rectangle(camera_to_plane: &Matrix4<f32>, plane: &PlaneAnchor) -> bool {
    let origin: Vector3<f32> = camera_to_plane.fixed_view::<3, 1>(0, 3).into_owned();
    let forward: Vector3<f32> = -camera_to_plane.fixed_view::<3, 1>(0, 2).into_owned();

    if forward.y.abs() < PARALLEL_EPSILON {
        return false;
    }

    let lambda = -origin.y / forward.y;
    if lambda <= 0.0 {
        return false;
    }

    let hit = origin + forward * lambda;
    plane.contains_local(hit.x, hit.z)
}

/// The four rectangle corners in plane-local space.
pub fn plane_corners(plane: &PlaneAnchor) -> [Vector3<f32>; 4] {
    let hw = plane.extent.width * 0.5;
    let hd = plane.extent.depth * 0.5;
    let c = plane.center;
    [
        Vector3::new(c.x - hw, c.y, c.z - hd),
        Vector3::new(c.x + hw, c.y, c.z - hd),
        Vector3::new(c.x + hw, c.y, c.z + hd),
        Vector3::new(c.x - hw, c.y, c.z + hd),
    ]
}

/// Pinhole projection of a camera-space point, `+0.5` pixel-centre offset
/// included.
pub fn project(point: &Vector3<f32>, intrinsics: &CameraIntrinsics) -> (f32, f32) {
    let px = point.x * intrinsics.fx / point.z + intrinsics.cx + 0.5;
    let py = point.y * intrinsics.fy / point.z + intrinsics.cy + 0.5;
    (px, py)
}

/// True when any rectangle corner in front of the camera projects inside the
/// frame.
///
/// A corner counts when its column lies within the frame width *or* its row
/// lies within the frame height.  The two bounds are not required together.
pub fn corner_visible(
    plane: &PlaneAnchor,
    pose: &CameraPose,
    intrinsics: &CameraIntrinsics,
    frame_size: &FrameSize,
) -> bool {
    let plane_to_camera = invert_rigid(&pose.transform) * plane.transform;

    plane_corners(plane)
        .iter()
        .map(|corner| transform_point(&plane_to_camera, corner))
        .filter(|local| local.z < 0.0)
        .any(|local| {
            let (px, py) = project(&local, intrinsics);
            (0.0..frame_size.width).contains(&px) || (0.0..frame_size.height).contains(&py)
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
