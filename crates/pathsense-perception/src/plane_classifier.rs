//! Plane classification: turns each plane's semantic tag into a
//! filter/announce decision.
//!
//! | Classification          | `filter_occluded`      | `announce`        |
//! |-------------------------|------------------------|-------------------|
//! | wall, door, window      | `!ray_intersects`      | `ray_intersects`  |
//! | table, seat             | `false`                | `corner_visible`  |
//! | object                  | `false`                | `false`           |
//! | floor, ceiling, other   | `true`                 | `false`           |
//!
//! Vertical surfaces directly ahead are real obstacles and stay in the cloud;
//! those off to the side are scrubbed as clutter.  Tables and seats always
//! stay but are only called out when they are in frame.

use pathsense_types::{
    CameraIntrinsics, CameraPose, FrameSize, PlaneAnchor, PlaneClassification, PlaneDecision,
};

use crate::plane_geometry::{camera_to_plane, corner_visible, ray_intersects_rectangle};

/// Decide how a single plane is treated this frame.
pub fn classify_plane(
    plane: &PlaneAnchor,
    pose: &CameraPose,
    intrinsics: &CameraIntrinsics,
    frame_size: &FrameSize,
) -> PlaneDecision {
    let (filter_occluded, announce) = match plane.classification {
        PlaneClassification::Wall | PlaneClassification::Door | PlaneClassification::Window => {
            let ahead = ray_intersects_rectangle(&camera_to_plane(plane, pose), plane);
            (!ahead, ahead)
        }
        PlaneClassification::Table | PlaneClassification::Seat => {
            (false, corner_visible(plane, pose, intrinsics, frame_size))
        }
        PlaneClassification::Object => (false, false),
        PlaneClassification::Floor | PlaneClassification::Ceiling | PlaneClassification::Other => {
            (true, false)
        }
    };

    PlaneDecision {
        plane_id: plane.id,
        classification: plane.classification,
        filter_occluded,
        announce,
    }
}

/// Classify every plane, preserving input order.
pub fn classify_planes(
    planes: &[PlaneAnchor],
    pose: &CameraPose,
    intrinsics: &CameraIntrinsics,
    frame_size: &FrameSize,
) -> Vec<PlaneDecision> {
    planes
        .iter()
        .map(|plane| classify_plane(plane, pose, intrinsics, frame_size))
        .collect()
}
