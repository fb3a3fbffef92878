//! `pathsense-types` – shared data model for the PathSense obstacle pipeline.
//!
//! Everything the sensing layer hands to the core for one frame, and
//! everything the core hands back, lives here so that the perception,
//! feedback, and CLI crates agree on a single vocabulary.

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Depth samples
// ────────────────────────────────────────────────────────────────────────────

/// A single depth-sensor sample in camera-local space.
///
/// The sensor reports a direction `(x, y, z)` and a scale weight `w`; the
/// metric position of the sample is `w · (x, y, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default = "default_weight")]
    pub w: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl DepthSample {
    /// Create a sample with unit weight.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    /// Metric camera-local position (`w · (x, y, z)`).
    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z) * self.w
    }
}

/// Per-sample depth confidence reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// The highest level; only samples at this level reach the histogram.
    pub const MAX: ConfidenceLevel = ConfidenceLevel::High;
}

// ────────────────────────────────────────────────────────────────────────────
// Camera
// ────────────────────────────────────────────────────────────────────────────

/// Rigid camera-local → world transform for one frame.
///
/// Stored column-major: columns 0–2 are the camera's X/Y/Z basis expressed in
/// world space, column 3 is the camera origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub transform: Matrix4<f32>,
}

impl CameraPose {
    pub fn new(transform: Matrix4<f32>) -> Self {
        Self { transform }
    }

    pub fn identity() -> Self {
        Self::new(Matrix4::identity())
    }

    pub fn basis_x(&self) -> Vector3<f32> {
        self.transform.fixed_view::<3, 1>(0, 0).into_owned()
    }

    pub fn basis_z(&self) -> Vector3<f32> {
        self.transform.fixed_view::<3, 1>(0, 2).into_owned()
    }

    /// Camera origin in world space.
    pub fn translation(&self) -> Vector3<f32> {
        self.transform.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Upper-left 3×3 rotation block.
    pub fn rotation(&self) -> Matrix3<f32> {
        self.transform.fixed_view::<3, 3>(0, 0).into_owned()
    }
}

/// Pinhole intrinsics, constant for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

/// Output image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Planes
// ────────────────────────────────────────────────────────────────────────────

/// Semantic tag attached to a detected planar surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneClassification {
    Floor,
    Ceiling,
    Wall,
    Door,
    Window,
    Table,
    Seat,
    Object,
    Other,
}

impl std::fmt::Display for PlaneClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaneClassification::Floor => "floor",
            PlaneClassification::Ceiling => "ceiling",
            PlaneClassification::Wall => "wall",
            PlaneClassification::Door => "door",
            PlaneClassification::Window => "window",
            PlaneClassification::Table => "table",
            PlaneClassification::Seat => "seat",
            PlaneClassification::Object => "object",
            PlaneClassification::Other => "other",
        };
        f.write_str(name)
    }
}

/// Rectangle size in the plane-local XZ plane (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneExtent {
    pub width: f32,
    pub depth: f32,
}

/// A tracked planar surface.
///
/// The plane's normal is its local +Y axis; the rectangle spans
/// `center.x ± width/2` and `center.z ± depth/2` in local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneAnchor {
    pub id: Uuid,
    pub classification: PlaneClassification,
    #[serde(default = "default_center")]
    pub center: Vector3<f32>,
    pub extent: PlaneExtent,
    /// Plane-local → world transform.
    pub transform: Matrix4<f32>,
}

fn default_center() -> Vector3<f32> {
    Vector3::zeros()
}

impl PlaneAnchor {
    /// Create a plane centred on its local origin with a fresh id.
    pub fn new(
        classification: PlaneClassification,
        extent: PlaneExtent,
        transform: Matrix4<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            classification,
            center: Vector3::zeros(),
            extent,
            transform,
        }
    }

    /// True when the plane-local `(x, z)` lies inside the rectangle.
    pub fn contains_local(&self, x: f32, z: f32) -> bool {
        (x - self.center.x).abs() <= self.extent.width * 0.5
            && (z - self.center.z).abs() <= self.extent.depth * 0.5
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Frame in / report out
// ────────────────────────────────────────────────────────────────────────────

/// Everything the sensing layer delivers for one admitted frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Capture time in seconds since the session started.
    #[serde(default)]
    pub timestamp_s: f64,
    pub samples: Vec<DepthSample>,
    pub confidences: Vec<ConfidenceLevel>,
    pub pose: CameraPose,
    #[serde(default)]
    pub planes: Vec<PlaneAnchor>,
    pub intrinsics: CameraIntrinsics,
    pub frame_size: FrameSize,
}

/// Points in the yaw-stabilized, floor-normalized frame.
pub type FilteredPointCloud = Vec<Vector3<f32>>;

/// Obstacle distances in metres, one per histogram peak.
pub type ObstacleList = Vec<f32>;

/// Per-plane outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneDecision {
    pub plane_id: Uuid,
    pub classification: PlaneClassification,
    /// Points lying on this plane are scrubbed from the cloud.
    pub filter_occluded: bool,
    /// The plane is worth a spoken callout this frame.
    pub announce: bool,
}

/// Result of one pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub obstacles: ObstacleList,
    pub plane_decisions: Vec<PlaneDecision>,
    /// Samples that survived the confidence and occlusion filter.
    pub retained_points: usize,
    /// Points left inside the near-field corridor.
    pub isolated_points: usize,
}

impl FrameReport {
    /// Nearest obstacle, if any.
    pub fn closest_obstacle(&self) -> Option<f32> {
        self.obstacles.iter().copied().reduce(f32::min)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Error type shared across the workspace. Every variant is local to the
/// frame or command that produced it.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSenseError {
    #[error("Invalid Input: {samples} depth samples but {confidences} confidence labels")]
    InvalidInput { samples: usize, confidences: usize },

    #[error("Invalid Pipeline Config: {0}")]
    InvalidConfig(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}
