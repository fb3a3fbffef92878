//! `pathsense-perception` – the obstacle-detection core.
//!
//! Turns one frame of depth samples, camera pose, and tracked planes into a
//! short list of obstacle distances directly ahead of the observer.
//!
//! # Modules
//!
//! - [`pose`] – camera → world rotation, rigid inverses, and
//!   [`YawRotation`][pose::YawRotation] for yaw stabilization.
//! - [`plane_geometry`] – forward-ray / rectangle intersection and the
//!   corner-visibility projection test.
//! - [`plane_classifier`] – maps each plane's classification to a
//!   [`PlaneDecision`][pathsense_types::PlaneDecision].
//! - [`point_filter`] – [`PointCloudFilter`][point_filter::PointCloudFilter]:
//!   confidence gate plus plane occlusion mask.
//! - [`isolation`] – near-field, floor-height, and corridor crops.
//! - [`histogram`] – [`ObstacleHistogram`][histogram::ObstacleHistogram]:
//!   forward-distance bins and local-maximum peaks.
//! - [`pipeline`] – [`ObstaclePipeline`][pipeline::ObstaclePipeline]: runs
//!   every stage for one frame.
//! - [`config`] – [`PipelineConfig`][config::PipelineConfig].

pub mod config;
pub mod histogram;
pub mod isolation;
pub mod pipeline;
pub mod plane_classifier;
pub mod plane_geometry;
pub mod point_filter;
pub mod pose;

pub use config::PipelineConfig;
pub use histogram::ObstacleHistogram;
pub use pipeline::ObstaclePipeline;
pub use plane_classifier::{classify_plane, classify_planes};
pub use point_filter::{OcclusionMask, PointCloudFilter};
pub use pose::{to_world, yaw_stabilize, YawRotation};
