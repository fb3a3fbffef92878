//! [`ObstaclePipeline`] – one full obstacle-detection pass per sensor frame.
//!
//! ```text
//! planes ──► classify ──► decisions ─┐
//!                                    ▼
//! samples + confidences ──► confidence/occlusion filter
//!                                    │
//!                     to_world (rotation only) + yaw stabilize
//!                                    │
//!              near-field crop ► floor normalize ► corridor crop
//!                                    │
//!                         histogram ► peaks ► ObstacleList
//! ```
//!
//! The pipeline holds only its configuration; every call recomputes from the
//! frame it is given, so successive calls never influence each other.
//!
//! # Example
//!
//! ```rust
//! use pathsense_perception::{ObstaclePipeline, PipelineConfig};
//! use pathsense_types::{
//!     CameraIntrinsics, CameraPose, ConfidenceLevel, DepthSample, FrameSize, SensorFrame,
//! };
//!
//! let samples: Vec<DepthSample> = (0..150)
//!     .map(|i| DepthSample::new(0.001 * i as f32, 0.2, -1.25))
//!     .collect();
//! let frame = SensorFrame {
//!     timestamp_s: 0.0,
//!     confidences: vec![ConfidenceLevel::High; samples.len()],
//!     samples,
//!     pose: CameraPose::identity(),
//!     planes: Vec::new(),
//!     intrinsics: CameraIntrinsics { fx: 500.0, fy: 500.0, cx: 320.0, cy: 240.0 },
//!     frame_size: FrameSize { width: 640.0, height: 480.0 },
//! };
//!
//! let pipeline = ObstaclePipeline::new(PipelineConfig::default()).unwrap();
//! let obstacles = pipeline.detect_obstacles(&frame).unwrap();
//! assert_eq!(obstacles.len(), 1);
//! ```

use pathsense_types::{
    FilteredPointCloud, FrameReport, ObstacleList, PathSenseError, SensorFrame,
};
use tracing::{debug, instrument};

use crate::config::PipelineConfig;
use crate::histogram::ObstacleHistogram;
use crate::isolation::isolate_obstacles;
use crate::plane_classifier::classify_planes;
use crate::point_filter::PointCloudFilter;
use crate::pose::{to_world, YawRotation};

/// Stateless per-frame obstacle detector.
#[derive(Debug, Clone)]
pub struct ObstaclePipeline {
    config: PipelineConfig,
    filter: PointCloudFilter,
}

impl ObstaclePipeline {
    /// Build a pipeline after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PathSenseError::InvalidConfig`] for non-positive or
    /// non-finite parameters, or a histogram wider than
    /// [`MAX_BINS`](crate::config::MAX_BINS).
    pub fn new(config: PipelineConfig) -> Result<Self, PathSenseError> {
        config.validate()?;
        let filter = PointCloudFilter::new(config.occlusion_slab_m);
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on `frame` and return obstacles plus diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`PathSenseError::InvalidInput`] when the sample and confidence
    /// arrays differ in length.  The frame is rejected as a whole; nothing is
    /// retained for the next call.
    #[instrument(
        name = "obstacle_frame",
        skip_all,
        fields(samples = frame.samples.len(), planes = frame.planes.len())
    )]
    pub fn process(&self, frame: &SensorFrame) -> Result<FrameReport, PathSenseError> {
        let plane_decisions = classify_planes(
            &frame.planes,
            &frame.pose,
            &frame.intrinsics,
            &frame.frame_size,
        );

        let filtered = self.filter.apply(
            &frame.samples,
            &frame.confidences,
            &frame.pose,
            &frame.planes,
            &plane_decisions,
        )?;
        let retained_points = filtered.points.len();

        let cloud = self.stabilize_and_isolate(filtered.points, frame);
        let isolated_points = cloud.len();

        let obstacles = self.obstacles_from_cloud(&cloud);

        debug!(
            retained = retained_points,
            occluded = filtered.mask.occluded_count(),
            isolated = isolated_points,
            obstacles = ?obstacles,
            "frame processed"
        );

        Ok(FrameReport {
            obstacles,
            plane_decisions,
            retained_points,
            isolated_points,
        })
    }

    /// Obstacle distances only.
    pub fn detect_obstacles(&self, frame: &SensorFrame) -> Result<ObstacleList, PathSenseError> {
        self.process(frame).map(|report| report.obstacles)
    }

    /// Rotate retained camera-local points into the yaw-stabilized frame and
    /// crop them to the corridor ahead.
    fn stabilize_and_isolate(
        &self,
        points: Vec<nalgebra::Vector3<f32>>,
        frame: &SensorFrame,
    ) -> FilteredPointCloud {
        let yaw = YawRotation::from_pose(&frame.pose);
        let stabilized = points
            .iter()
            .map(|p| yaw.apply(&to_world(p, &frame.pose)))
            .collect();
        isolate_obstacles(stabilized, &self.config)
    }

    /// Histogram the forward coordinates of an isolated cloud and extract peaks.
    pub fn obstacles_from_cloud(&self, cloud: &FilteredPointCloud) -> ObstacleList {
        ObstacleHistogram::from_forward(&self.config, cloud.iter().map(|p| p.z))
            .peaks(self.config.peak_threshold)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix4, UnitQuaternion, Vector3};
    use pathsense_types::{
        CameraIntrinsics, CameraPose, ConfidenceLevel, DepthSample, FrameSize, PlaneAnchor,
        PlaneClassification, PlaneExtent,
    };
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6};

    use crate::pose::yaw_stabilize;

    const BIN: f32 = 0.1;

    fn pipeline() -> ObstaclePipeline {
        ObstaclePipeline::new(PipelineConfig::default()).unwrap()
    }

    fn frame(samples: Vec<DepthSample>, planes: Vec<PlaneAnchor>) -> SensorFrame {
        SensorFrame {
            timestamp_s: 0.0,
            confidences: vec![ConfidenceLevel::High; samples.len()],
            samples,
            pose: CameraPose::identity(),
            planes,
            intrinsics: CameraIntrinsics { fx: 500.0, fy: 500.0, cx: 320.0, cy: 240.0 },
            frame_size: FrameSize { width: 640.0, height: 480.0 },
        }
    }

    /// `n` samples at forward coordinate `z`, spread over the corridor.
    fn cluster(n: usize, z: f32) -> Vec<DepthSample> {
        (0..n)
            .map(|i| {
                let x = -0.4 + 0.8 * (i % 20) as f32 / 20.0;
                let y = 0.05 * (i % 10) as f32;
                DepthSample::new(x, y, z)
            })
            .collect()
    }

    /// Deterministic pseudo-random generator for property-style checks.
    fn lcg(seed: &mut u64) -> f32 {
        *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*seed >> 33) as f32) / (1u64 << 31) as f32
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn single_cluster_reports_one_obstacle() {
        let report = pipeline().process(&frame(cluster(150, -1.2), Vec::new())).unwrap();
        assert_eq!(report.obstacles.len(), 1);
        assert!((report.obstacles[0] - 1.2).abs() <= BIN + 1e-5);
        assert_eq!(report.retained_points, 150);
        assert_eq!(report.isolated_points, 150);
    }

    #[test]
    fn empty_after_near_field_crop_yields_no_obstacles() {
        let report = pipeline().process(&frame(cluster(300, -6.0), Vec::new())).unwrap();
        assert!(report.obstacles.is_empty());
        assert_eq!(report.isolated_points, 0);

        let empty = pipeline().process(&frame(Vec::new(), Vec::new())).unwrap();
        assert!(empty.obstacles.is_empty());
    }

    #[test]
    fn two_clusters_over_sparse_noise_yield_two_peaks() {
        let mut samples = cluster(150, -0.5);
        samples.extend(cluster(150, -3.0));
        // 10 points in each of 30 bins away from the clusters.
        let noise_bins = (0..40).filter(|b| !(3..=6).contains(b) && !(29..=31).contains(b));
        for bin in noise_bins.take(30) {
            samples.extend(cluster(10, -(bin as f32 * BIN + 0.05)));
        }
        assert_eq!(samples.len(), 600);

        let obstacles = pipeline().detect_obstacles(&frame(samples, Vec::new())).unwrap();
        assert_eq!(obstacles.len(), 2, "got {obstacles:?}");
        assert!((obstacles[0] - 0.5).abs() <= BIN + 1e-5);
        assert!((obstacles[1] - 3.0).abs() <= BIN + 1e-5);
    }

    #[test]
    fn wall_ahead_is_announced_and_its_points_kept() {
        let mut wall_m = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2)
            .to_homogeneous();
        wall_m[(2, 3)] = -2.0;
        let wall = PlaneAnchor::new(
            PlaneClassification::Wall,
            PlaneExtent { width: 3.0, depth: 2.5 },
            wall_m,
        );

        let mut floor_m = Matrix4::identity();
        floor_m[(1, 3)] = -1.0;
        floor_m[(2, 3)] = -2.0;
        let floor = PlaneAnchor::new(
            PlaneClassification::Floor,
            PlaneExtent { width: 4.0, depth: 4.0 },
            floor_m,
        );

        // Points on the wall surface, plus floor returns that must be scrubbed.
        let mut samples = cluster(150, -1.95);
        samples.extend((0..200).map(|i| DepthSample::new(0.0, -1.05, -0.5 - 0.01 * i as f32)));

        let report = pipeline()
            .process(&frame(samples, vec![wall.clone(), floor.clone()]))
            .unwrap();

        let wall_decision = report.plane_decisions[0];
        assert_eq!(wall_decision.plane_id, wall.id);
        assert!(wall_decision.announce);
        assert!(!wall_decision.filter_occluded);

        let floor_decision = report.plane_decisions[1];
        assert!(floor_decision.filter_occluded);

        assert_eq!(report.retained_points, 150, "only wall points survive");
        assert_eq!(report.obstacles.len(), 1);
        assert!((report.obstacles[0] - 1.9).abs() <= BIN + 1e-5);
    }

    // ── properties ──────────────────────────────────────────────────────────

    #[test]
    fn mismatched_lengths_reject_the_frame() {
        let mut f = frame(cluster(10, -1.0), Vec::new());
        f.confidences.pop();
        let err = pipeline().process(&f).unwrap_err();
        assert_eq!(err, PathSenseError::InvalidInput { samples: 10, confidences: 9 });

        // The next frame is unaffected.
        assert!(pipeline().process(&frame(cluster(10, -1.0), Vec::new())).is_ok());
    }

    #[test]
    fn low_confidence_clusters_never_surface() {
        let mut f = frame(cluster(300, -2.0), Vec::new());
        for (i, c) in f.confidences.iter_mut().enumerate() {
            *c = if i % 2 == 0 { ConfidenceLevel::Low } else { ConfidenceLevel::Medium };
        }
        let report = pipeline().process(&f).unwrap();
        assert_eq!(report.retained_points, 0);
        assert!(report.obstacles.is_empty());
    }

    #[test]
    fn distances_stay_within_near_field() {
        let mut seed = 7;
        for _ in 0..20 {
            let samples: Vec<DepthSample> = (0..2000)
                .map(|_| {
                    let x = lcg(&mut seed) * 2.0 - 1.0;
                    let y = lcg(&mut seed) * 2.0 - 1.0;
                    // Bias towards a handful of depths so peaks appear.
                    let z = -((lcg(&mut seed) * 6.0).floor() * 0.8 + lcg(&mut seed) * 0.05);
                    DepthSample::new(x, y, z)
                })
                .collect();
            let obstacles = pipeline().detect_obstacles(&frame(samples, Vec::new())).unwrap();
            for d in obstacles {
                assert!((0.0..=4.0).contains(&d), "distance {d} out of range");
            }
        }
    }

    #[test]
    fn rerunning_a_frame_is_idempotent() {
        let mut samples = cluster(150, -0.8);
        samples.extend(cluster(200, -2.3));
        let f = frame(samples, Vec::new());
        let p = pipeline();
        let first = p.process(&f).unwrap();
        let second = p.process(&f).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn camera_translation_does_not_move_obstacles() {
        let mut f = frame(cluster(150, -1.2), Vec::new());
        let mut m = Matrix4::identity();
        m[(0, 3)] = 12.0;
        m[(1, 3)] = 1.4;
        m[(2, 3)] = -30.0;
        f.pose = CameraPose::new(m);
        let obstacles = pipeline().detect_obstacles(&f).unwrap();
        assert_eq!(obstacles.len(), 1);
        assert!((obstacles[0] - 1.2).abs() <= BIN + 1e-5);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = PipelineConfig { corridor_half_width_m: -1.0, ..PipelineConfig::default() };
        assert!(matches!(
            ObstaclePipeline::new(cfg),
            Err(PathSenseError::InvalidConfig(_))
        ));

        let huge = PipelineConfig { near_field_m: 1e6, bin_width_m: 1e-6, ..PipelineConfig::default() };
        assert!(matches!(
            ObstaclePipeline::new(huge),
            Err(PathSenseError::InvalidConfig(_))
        ));
    }

    // ── rotated poses ───────────────────────────────────────────────────────

    fn rotation(axis: nalgebra::Unit<Vector3<f32>>, angle: f32) -> Matrix4<f32> {
        UnitQuaternion::from_axis_angle(&axis, angle).to_homogeneous()
    }

    #[test]
    fn pitched_camera_is_rotated_into_world_before_binning() {
        // Looking 60° down: a return 3.05 m along the optical axis is
        // 3.05 · cos 60° ≈ 1.525 m ahead horizontally.
        let mut f = frame(
            (0..150)
                .map(|i| DepthSample::new(-0.3 + 0.004 * i as f32, 0.0, -3.05))
                .collect(),
            Vec::new(),
        );
        f.pose = CameraPose::new(rotation(Vector3::x_axis(), -FRAC_PI_3));

        let obstacles = pipeline().detect_obstacles(&f).unwrap();
        assert_eq!(obstacles.len(), 1, "got {obstacles:?}");
        assert!((obstacles[0] - 1.5).abs() < 1e-4);
    }

    #[test]
    fn yawed_and_pitched_pose_matches_stage_composition() {
        let pose = CameraPose::new(
            Matrix4::new_translation(&Vector3::new(3.0, 1.4, -7.0))
                * rotation(Vector3::y_axis(), FRAC_PI_6)
                * rotation(Vector3::x_axis(), -0.35),
        );

        // Choose camera-local samples that land on a corridor cluster at
        // z = -1.25 once rotated into world and yaw-stabilized.
        let unstabilize = YawRotation::from_pose(&pose).inverse();
        let world_to_camera = pose.rotation().transpose();
        let samples: Vec<DepthSample> = (0..150)
            .map(|i| {
                let target = Vector3::new(-0.4 + 0.8 * (i % 20) as f32 / 20.0, 0.0, -1.25);
                let p = world_to_camera * unstabilize.apply(&target);
                DepthSample::new(p.x, p.y, p.z)
            })
            .collect();

        for s in &samples {
            let q = yaw_stabilize(&to_world(&s.position(), &pose), &pose);
            assert!((q.z + 1.25).abs() < 1e-4);
        }

        let mut f = frame(samples, Vec::new());
        f.pose = pose;
        let report = pipeline().process(&f).unwrap();
        assert_eq!(report.isolated_points, 150);
        assert_eq!(report.obstacles.len(), 1, "got {:?}", report.obstacles);
        assert!((report.obstacles[0] - 1.2).abs() < 1e-4);

        // The same samples under an identity pose are scattered.
        let mut unposed = f.clone();
        unposed.pose = CameraPose::identity();
        assert_ne!(pipeline().process(&unposed).unwrap().obstacles, report.obstacles);
    }

    #[test]
    fn wall_ahead_of_a_turned_camera_is_announced_and_kept() {
        let camera_at = Vector3::new(5.0, 1.4, 3.0);
        let turn = rotation(Vector3::y_axis(), FRAC_PI_6);
        let pose = CameraPose::new(Matrix4::new_translation(&camera_at) * turn);

        // Two metres along the camera's forward (−Z) axis, facing back at it.
        let forward = -pose.basis_z();
        let wall = PlaneAnchor::new(
            PlaneClassification::Wall,
            PlaneExtent { width: 3.0, depth: 2.5 },
            Matrix4::new_translation(&(camera_at + forward * 2.0))
                * turn
                * rotation(Vector3::x_axis(), FRAC_PI_2),
        );

        let mut floor_m = Matrix4::identity();
        floor_m[(0, 3)] = camera_at.x;
        floor_m[(1, 3)] = camera_at.y - 1.0;
        floor_m[(2, 3)] = camera_at.z;
        let floor = PlaneAnchor::new(
            PlaneClassification::Floor,
            PlaneExtent { width: 10.0, depth: 10.0 },
            floor_m,
        );

        let mut samples = cluster(150, -1.95);
        samples.extend((0..200).map(|i| DepthSample::new(0.0, -1.0, -0.5 - 0.01 * i as f32)));

        let mut f = frame(samples, vec![wall.clone(), floor]);
        f.pose = pose;
        let report = pipeline().process(&f).unwrap();

        let wall_decision = report.plane_decisions[0];
        assert_eq!(wall_decision.plane_id, wall.id);
        assert!(wall_decision.announce);
        assert!(!wall_decision.filter_occluded);
        assert!(report.plane_decisions[1].filter_occluded);
        assert_eq!(report.retained_points, 150, "wall points stay, floor points go");
    }
}
