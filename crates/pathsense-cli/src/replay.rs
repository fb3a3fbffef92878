//! Frame replay – drives the obstacle pipeline and the feedback session over
//! recorded frames the way a live capture loop would.

use std::time::Duration;

use pathsense_feedback::{FeedbackEvent, FeedbackSession, FeedbackSink, FrameGate};
use pathsense_perception::ObstaclePipeline;
use pathsense_types::{FrameReport, PathSenseError, SensorFrame};
use tracing::{debug, warn};

use crate::config::Config;

/// What happened to one recorded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Arrived inside the minimum frame interval and was dropped.
    Skipped,
    /// Admitted but rejected by the pipeline.  Later frames are unaffected.
    Rejected(PathSenseError),
    /// Processed; `events` (speech, then one frame interval of haptic pulses)
    /// were delivered to the sink.
    Processed {
        report: FrameReport,
        events: Vec<FeedbackEvent>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub index: usize,
    pub timestamp_s: f64,
    pub outcome: FrameOutcome,
}

pub struct Replay {
    pipeline: ObstaclePipeline,
    session: FeedbackSession,
    gate: FrameGate,
}

impl Replay {
    pub fn new(cfg: &Config) -> Result<Self, PathSenseError> {
        Ok(Self {
            pipeline: ObstaclePipeline::new(cfg.pipeline.clone())?,
            session: FeedbackSession::new(
                cfg.feedback.clone(),
                cfg.session.clone(),
                cfg.lidar_available,
            ),
            gate: FrameGate::new(cfg.session.frame_interval()),
        })
    }

    pub fn session(&self) -> &FeedbackSession {
        &self.session
    }

    /// Deliver the startup greeting.
    pub fn startup<S: FeedbackSink>(&mut self, sink: &mut S) -> Vec<FeedbackEvent> {
        let events = self.session.startup();
        sink.deliver_all(&events);
        events
    }

    /// Gate, process and announce one frame.
    pub fn step<S: FeedbackSink>(
        &mut self,
        index: usize,
        frame: &SensorFrame,
        sink: &mut S,
    ) -> ReplayStep {
        let elapsed = capture_offset(frame.timestamp_s);
        let outcome = if !self.gate.admit(elapsed) {
            debug!(
                index,
                timestamp_s = frame.timestamp_s,
                last_admitted = ?self.gate.last_admitted(),
                "frame skipped by gate"
            );
            FrameOutcome::Skipped
        } else {
            match self.pipeline.process(frame) {
                Ok(report) => {
                    let mut events = self.session.on_frame(&report, elapsed);
                    events.extend(self.session.haptic_burst());
                    sink.deliver_all(&events);
                    FrameOutcome::Processed { report, events }
                }
                Err(e) => {
                    warn!(index, error = %e, "frame rejected");
                    FrameOutcome::Rejected(e)
                }
            }
        };
        ReplayStep {
            index,
            timestamp_s: frame.timestamp_s,
            outcome,
        }
    }

    /// Replay every frame in order.
    pub fn run<S: FeedbackSink>(&mut self, frames: &[SensorFrame], sink: &mut S) -> Vec<ReplayStep> {
        frames
            .iter()
            .enumerate()
            .map(|(i, frame)| self.step(i, frame, sink))
            .collect()
    }
}

/// Negative, NaN and overflowing timestamps collapse to zero.
fn capture_offset(timestamp_s: f64) -> Duration {
    Duration::try_from_secs_f64(timestamp_s).unwrap_or(Duration::ZERO)
}
