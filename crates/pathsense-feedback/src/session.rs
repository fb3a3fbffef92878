//! [`FeedbackSession`] – turns per-frame obstacle reports into speech and
//! haptic events.
//!
//! All cross-frame bookkeeping lives here, never in the obstacle core:
//!
//! - the one-time startup greeting (or the missing-LiDAR warning);
//! - the cluttered-environment warning, long form once and short form after;
//! - the closest obstacle, which drives the haptic pulse loop;
//! - plane callouts via [`CalloutTracker`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pathsense_feedback::{FeedbackEvent, FeedbackSession, FeedbackSettings, SessionConfig};
//! use pathsense_types::FrameReport;
//!
//! let mut session =
//!     FeedbackSession::new(FeedbackSettings::default(), SessionConfig::default(), true);
//! let report = FrameReport { obstacles: vec![2.0, 1.2], ..FrameReport::default() };
//!
//! let events = session.on_frame(&report, Duration::from_secs(5));
//! assert_eq!(events, vec![FeedbackEvent::Speak("1.2".to_string())]);
//! assert!(matches!(session.haptic_tick(), Some(FeedbackEvent::Vibrate(_))));
//! ```

use std::time::Duration;

use pathsense_types::FrameReport;
use tracing::debug;

use crate::callouts::{callout_phrase, CalloutTracker};
use crate::settings::{FeedbackSettings, SessionConfig, Units};
use crate::sink::FeedbackEvent;

const FEET_PER_METER: f32 = 3.28;

const GREETING: &str = "Announcing object distances from camera in meters. \
Press meter or feet button to switch units. \
Press haptic or voice button to customize feedback.";
const NO_LIDAR_WARNING: &str = "Warning. Your device is not equipped with a LiDAR sensor. \
Object detection is not available.";
const CLUTTER_FIRST: &str =
    "Warning. You are in a cluttered environment. Obstacle detection accuracy will be low.";
const CLUTTER_REPEAT: &str = "Warning. Cluttered environment.";

/// Spoken form of a distance, to one decimal place.
pub fn format_distance(meters: f32, units: Units) -> String {
    let value = match units {
        Units::Meters => (meters * 10.0).round() / 10.0,
        Units::Feet => (meters * 10.0 * FEET_PER_METER).round() / 10.0,
    };
    format!("{value:.1}")
}

/// Vibration strength for an obstacle `distance` metres away.
///
/// `min(1 / (2·(d − 0.2)) + 0.1, 1)`; anything at or inside 0.2 m pulses at
/// full strength.  Always in `(0.1, 1]`.
pub fn haptic_intensity(distance: f32) -> f32 {
    if distance <= 0.2 {
        return 1.0;
    }
    (1.0 / (2.0 * (distance - 0.2)) + 0.1).min(1.0)
}

#[derive(Debug)]
pub struct FeedbackSession {
    settings: FeedbackSettings,
    config: SessionConfig,
    lidar_available: bool,
    said_startup: bool,
    said_cluttered: bool,
    closest_obstacle: Option<f32>,
    callouts: CalloutTracker,
}

impl FeedbackSession {
    pub fn new(settings: FeedbackSettings, config: SessionConfig, lidar_available: bool) -> Self {
        Self {
            settings,
            config,
            lidar_available,
            said_startup: false,
            said_cluttered: false,
            closest_obstacle: None,
            callouts: CalloutTracker::new(),
        }
    }

    /// Closest obstacle from the last non-cluttered frame.
    pub fn closest_obstacle(&self) -> Option<f32> {
        self.closest_obstacle
    }

    /// The greeting (or LiDAR warning), returned only on the first call.
    pub fn startup(&mut self) -> Vec<FeedbackEvent> {
        if self.said_startup {
            return Vec::new();
        }
        self.said_startup = true;
        let text = if self.lidar_available { GREETING } else { NO_LIDAR_WARNING };
        vec![FeedbackEvent::Speak(text.to_string())]
    }

    /// Apply the announcement policy to one processed frame.
    ///
    /// `elapsed` is the capture time relative to the session start.
    pub fn on_frame(&mut self, report: &FrameReport, elapsed: Duration) -> Vec<FeedbackEvent> {
        let mut events = Vec::new();
        let speaking = self.settings.voice && elapsed > self.config.startup_quiet();

        if report.obstacles.len() > self.config.clutter_limit {
            let text = if self.said_cluttered { CLUTTER_REPEAT } else { CLUTTER_FIRST };
            self.said_cluttered = true;
            events.push(FeedbackEvent::Speak(text.to_string()));
        } else {
            self.closest_obstacle = report.closest_obstacle();
            if let Some(closest) = self.closest_obstacle
                && speaking
            {
                events.push(FeedbackEvent::Speak(format_distance(closest, self.settings.units)));
            }
        }

        let fresh = self.callouts.update(&report.plane_decisions);
        if speaking {
            events.extend(
                fresh
                    .iter()
                    .map(|d| FeedbackEvent::Speak(callout_phrase(d.classification))),
            );
        }

        debug!(
            obstacles = report.obstacles.len(),
            closest = ?self.closest_obstacle,
            callouts = self.callouts.active(),
            events = events.len(),
            "feedback evaluated"
        );
        events
    }

    /// One tick of the haptic loop: a pulse for the current closest obstacle.
    pub fn haptic_tick(&self) -> Option<FeedbackEvent> {
        if !self.settings.haptic {
            return None;
        }
        self.closest_obstacle
            .map(|d| FeedbackEvent::Vibrate(haptic_intensity(d)))
    }

    /// The haptic pulses for one frame interval: one tick per haptic period.
    pub fn haptic_burst(&self) -> Vec<FeedbackEvent> {
        match self.haptic_tick() {
            Some(pulse) => vec![pulse; self.config.haptic_ticks_per_frame()],
            None => Vec::new(),
        }
    }
}
