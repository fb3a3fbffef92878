//! Per-session feedback preferences and timing.
//!
//! These are owned by whoever drives the session (UI, CLI) and handed to
//! [`FeedbackSession`][crate::session::FeedbackSession] explicitly; nothing
//! here is global.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unit used when speaking distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Meters,
    Feet,
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Meters => write!(f, "meters"),
            Units::Feet => write!(f, "feet"),
        }
    }
}

/// User-facing feedback switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSettings {
    #[serde(default)]
    pub units: Units,
    #[serde(default = "default_on")]
    pub haptic: bool,
    #[serde(default = "default_on")]
    pub voice: bool,
}

fn default_on() -> bool {
    true
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            units: Units::default(),
            haptic: true,
            voice: true,
        }
    }
}

impl FeedbackSettings {
    /// Flip haptics and return the confirmation phrase.
    pub fn toggle_haptic(&mut self) -> &'static str {
        self.haptic = !self.haptic;
        if self.haptic { "Haptic feedback on." } else { "Haptic feedback off." }
    }

    /// Flip voice and return the confirmation phrase.
    pub fn toggle_voice(&mut self) -> &'static str {
        self.voice = !self.voice;
        if self.voice { "Voice feedback on." } else { "Voice feedback off." }
    }

    /// Switch units.  Returns a phrase only when the unit actually changed.
    pub fn set_units(&mut self, units: Units) -> Option<String> {
        if self.units == units {
            return None;
        }
        self.units = units;
        Some(format!("Switched units to {units}"))
    }
}

/// Timing and policy knobs for the calling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum time between admitted frames (ms).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// No distances are spoken during this initial period (ms).
    #[serde(default = "default_startup_quiet_ms")]
    pub startup_quiet_ms: u64,

    /// More obstacles than this in one frame counts as clutter.
    #[serde(default = "default_clutter_limit")]
    pub clutter_limit: usize,

    /// Period of the haptic pulse loop (ms).
    #[serde(default = "default_haptic_period_ms")]
    pub haptic_period_ms: u64,
}

fn default_frame_interval_ms() -> u64 {
    750
}
fn default_startup_quiet_ms() -> u64 {
    4000
}
fn default_clutter_limit() -> usize {
    3
}
fn default_haptic_period_ms() -> u64 {
    20
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            startup_quiet_ms: default_startup_quiet_ms(),
            clutter_limit: default_clutter_limit(),
            haptic_period_ms: default_haptic_period_ms(),
        }
    }
}

impl SessionConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn startup_quiet(&self) -> Duration {
        Duration::from_millis(self.startup_quiet_ms)
    }

    pub fn haptic_period(&self) -> Duration {
        Duration::from_millis(self.haptic_period_ms)
    }

    /// Haptic pulses that fit into one frame interval, never fewer than one.
    pub fn haptic_ticks_per_frame(&self) -> usize {
        let period = self.haptic_period();
        if period.is_zero() {
            return 1;
        }
        ((self.frame_interval().as_nanos() / period.as_nanos()) as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_meters_with_everything_on() {
        let s = FeedbackSettings::default();
        assert_eq!(s.units, Units::Meters);
        assert!(s.haptic && s.voice);
    }

    #[test]
    fn toggles_report_new_state() {
        let mut s = FeedbackSettings::default();
        assert_eq!(s.toggle_haptic(), "Haptic feedback off.");
        assert!(!s.haptic);
        assert_eq!(s.toggle_haptic(), "Haptic feedback on.");
        assert_eq!(s.toggle_voice(), "Voice feedback off.");
        assert!(!s.voice);
    }

    #[test]
    fn set_units_is_silent_when_unchanged() {
        let mut s = FeedbackSettings::default();
        assert_eq!(s.set_units(Units::Meters), None);
        assert_eq!(s.set_units(Units::Feet).as_deref(), Some("Switched units to feet"));
        assert_eq!(s.units, Units::Feet);
    }

    #[test]
    fn session_config_durations() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.frame_interval(), Duration::from_millis(750));
        assert_eq!(cfg.startup_quiet(), Duration::from_secs(4));
        assert_eq!(cfg.haptic_period(), Duration::from_millis(20));
        assert_eq!(cfg.haptic_ticks_per_frame(), 37);
        assert_eq!(cfg.clutter_limit, 3);
    }

    #[test]
    fn haptic_ticks_never_drop_below_one() {
        let slow = SessionConfig { haptic_period_ms: 2000, ..SessionConfig::default() };
        assert_eq!(slow.haptic_ticks_per_frame(), 1);
        let off = SessionConfig { haptic_period_ms: 0, ..SessionConfig::default() };
        assert_eq!(off.haptic_ticks_per_frame(), 1);
    }
}
