//! [`FrameGate`] – minimum-interval admission for sensor frames.
//!
//! The obstacle core assumes calls never overlap and arrive at a bounded
//! rate.  The gate enforces that from the caller's side: a frame is admitted
//! only when strictly more than `min_interval` has passed since the last
//! admitted frame.
//!
//! Time is passed in as the elapsed [`Duration`] since the session started,
//! so recorded sessions replay exactly like live ones.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pathsense_feedback::FrameGate;
//!
//! let mut gate = FrameGate::new(Duration::from_millis(750));
//! assert!(gate.admit(Duration::from_millis(0)));
//! assert!(!gate.admit(Duration::from_millis(500)));
//! assert!(gate.admit(Duration::from_millis(800)));
//! ```

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FrameGate {
    min_interval: Duration,
    last_admitted: Option<Duration>,
}

impl FrameGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: None,
        }
    }

    /// Decide whether the frame captured at `elapsed` should be processed.
    ///
    /// The first frame is always admitted.  A timestamp earlier than the last
    /// admitted frame is rejected.
    pub fn admit(&mut self, elapsed: Duration) -> bool {
        let open = match self.last_admitted {
            None => true,
            Some(last) => elapsed
                .checked_sub(last)
                .is_some_and(|gap| gap > self.min_interval),
        };
        if open {
            self.last_admitted = Some(elapsed);
        }
        open
    }

    pub fn last_admitted(&self) -> Option<Duration> {
        self.last_admitted
    }
}
