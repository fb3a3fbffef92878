//! `pathsense-feedback` – the calling layer around the obstacle core.
//!
//! The core answers "what is ahead in this frame"; this crate decides how
//! often to ask and what the user hears or feels about the answer.
//!
//! # Modules
//!
//! - [`gate`] – [`FrameGate`][gate::FrameGate]: minimum-interval frame
//!   admission, so at most one pipeline pass is in flight.
//! - [`session`] – [`FeedbackSession`][session::FeedbackSession]: startup
//!   greeting, clutter warnings, spoken distances, haptic pulses.
//! - [`callouts`] – [`CalloutTracker`][callouts::CalloutTracker]: one
//!   callout per newly announceable plane.
//! - [`settings`] – [`FeedbackSettings`][settings::FeedbackSettings] and
//!   [`SessionConfig`][settings::SessionConfig].
//! - [`sink`] – [`FeedbackSink`][sink::FeedbackSink]: the seam to speech and
//!   vibration hardware.

pub mod callouts;
pub mod gate;
pub mod session;
pub mod settings;
pub mod sink;

pub use callouts::CalloutTracker;
pub use gate::FrameGate;
pub use session::{format_distance, haptic_intensity, FeedbackSession};
pub use settings::{FeedbackSettings, SessionConfig, Units};
pub use sink::{FeedbackEvent, FeedbackSink, LogSink, RecordingSink};
