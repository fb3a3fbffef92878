//! Feedback events and the [`FeedbackSink`] seam to speech/haptic output.

use serde::Serialize;
use tracing::info;

/// One piece of feedback for the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FeedbackEvent {
    /// Text to be spoken.
    Speak(String),
    /// Haptic pulse with intensity in `[0, 1]`.
    Vibrate(f32),
}

/// A speech synthesizer, screen reader, or vibration motor.
///
/// Platform layers implement this trait; the feedback policy only decides
/// *what* to say or pulse.
pub trait FeedbackSink {
    fn deliver(&mut self, event: &FeedbackEvent);

    fn deliver_all(&mut self, events: &[FeedbackEvent]) {
        for event in events {
            self.deliver(event);
        }
    }
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn deliver(&mut self, event: &FeedbackEvent) {
        match event {
            FeedbackEvent::Speak(text) => info!(target: "pathsense::speech", %text, "speak"),
            FeedbackEvent::Vibrate(intensity) => {
                info!(target: "pathsense::haptics", intensity, "vibrate")
            }
        }
    }
}

/// Keeps every delivered event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<FeedbackEvent>,
}

impl RecordingSink {
    /// Spoken phrases only, in delivery order.
    pub fn spoken(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FeedbackEvent::Speak(text) => Some(text.as_str()),
                FeedbackEvent::Vibrate(_) => None,
            })
            .collect()
    }
}

impl FeedbackSink for RecordingSink {
    fn deliver(&mut self, event: &FeedbackEvent) {
        self.events.push(event.clone());
    }
}
