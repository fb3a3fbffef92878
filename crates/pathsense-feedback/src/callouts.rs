//! [`CalloutTracker`] – one spoken callout per plane sighting.
//!
//! The core flags planes worth announcing every frame.  The tracker turns
//! that level signal into edges: a plane is called out when its `announce`
//! flag turns on, stays quiet while it remains on, and becomes eligible again
//! once it turns off or the plane disappears.

use std::collections::HashSet;

use pathsense_types::{PlaneClassification, PlaneDecision};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct CalloutTracker {
    announcing: HashSet<Uuid>,
}

impl CalloutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's decisions; returns the planes that just became
    /// announceable, in input order.
    pub fn update(&mut self, decisions: &[PlaneDecision]) -> Vec<PlaneDecision> {
        let current: HashSet<Uuid> = decisions
            .iter()
            .filter(|d| d.announce)
            .map(|d| d.plane_id)
            .collect();

        let fresh = decisions
            .iter()
            .filter(|d| d.announce && !self.announcing.contains(&d.plane_id))
            .copied()
            .collect();

        self.announcing = current;
        fresh
    }

    /// Number of planes currently in their announced state.
    pub fn active(&self) -> usize {
        self.announcing.len()
    }
}

/// Phrase spoken for a newly announceable plane.
pub fn callout_phrase(classification: PlaneClassification) -> String {
    match classification {
        PlaneClassification::Wall | PlaneClassification::Door | PlaneClassification::Window => {
            format!("{classification} ahead")
        }
        other => format!("{other} visible"),
    }
}
