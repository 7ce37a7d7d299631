//! Temporal confirmation of the selected circle.
//!
//! A circle becomes the confirmed ("valid") target once it has been selected
//! on more than `threshold` consecutive active frames with exactly the same
//! coordinates. Frames with no selection leave the state untouched.

use circletrack_core::Circle;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Consecutive matches required before promotion (promotion needs `> 5`).
pub const DEFAULT_STABLE_THRESHOLD: u32 = 5;

/// Tracker state; owned by the frame loop and never shared across threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityState {
    pub stable_count: u32,
    pub last_detected: Option<Circle>,
    pub last_valid: Option<Circle>,
}

/// What one tracker update did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackUpdate {
    /// A circle was selected this frame.
    Observed {
        stable_count: u32,
        /// True when this frame promoted the circle to `last_valid`.
        promoted: bool,
    },
    /// Nothing selected; the previously confirmed circle, if any.
    Fallback(Option<Circle>),
}

#[derive(Clone, Debug)]
pub struct StabilityTracker {
    threshold: u32,
    state: StabilityState,
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_THRESHOLD)
    }
}

impl StabilityTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            state: StabilityState::default(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn state(&self) -> &StabilityState {
        &self.state
    }

    /// Feed this frame's selection.
    pub fn update(&mut self, selected: Option<Circle>) -> TrackUpdate {
        let Some(circle) = selected else {
            if let Some(valid) = self.state.last_valid {
                debug!("tracking last valid circle {valid:?}");
            }
            return TrackUpdate::Fallback(self.state.last_valid);
        };

        let state = &mut self.state;
        let matches = state.last_detected.is_none_or(|last| last == circle);
        if matches {
            state.stable_count = state.stable_count.saturating_add(1);
        } else {
            state.stable_count = 0;
        }
        state.last_detected = Some(circle);

        let promoted = state.stable_count > self.threshold;
        if promoted {
            if state.last_valid != Some(circle) {
                info!(
                    "stable circle confirmed at ({}, {}) r={}",
                    circle.x, circle.y, circle.r
                );
            }
            state.last_valid = Some(circle);
        }

        TrackUpdate::Observed {
            stable_count: state.stable_count,
            promoted,
        }
    }
}
