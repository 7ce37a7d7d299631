use serde::{Deserialize, Serialize};

use crate::{Circle, PositionalError};

/// Measurements computed for the circle selected in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetMeasurement {
    pub circle: Circle,
    pub error: PositionalError,
    /// Median in-plane orientation of straight edges inside the circle, degrees.
    pub orientation_deg: f32,
}

/// A contour flagged as a foreign object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignObject {
    /// Raw contour points `[x, y]` as traced from the edge map.
    pub contour: Vec<[i32; 2]>,
    /// Simplified polygon vertices (three for a foreign object).
    pub polygon: Vec<[i32; 2]>,
}

/// Output of one pass of the detection pipeline over a frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub width: u32,
    pub height: u32,
    /// Whether the armed flag was set when this frame was processed.
    pub armed: bool,
    /// Number of circle candidates the detector returned, armed or not.
    pub num_candidates: usize,
    /// Selected target, present only when armed and a candidate exists.
    pub target: Option<TargetMeasurement>,
    pub foreign_objects: Vec<ForeignObject>,
}

impl DetectionResult {
    /// The circle selected this frame, if any.
    pub fn selected_circle(&self) -> Option<Circle> {
        self.target.map(|t| t.circle)
    }

    /// Positional error of the selected circle, zero when nothing is selected.
    pub fn error(&self) -> PositionalError {
        self.target.map(|t| t.error).unwrap_or_default()
    }

    /// Orientation estimate of the selected circle, zero when nothing is selected.
    pub fn orientation_deg(&self) -> f32 {
        self.target.map(|t| t.orientation_deg).unwrap_or(0.0)
    }

    /// True when at least one foreign object was found this frame.
    pub fn foreign_object_detected(&self) -> bool {
        !self.foreign_objects.is_empty()
    }
}
