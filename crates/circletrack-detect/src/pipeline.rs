use circletrack_core::{Circle, DetectionResult, TargetMeasurement};
use image::{GrayImage, RgbImage};
use log::{debug, warn};

use crate::foreign::scan_foreign_objects;
use crate::hough::{detect_circles, CircleCandidate};
use crate::orientation::estimate_orientation;
use crate::params::PipelineParams;
use crate::preprocess::{smooth, to_intensity};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Per-frame detection: circle target, its offset and orientation, and
/// foreign objects.
///
/// The circle detector and the foreign-object scan run on every frame; the
/// `armed` flag only decides whether the first circle candidate is selected
/// and measured.
#[derive(Clone, Debug, Default)]
pub struct DetectionPipeline {
    params: PipelineParams,
}

impl DetectionPipeline {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    /// Process one color frame.
    pub fn process(&self, frame: &RgbImage, armed: bool) -> DetectionResult {
        self.process_intensity(&to_intensity(frame), armed)
    }

    /// Process a frame already converted to intensity.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, gray), fields(width = gray.width(), height = gray.height()))
    )]
    pub fn process_intensity(&self, gray: &GrayImage, armed: bool) -> DetectionResult {
        let (width, height) = gray.dimensions();
        let blurred = smooth(gray, self.params.blur_sigma);
        let candidates = detect_circles(&blurred, &self.params.circles);

        let target = select_target(&candidates, armed).map(|circle| TargetMeasurement {
            circle,
            error: circle.error_from_center(width, height),
            orientation_deg: estimate_orientation(gray, &circle, &self.params.orientation),
        });

        let foreign_objects = scan_foreign_objects(gray, &self.params.foreign);
        if !foreign_objects.is_empty() {
            warn!("foreign object detected ({} contours)", foreign_objects.len());
        }

        debug!(
            "frame {width}x{height}: {} candidates, armed={armed}, target={:?}",
            candidates.len(),
            target.map(|t| t.circle)
        );

        DetectionResult {
            width,
            height,
            armed,
            num_candidates: candidates.len(),
            target,
            foreign_objects,
        }
    }
}

/// The first candidate in detector order when armed; nothing otherwise.
pub fn select_target(candidates: &[CircleCandidate], armed: bool) -> Option<Circle> {
    if !armed {
        return None;
    }
    candidates
        .first()
        .map(|c| Circle::from_subpixel(c.center.x, c.center.y, c.radius))
}
