//! In-plane orientation of a target from straight edges inside its bounding box.

use circletrack_core::Circle;
use image::GrayImage;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions};

use crate::params::OrientationParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fold a line normal angle from `[0, 180)` into `(-90, 90]`.
#[inline]
pub fn fold_line_angle(deg: f32) -> f32 {
    if deg > 90.0 {
        deg - 180.0
    } else {
        deg
    }
}

/// Median of the folded angles with `|a| < max_abs_deg`, or 0 when none remain.
///
/// An even count averages the two middle values.
pub fn orientation_from_angles(raw_deg: &[f32], max_abs_deg: f32) -> f32 {
    let mut kept: Vec<f32> = raw_deg
        .iter()
        .map(|&a| fold_line_angle(a))
        .filter(|a| a.abs() < max_abs_deg)
        .collect();
    if kept.is_empty() {
        return 0.0;
    }
    kept.sort_by(|a, b| a.total_cmp(b));
    let mid = kept.len() / 2;
    if kept.len() % 2 == 0 {
        0.5 * (kept[mid - 1] + kept[mid])
    } else {
        kept[mid]
    }
}

/// Raw straight-line angles (degrees, `[0, 180)`) in the circle's clipped box.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(gray, params), fields(x = circle.x, y = circle.y, r = circle.r))
)]
pub fn line_angles_in_circle(
    gray: &GrayImage,
    circle: &Circle,
    params: &OrientationParams,
) -> Vec<f32> {
    let Some([x0, y0, x1, y1]) = circle.clipped_bounds(gray.width(), gray.height()) else {
        return Vec::new();
    };
    let roi = image::imageops::crop_imm(gray, x0, y0, x1 - x0, y1 - y0).to_image();
    if roi.width() < 3 || roi.height() < 3 {
        return Vec::new();
    }

    let edges = canny(&roi, params.canny_low, params.canny_high);
    let options = LineDetectionOptions {
        vote_threshold: params.vote_threshold,
        suppression_radius: params.suppression_radius,
    };
    detect_lines(&edges, options)
        .into_iter()
        .map(|line| line.angle_in_degrees as f32)
        .collect()
}

/// Orientation estimate for a selected circle.
pub fn estimate_orientation(gray: &GrayImage, circle: &Circle, params: &OrientationParams) -> f32 {
    let angles = line_angles_in_circle(gray, circle, params);
    orientation_from_angles(&angles, params.max_abs_angle_deg)
}
