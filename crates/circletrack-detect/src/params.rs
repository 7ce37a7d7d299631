use serde::{Deserialize, Serialize};

/// Gradient Hough circle detector settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughCircleParams {
    /// Inverse accumulator resolution: 1.2 means one cell per 1.2 pixels.
    pub dp: f32,
    /// Minimum distance between accepted circle centers (pixels).
    pub min_dist: f32,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_threshold: f32,
    /// Minimum accumulator votes for a center candidate.
    pub acc_threshold: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Minimum fraction of the circumference covered by edge pixels
    /// for the radius estimate to be accepted.
    pub min_radius_support: f32,
}

impl Default for HoughCircleParams {
    fn default() -> Self {
        Self {
            dp: 1.2,
            min_dist: 80.0,
            canny_threshold: 50.0,
            acc_threshold: 30,
            min_radius: 5,
            max_radius: 100,
            min_radius_support: 0.35,
        }
    }
}

/// Settings for the in-circle orientation estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationParams {
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum Hough votes for a straight line.
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in the (r, theta) accumulator.
    pub suppression_radius: u32,
    /// Folded angles with `|a| >= max_abs_angle_deg` are discarded.
    pub max_abs_angle_deg: f32,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            vote_threshold: 30,
            suppression_radius: 1,
            max_abs_angle_deg: 45.0,
        }
    }
}

/// Settings for the whole-frame foreign-object scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignObjectParams {
    pub canny_low: f32,
    pub canny_high: f32,
    /// Simplification epsilon as a fraction of the closed contour perimeter.
    pub epsilon_frac: f64,
    /// Vertex count of a simplified polygon that marks a foreign object.
    pub vertex_count: usize,
}

impl Default for ForeignObjectParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            epsilon_frac: 0.02,
            vertex_count: 3,
        }
    }
}

/// Parameters for the full per-frame pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Gaussian sigma applied before circle detection (9x9 kernel equivalent).
    pub blur_sigma: f32,
    pub circles: HoughCircleParams,
    pub orientation: OrientationParams,
    pub foreign: ForeignObjectParams,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            circles: HoughCircleParams::default(),
            orientation: OrientationParams::default(),
            foreign: ForeignObjectParams::default(),
        }
    }
}
