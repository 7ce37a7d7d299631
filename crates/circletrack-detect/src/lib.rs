//! Per-frame detection pipeline for the circletrack target tracker.
//!
//! Stages, in order:
//! - intensity conversion and Gaussian smoothing ([`preprocess`]),
//! - gradient Hough circle detection ([`hough`]),
//! - selection of the first candidate when armed, positional error and
//!   in-circle line orientation ([`orientation`]),
//! - a whole-frame scan for triangular contours ([`foreign`]).
//!
//! ```no_run
//! use circletrack_detect::{DetectionPipeline, PipelineParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = image::open("frame.png")?.to_rgb8();
//! let pipeline = DetectionPipeline::new(PipelineParams::default());
//! let result = pipeline.process(&frame, true);
//! println!("target: {:?}", result.selected_circle());
//! # Ok(())
//! # }
//! ```

pub mod foreign;
pub mod hough;
pub mod orientation;
mod params;
mod pipeline;
pub mod preprocess;

pub use hough::{detect_circles, CircleCandidate};
pub use params::{ForeignObjectParams, HoughCircleParams, OrientationParams, PipelineParams};
pub use pipeline::{select_target, DetectionPipeline};
