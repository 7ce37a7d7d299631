//! Core types and utilities for the circletrack target tracker.
//!
//! This crate is intentionally small: it holds the per-frame data model shared
//! by the detection pipeline, the stability tracker and the frame sinks, plus
//! the workspace logger. It does *not* depend on any image library.

mod circle;
mod detection;
mod logger;

pub use circle::{frame_center, Circle, PositionalError};
pub use detection::{DetectionResult, ForeignObject, TargetMeasurement};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
