//! Live circle-target tracker.
//!
//! This crate wires the per-frame detection pipeline to a remote arming
//! channel and a display/recording sink:
//! - [`command`]: background poller that mirrors a remote `start`/`stop`
//!   command into an atomic [`EnabledFlag`](command::EnabledFlag);
//! - [`stability`]: promotes a circle to "confirmed" after enough identical
//!   consecutive selections;
//! - [`capture`] and [`sink`]: frame source and sink traits with
//!   image-directory implementations;
//! - [`overlay`]: draws the target, crosshairs, readouts and warnings;
//! - [`runner`]: the single-threaded frame loop.
//!
//! ## Quickstart
//!
//! ```no_run
//! use circletrack::capture::ImageSequenceSource;
//! use circletrack::command::EnabledFlag;
//! use circletrack::runner::FrameLoop;
//! use circletrack::sink::AnnotatedImageSink;
//! use circletrack::stability::StabilityTracker;
//! use circletrack::detect::DetectionPipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = ImageSequenceSource::open("frames")?;
//! let mut sink = AnnotatedImageSink::create("out", None)?;
//! let mut frame_loop = FrameLoop::new(
//!     DetectionPipeline::default(),
//!     StabilityTracker::default(),
//!     EnabledFlag::new(true),
//! );
//! let summary = frame_loop.run(&mut source, &mut sink)?;
//! println!("{} frames, exit {:?}", summary.frames, summary.exit);
//! # Ok(())
//! # }
//! ```

pub use circletrack_core as core;
pub use circletrack_detect as detect;

pub use circletrack_core::{Circle, DetectionResult, ForeignObject, PositionalError};

pub mod capture;
pub mod command;
pub mod config;
pub mod overlay;
pub mod runner;
pub mod sink;
pub mod stability;

pub use config::{AppConfig, ConfigError};
pub use runner::{FrameLoop, LoopExit, LoopSummary, RunError};
