//! Frame sinks.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use circletrack_core::{Circle, DetectionResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::capture::Frame;
use crate::overlay::render_overlay;
use crate::stability::StabilityState;

/// Name of the per-run report written by [`AnnotatedImageSink`].
pub const REPORT_FILE: &str = "report.jsonl";

/// What the loop should do after presenting a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    Continue,
    Quit,
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Receives every processed frame, once, in order.
///
/// The returned event is the per-frame quit poll.
pub trait FrameSink {
    fn present(
        &mut self,
        frame: &Frame,
        detection: &DetectionResult,
        stability: &StabilityState,
    ) -> Result<SinkEvent, SinkError>;
}

/// One line of `report.jsonl`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    pub armed: bool,
    pub target: Option<Circle>,
    pub error_x: i32,
    pub error_y: i32,
    pub orientation_deg: f32,
    pub foreign_object: bool,
    pub foreign_count: usize,
    pub stability: StabilityState,
}

impl FrameReport {
    pub fn new(frame: &Frame, detection: &DetectionResult, stability: &StabilityState) -> Self {
        let error = detection.error();
        Self {
            frame: frame.index,
            armed: detection.armed,
            target: detection.selected_circle(),
            error_x: error.x,
            error_y: error.y,
            orientation_deg: detection.orientation_deg(),
            foreign_object: detection.foreign_object_detected(),
            foreign_count: detection.foreign_objects.len(),
            stability: *stability,
        }
    }
}

/// Writes `frame_NNNNNN.png` overlays and a JSON-lines report into a
/// directory.
pub struct AnnotatedImageSink {
    dir: PathBuf,
    report: BufWriter<File>,
    max_frames: Option<u64>,
    written: u64,
}

impl AnnotatedImageSink {
    /// Create `dir` if needed and truncate its report.
    pub fn create(dir: impl AsRef<Path>, max_frames: Option<u64>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
            path: dir.clone(),
            source,
        })?;
        let report_path = dir.join(REPORT_FILE);
        let report = File::create(&report_path).map_err(|source| SinkError::Io {
            path: report_path,
            source,
        })?;
        info!("writing annotated frames to {}", dir.display());
        Ok(Self {
            dir,
            report: BufWriter::new(report),
            max_frames,
            written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }

    fn report_io(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.dir.join(REPORT_FILE),
            source,
        }
    }
}

impl FrameSink for AnnotatedImageSink {
    fn present(
        &mut self,
        frame: &Frame,
        detection: &DetectionResult,
        stability: &StabilityState,
    ) -> Result<SinkEvent, SinkError> {
        let path = self.frame_path(frame.index);
        render_overlay(&frame.image, detection, stability)
            .save(&path)
            .map_err(|source| SinkError::Encode {
                path: path.clone(),
                source,
            })?;

        let line = serde_json::to_string(&FrameReport::new(frame, detection, stability))?;
        writeln!(self.report, "{line}").map_err(|e| self.report_io(e))?;
        self.report.flush().map_err(|e| self.report_io(e))?;

        self.written += 1;
        debug!("wrote {}", path.display());

        match self.max_frames {
            Some(max) if self.written >= max => {
                info!("frame limit {max} reached");
                Ok(SinkEvent::Quit)
            }
            _ => Ok(SinkEvent::Continue),
        }
    }
}
