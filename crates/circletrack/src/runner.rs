//! The per-frame main loop.

use circletrack_detect::DetectionPipeline;
use log::{debug, info, warn};

use crate::capture::{CaptureError, Frame, FrameSource, ReleaseGuard};
use crate::command::EnabledFlag;
use crate::config::ConfigError;
use crate::sink::{FrameSink, SinkError, SinkEvent};
use crate::stability::{StabilityTracker, TrackUpdate};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start command poller: {0}")]
    Poller(#[source] std::io::Error),
}

/// Why the loop ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The sink asked to quit.
    Quit,
    /// The source ran out of frames.
    EndOfStream,
    /// Frame acquisition failed; carries the error message.
    CaptureFailed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub exit: LoopExit,
}

/// Single-threaded frame loop.
///
/// Each iteration pulls a frame, reads the armed flag once, runs detection,
/// updates the tracker and presents the result. The source is released on
/// every exit path, including sink errors.
pub struct FrameLoop {
    pipeline: DetectionPipeline,
    tracker: StabilityTracker,
    flag: EnabledFlag,
}

impl FrameLoop {
    pub fn new(pipeline: DetectionPipeline, tracker: StabilityTracker, flag: EnabledFlag) -> Self {
        Self {
            pipeline,
            tracker,
            flag,
        }
    }

    pub fn tracker(&self) -> &StabilityTracker {
        &self.tracker
    }

    /// Run until quit, end of stream or capture failure.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<LoopSummary, RunError>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let mut guard = ReleaseGuard::new(source);
        let mut frames = 0u64;
        info!("frame loop started");

        let exit = loop {
            let frame = match guard.source().next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break LoopExit::EndOfStream,
                Err(err) => {
                    warn!("frame acquisition failed: {err}");
                    break LoopExit::CaptureFailed(err.to_string());
                }
            };

            let event = self.step(&frame, sink)?;
            frames += 1;
            if event == SinkEvent::Quit {
                break LoopExit::Quit;
            }
        };

        info!("frame loop stopped after {frames} frames: {exit:?}");
        Ok(LoopSummary { frames, exit })
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(frame = frame.index))
    )]
    fn step<K: FrameSink + ?Sized>(
        &mut self,
        frame: &Frame,
        sink: &mut K,
    ) -> Result<SinkEvent, SinkError> {
        let armed = self.flag.get();
        let detection = self.pipeline.process(&frame.image, armed);
        let update = self.tracker.update(detection.selected_circle());
        match update {
            TrackUpdate::Observed {
                stable_count,
                promoted,
            } => debug!(
                "frame {}: armed={armed} candidates={} stable_count={stable_count} promoted={promoted}",
                frame.index, detection.num_candidates
            ),
            TrackUpdate::Fallback(valid) => debug!(
                "frame {}: armed={armed} candidates={} no selection, last valid {valid:?}",
                frame.index, detection.num_candidates
            ),
        }
        sink.present(frame, &detection, self.tracker.state())
    }
}
