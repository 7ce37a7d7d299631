//! JSON configuration for the tracker.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use circletrack_detect::PipelineParams;
use serde::{Deserialize, Serialize};

use crate::command::PollerConfig;
use crate::stability::{StabilityTracker, DEFAULT_STABLE_THRESHOLD};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Remote command endpoints and timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// GET endpoint polled for the current command.
    pub poll_url: String,
    /// POST endpoint used by `circletrack send`.
    pub send_url: String,
    pub poll_interval_ms: u64,
    pub retry_delay_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            poll_url: "https://api-server-huax.onrender.com/get_command".to_string(),
            send_url: "https://api-server-huax.onrender.com/send_command".to_string(),
            poll_interval_ms: 1000,
            retry_delay_ms: 2000,
            request_timeout_ms: 5000,
        }
    }
}

impl CommandConfig {
    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Consecutive identical selections required; promotion needs `>`.
    pub threshold: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_STABLE_THRESHOLD,
        }
    }
}

impl StabilityConfig {
    pub fn tracker(&self) -> StabilityTracker {
        StabilityTracker::new(self.threshold)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory of input frames.
    pub input_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub output_dir: PathBuf,
    /// Quit after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("circletrack_out"),
            max_frames: None,
        }
    }
}

/// Top-level config document. Every section is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub command: CommandConfig,
    pub pipeline: PipelineParams,
    pub stability: StabilityConfig,
    pub source: SourceConfig,
    pub sink: SinkConfig,
}

impl AppConfig {
    /// Load a JSON config from disk and validate it.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let circles = &self.pipeline.circles;
        if circles.dp.is_nan() || circles.dp <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pipeline.circles.dp must be positive, got {}",
                circles.dp
            )));
        }
        if circles.min_radius == 0 || circles.min_radius > circles.max_radius {
            return Err(ConfigError::Invalid(format!(
                "pipeline.circles radius window [{}, {}] is empty",
                circles.min_radius, circles.max_radius
            )));
        }
        if self.command.poll_interval_ms == 0 || self.command.retry_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "command poll intervals must be non-zero".to_string(),
            ));
        }
        if self.command.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "command.request_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_pipeline_constants() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.stability.threshold, 5);
        assert_eq!(cfg.command.poller(), PollerConfig::default());
        assert_eq!(cfg.command.request_timeout(), Duration::from_secs(5));
        approx::assert_abs_diff_eq!(cfg.pipeline.circles.min_dist, 80.0);
        approx::assert_abs_diff_eq!(cfg.pipeline.blur_sigma, 2.0);
    }

    #[test]
    fn empty_document_is_default() {
        let cfg: AppConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.pipeline.circles.dp = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::default();
        cfg.pipeline.circles.min_radius = 120;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::default();
        cfg.command.retry_delay_ms = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
