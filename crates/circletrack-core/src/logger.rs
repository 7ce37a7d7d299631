//! Logging for the tracker binary and tests.
//!
//! The stderr logger writes one line per record:
//!
//! ```text
//! [   1.204s  INFO command-poller circletrack::command::poller] server command: start, armed=true
//! ```
//!
//! The thread column separates the frame loop (`main`) from the background
//! `command-poller`. Records from dependencies (HTTP client, image codecs)
//! are capped at `info` so `--log-level debug` stays about the tracker.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

const OWN_TARGET_PREFIX: &str = "circletrack";
const DEPENDENCY_MAX_LEVEL: Level = Level::Info;

fn is_own_target(target: &str) -> bool {
    target.starts_with(OWN_TARGET_PREFIX)
}

fn format_line(
    elapsed_s: f64,
    level: Level,
    thread: Option<&str>,
    target: &str,
    args: &fmt::Arguments<'_>,
) -> String {
    format!(
        "[{elapsed_s:8.3}s {level:>5} {} {target}] {args}",
        thread.unwrap_or("-")
    )
}

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let level = metadata.level();
        level <= self.level && (level <= DEPENDENCY_MAX_LEVEL || is_own_target(metadata.target()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let current = std::thread::current();
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            current.name(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// `EnvFilter` directive used when `RUST_LOG` is not set: the requested level
/// for the tracker crates, dependencies capped like the stderr logger.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn default_directive(level: LevelFilter) -> String {
    let own = level.to_string().to_lowercase();
    let deps = level.min(DEPENDENCY_MAX_LEVEL.to_level_filter());
    format!("{},{OWN_TARGET_PREFIX}={own}", deps.to_string().to_lowercase())
}

/// Install a `tracing-subscriber` formatter.
///
/// `RUST_LOG` wins when set; otherwise `level` seeds the filter.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_thread_names(true);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::MetadataBuilder;

    fn logger(level: LevelFilter) -> StderrLogger {
        StderrLogger {
            level,
            started: Instant::now(),
        }
    }

    fn meta(level: Level, target: &str) -> Metadata<'_> {
        MetadataBuilder::new().level(level).target(target).build()
    }

    #[test]
    fn line_carries_thread_and_target() {
        let line = format_line(
            1.5,
            Level::Info,
            Some("command-poller"),
            "circletrack::command::poller",
            &format_args!("armed={}", true),
        );
        assert_eq!(
            line,
            "[   1.500s  INFO command-poller circletrack::command::poller] armed=true"
        );
    }

    #[test]
    fn unnamed_thread_shows_a_dash() {
        let line = format_line(0.0, Level::Warn, None, "x", &format_args!("m"));
        assert!(line.contains(" WARN - x]"), "{line}");
    }

    #[test]
    fn dependency_debug_records_are_dropped() {
        let l = logger(LevelFilter::Debug);
        assert!(l.enabled(&meta(Level::Debug, "circletrack_detect::pipeline")));
        assert!(!l.enabled(&meta(Level::Debug, "ureq::unit")));
        assert!(l.enabled(&meta(Level::Info, "ureq::unit")));
        assert!(!l.enabled(&meta(Level::Trace, "circletrack::runner")));
    }

    #[test]
    fn default_directive_follows_requested_level() {
        assert_eq!(
            default_directive(LevelFilter::Debug),
            "info,circletrack=debug"
        );
        assert_eq!(default_directive(LevelFilter::Warn), "warn,circletrack=warn");
    }
}
