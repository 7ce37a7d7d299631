use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use super::{Command, CommandError, CommandSource, EnabledFlag};

/// Poll timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    /// Sleep after a successful poll.
    pub interval: Duration,
    /// Sleep after a failed poll; fixed, never grows.
    pub retry_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl PollerConfig {
    /// How long to wait before the next poll.
    pub fn delay_after(&self, outcome: &PollOutcome) -> Duration {
        match outcome {
            PollOutcome::Applied(_) => self.interval,
            PollOutcome::Failed(_) => self.retry_delay,
        }
    }
}

/// Result of one poll cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The reply was read and the flag now reflects this command.
    Applied(Command),
    /// The request failed; the flag was left untouched.
    Failed(CommandError),
}

/// Run a single poll cycle against `source`, updating `flag` on success.
pub fn poll_once<S: CommandSource + ?Sized>(source: &mut S, flag: &EnabledFlag) -> PollOutcome {
    match source.fetch() {
        Ok(reply) => {
            let command = Command::from_reply(&reply);
            let armed = command.is_armed();
            let previous = flag.set(armed);
            if previous != armed {
                info!("server command: {command}, armed={armed}");
            } else {
                debug!("server command: {command}, armed={armed}");
            }
            PollOutcome::Applied(command)
        }
        Err(err) => {
            warn!("command fetch failed: {err}");
            PollOutcome::Failed(err)
        }
    }
}

/// Background thread that keeps an [`EnabledFlag`] in sync with a
/// [`CommandSource`].
pub struct CommandPoller;

impl CommandPoller {
    /// Spawn the poller on a thread named `command-poller`.
    ///
    /// The thread runs until the returned handle is stopped or dropped. Its
    /// sleeps wake immediately on stop; an in-flight request is bounded by
    /// the source's own timeout.
    pub fn spawn<S>(
        mut source: S,
        flag: EnabledFlag,
        config: PollerConfig,
    ) -> std::io::Result<PollerHandle>
    where
        S: CommandSource + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name("command-poller".to_string())
            .spawn(move || {
                info!(
                    "command poller started (interval {:?}, retry {:?})",
                    config.interval, config.retry_delay
                );
                loop {
                    let outcome = poll_once(&mut source, &flag);
                    let delay = config.delay_after(&outcome);
                    match stop_rx.recv_timeout(delay) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("command poller stopped");
            })?;
        Ok(PollerHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
        })
    }
}

/// Stop-and-join handle for a running [`CommandPoller`].
pub struct PollerHandle {
    stop_tx: Option<mpsc::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the poller and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(|j| j.is_finished())
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("command poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
