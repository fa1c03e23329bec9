// ── Periodic polling ──
//
// A background task that fetches port data on a fixed period, derives
// rates and publishes the latest sample on a watch channel. Connection
// failures keep the previous sample and retry next period; an auth or
// parse failure ends the task and is reported by `join()`/`shutdown()`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{PollResult, PortIndex};
use crate::rate::{PortRates, RateTracker};
use crate::switch::Switch;

/// Shortest period a monitor will poll at.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// One successful poll together with the rates derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub poll: PollResult,
    pub rates: BTreeMap<PortIndex, PortRates>,
}

/// What subscribers see after every poll attempt.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// Most recent successful sample. Kept across failed attempts.
    pub latest: Option<Arc<Sample>>,
    /// Whether the most recent attempt succeeded.
    pub last_update_success: bool,
    pub last_error: Option<String>,
    /// Number of attempts so far, successful or not.
    pub attempts: u64,
}

/// Handle to a running poll task.
#[derive(Debug)]
pub struct Monitor {
    state: watch::Receiver<MonitorState>,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), CoreError>>,
}

impl Monitor {
    /// Start polling `switch` every `period`. The first poll runs
    /// immediately. The switch should already be logged in.
    ///
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    pub fn spawn(switch: Switch, period: Duration) -> Self {
        let period = if period < MIN_PERIOD {
            warn!(host = %switch.host(), ?period, "poll period too short, using {MIN_PERIOD:?}");
            MIN_PERIOD
        } else {
            period
        };
        let (tx, rx) = watch::channel(MonitorState::default());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(switch, period, tx, cancel.clone()));
        Self {
            state: rx,
            cancel,
            handle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.clone()
    }

    pub fn current(&self) -> MonitorState {
        self.state.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop polling and wait for the task to exit.
    pub async fn shutdown(self) -> Result<(), CoreError> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the task to exit on its own. Returns the error that
    /// stopped it, if any.
    pub async fn join(self) -> Result<(), CoreError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Ok(()),
        }
    }
}

async fn poll_task(
    switch: Switch,
    period: Duration,
    state: watch::Sender<MonitorState>,
    cancel: CancellationToken,
) -> Result<(), CoreError> {
    let mut tracker = RateTracker::new();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match switch.fetch_port_data().await {
                    Ok(poll) => {
                        let rates = tracker.observe(&poll);
                        debug!(host = %switch.host(), ports = poll.ports.len(), "poll succeeded");
                        let sample = Arc::new(Sample { poll, rates });
                        state.send_modify(|s| {
                            s.latest = Some(sample);
                            s.last_update_success = true;
                            s.last_error = None;
                            s.attempts += 1;
                        });
                    }
                    Err(e) => {
                        warn!(host = %switch.host(), error = %e, "poll failed");
                        let transient = e.is_transient();
                        state.send_modify(|s| {
                            s.last_update_success = false;
                            s.last_error = Some(e.to_string());
                            s.attempts += 1;
                        });
                        if !transient {
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    debug!(host = %switch.host(), "poll task stopped");
    Ok(())
}
