//! Periodic status checks with change detection.
//!
//! Polling every second would mean a notification every second, so a result
//! is only shown when it differs from the last one, when no earlier result is
//! known, or when the user asked for it. A failed request forgets the last
//! result, which makes the first answer after an outage always visible.

use parley_core::{Severity, StatusSnapshot};
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::notify::{NotificationCenter, NotificationId};
use crate::probe::{ProbeError, StatusProbe};

const CHECKING: &str = "Checking server status...";
const FETCH_FAILED: &str = "Failed to fetch server status";

/// Outcome of one liveness request.
#[derive(Debug)]
pub struct PollResult {
    /// Requested manually; bypasses change detection.
    pub forced: bool,
    pub outcome: Result<StatusSnapshot, ProbeError>,
}

/// Runs periodic and on-demand status checks and reports meaningful changes.
pub struct StatusPoller<P> {
    probe: Arc<P>,
    period: Duration,
    timer: Option<Interval>,
    last: Option<StatusSnapshot>,
    results: mpsc::UnboundedSender<PollResult>,
}

impl<P: StatusProbe> StatusPoller<P> {
    pub fn new(probe: P, period: Duration, results: mpsc::UnboundedSender<PollResult>) -> Self {
        Self {
            probe: Arc::new(probe),
            period,
            timer: None,
            last: None,
            results,
        }
    }

    /// Start the automatic check, replacing any running timer.
    pub fn start(&mut self) {
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if self.timer.replace(timer).is_some() {
            tracing::debug!("Status polling restarted");
        } else {
            tracing::debug!("Status polling started every {:?}", self.period);
        }
    }

    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            tracing::debug!("Status polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Last successful result, if the most recent request succeeded.
    pub fn last_snapshot(&self) -> Option<&StatusSnapshot> {
        self.last.as_ref()
    }

    /// Resolves on the next timer tick; never while stopped.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => pending().await,
        }
    }

    /// Issue one request. The result comes back through the results channel.
    ///
    /// A forced check announces itself immediately and always reports its
    /// result. Requests are not serialized; a slow one may land after a newer
    /// one.
    pub fn check_once(&self, forced: bool, notes: &mut NotificationCenter) {
        if forced {
            notes.show(Severity::Info, CHECKING);
        }

        let probe = Arc::clone(&self.probe);
        let results = self.results.clone();
        tokio::spawn(async move {
            let outcome = probe.fetch().await;
            // Receiver gone means the client is shutting down.
            let _ = results.send(PollResult { forced, outcome });
        });
    }

    /// Apply a finished request against the current snapshot.
    pub fn on_result(
        &mut self,
        result: PollResult,
        notes: &mut NotificationCenter,
    ) -> Option<NotificationId> {
        match result.outcome {
            Ok(snapshot) => {
                let changed = self.last.as_ref() != Some(&snapshot);
                let severity = snapshot.severity();
                let headline = snapshot.headline();
                if changed {
                    tracing::info!("Server status: {}", snapshot.status);
                }
                self.last = Some(snapshot);

                (result.forced || changed).then(|| notes.show(severity, headline))
            }
            Err(e) => {
                let had_snapshot = self.last.take().is_some();
                if had_snapshot || result.forced {
                    tracing::warn!("Status check failed: {}", e);
                    Some(notes.show(Severity::Error, FETCH_FAILED))
                } else {
                    tracing::debug!("Status check failed: {}", e);
                    None
                }
            }
        }
    }
}
