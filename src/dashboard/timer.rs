use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::session::RefreshTrigger;

/// Periodic refresh task with explicit start/stop. Ticks are only requests;
/// the session's busy guard decides whether a cycle actually runs.
#[derive(Debug)]
pub struct AutoRefresh {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Starts ticking; the first tick arrives one period from now. Starting
    /// a running timer does nothing.
    pub fn start(&mut self, ticks: mpsc::UnboundedSender<RefreshTrigger>) {
        if self.handle.is_some() {
            return;
        }
        let period = self.period;
        debug!("Auto-refresh started ({:?})", period);
        self.handle = Some(tokio::spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if ticks.send(RefreshTrigger::Timer).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Auto-refresh stopped");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}
