use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bucket::Granularity;

use super::input::DashboardInput;
use super::refresh::{Clock, run_cycle};
use super::session::{CycleEvent, DashboardSession, RefreshTrigger};
use super::source::MeasurementSource;
use super::timer::AutoRefresh;

/// Drives a [`DashboardSession`] from inputs, timer ticks and cycle events.
/// Cycles run on their own task and report back through `events`.
pub struct Controller {
    session: DashboardSession,
    timer: AutoRefresh,
    source: Arc<dyn MeasurementSource>,
    clock: Clock,
    ticks: mpsc::UnboundedSender<RefreshTrigger>,
    events: mpsc::UnboundedSender<CycleEvent>,
}

impl Controller {
    #[must_use]
    pub fn new(
        session: DashboardSession,
        refresh_interval: Duration,
        source: Arc<dyn MeasurementSource>,
        clock: Clock,
        ticks: mpsc::UnboundedSender<RefreshTrigger>,
        events: mpsc::UnboundedSender<CycleEvent>,
    ) -> Self {
        Self {
            session,
            timer: AutoRefresh::new(refresh_interval),
            source,
            clock,
            ticks,
            events,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &DashboardSession {
        &self.session
    }

    #[must_use]
    pub const fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Starts the timer when auto-refresh is on and kicks off the initial
    /// load.
    pub fn start(&mut self) {
        if self.session.auto_refresh() {
            self.timer.start(self.ticks.clone());
        }
        self.trigger(RefreshTrigger::Initial);
    }

    /// Spawns a cycle for `trigger`. Returns `false` when the session is busy.
    pub fn trigger(&mut self, trigger: RefreshTrigger) -> bool {
        let Some(plan) = self.session.begin_refresh(trigger) else {
            return false;
        };
        debug!("Starting {:?} refresh of {} sites", trigger, plan.targets.len());
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let clock = self.clock;
        tokio::spawn(async move {
            run_cycle(plan, source.as_ref(), clock, &events).await;
        });
        true
    }

    pub fn apply(&mut self, event: CycleEvent) {
        self.session.apply(event);
        if let Some(trigger) = self.session.take_pending_reload() {
            self.trigger(trigger);
        }
    }

    /// Returns `false` when the input asks the dashboard to quit.
    pub fn handle_input(&mut self, input: DashboardInput) -> bool {
        match input {
            DashboardInput::Quit => return false,
            DashboardInput::SelectNext => self.session.select_next(),
            DashboardInput::SelectPrevious => self.session.select_previous(),
            DashboardInput::SetGranularity(granularity) => self.change_granularity(granularity),
            DashboardInput::NextGranularity => {
                let next = self
                    .session
                    .granularity_at(self.session.selected_index())
                    .next();
                self.change_granularity(next);
            }
            DashboardInput::Refresh => {
                self.trigger(RefreshTrigger::Manual);
            }
            DashboardInput::ToggleAutoRefresh => {
                if self.session.toggle_auto_refresh() {
                    self.timer.start(self.ticks.clone());
                    info!("Auto-refresh enabled");
                } else {
                    self.timer.stop();
                    info!("Auto-refresh disabled");
                }
            }
        }
        true
    }

    fn change_granularity(&mut self, granularity: Granularity) {
        if self.session.set_selected_granularity(granularity) {
            self.trigger(RefreshTrigger::GranularityChanged);
        }
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }
}
