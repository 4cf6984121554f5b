use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::bucket::{BucketedPoint, Granularity};

/// What started a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    GranularityChanged,
    Manual,
    Timer,
}

impl RefreshTrigger {
    #[must_use]
    pub const fn phase(self) -> RefreshPhase {
        match self {
            Self::Initial | Self::GranularityChanged => RefreshPhase::Loading,
            Self::Manual | Self::Timer => RefreshPhase::Refreshing,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPhase {
    #[default]
    Idle,
    Loading,
    Refreshing,
}

/// Work handed to a cycle: every site with the granularity selected for it
/// when the cycle began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPlan {
    pub trigger: RefreshTrigger,
    pub targets: Vec<(String, Granularity)>,
}

/// One site's bucketed series, produced by a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSeries {
    pub site: String,
    pub granularity: Granularity,
    pub points: Vec<BucketedPoint>,
    pub fetch_failed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleEvent {
    SiteLoaded(SiteSeries),
    Finished {
        trigger: RefreshTrigger,
        completed_at: NaiveDateTime,
    },
}

/// Dashboard state. Cycles receive a [`RefreshPlan`] from
/// [`DashboardSession::begin_refresh`] and their [`CycleEvent`]s are applied
/// back with [`DashboardSession::apply`].
#[derive(Debug, Clone)]
pub struct DashboardSession {
    sites: Vec<String>,
    granularities: Vec<Granularity>,
    series: HashMap<(String, Granularity), SiteSeries>,
    phase: RefreshPhase,
    auto_refresh: bool,
    last_updated: Option<NaiveDateTime>,
    selected: usize,
    reload_pending: bool,
}

impl DashboardSession {
    #[must_use]
    pub fn new(sites: Vec<String>, granularity: Granularity, auto_refresh: bool) -> Self {
        let granularities = vec![granularity; sites.len()];
        Self {
            sites,
            granularities,
            series: HashMap::new(),
            phase: RefreshPhase::Idle,
            auto_refresh,
            last_updated: None,
            selected: 0,
            reload_pending: false,
        }
    }

    #[must_use]
    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    #[must_use]
    pub const fn phase(&self) -> RefreshPhase {
        self.phase
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase != RefreshPhase::Idle
    }

    #[must_use]
    pub const fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    #[must_use]
    pub const fn last_updated(&self) -> Option<NaiveDateTime> {
        self.last_updated
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_site(&self) -> Option<&str> {
        self.sites.get(self.selected).map(String::as_str)
    }

    /// Granularity currently selected for `index`, or the default when the
    /// index is out of range.
    #[must_use]
    pub fn granularity_at(&self, index: usize) -> Granularity {
        self.granularities.get(index).copied().unwrap_or_default()
    }

    /// Cached series for the site at `index` under its selected granularity.
    #[must_use]
    pub fn series_at(&self, index: usize) -> Option<&SiteSeries> {
        let site = self.sites.get(index)?;
        self.series.get(&(site.clone(), self.granularity_at(index)))
    }

    pub fn select_next(&mut self) {
        self.selected = self
            .selected
            .saturating_add(1)
            .checked_rem(self.sites.len())
            .unwrap_or(0);
    }

    pub fn select_previous(&mut self) {
        if !self.sites.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or_else(|| self.sites.len().saturating_sub(1));
        }
    }

    /// Changes the granularity of the selected site. Returns `true` when it
    /// actually changed.
    pub fn set_selected_granularity(&mut self, granularity: Granularity) -> bool {
        let Some(current) = self.granularities.get_mut(self.selected) else {
            return false;
        };
        if *current == granularity {
            return false;
        }
        *current = granularity;
        true
    }

    /// Returns the new auto-refresh flag.
    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.auto_refresh = !self.auto_refresh;
        self.auto_refresh
    }

    /// Enters the trigger's phase and returns the plan, or `None` while a
    /// cycle is in flight. A rejected granularity change is remembered and
    /// handed out by [`DashboardSession::take_pending_reload`] once the
    /// running cycle finishes.
    pub fn begin_refresh(&mut self, trigger: RefreshTrigger) -> Option<RefreshPlan> {
        if self.is_busy() {
            debug!("Refresh in progress, rejecting {:?}", trigger);
            if trigger == RefreshTrigger::GranularityChanged {
                self.reload_pending = true;
            }
            return None;
        }
        self.phase = trigger.phase();
        let targets = self
            .sites
            .iter()
            .cloned()
            .zip(self.granularities.iter().copied())
            .collect();
        Some(RefreshPlan { trigger, targets })
    }

    pub fn apply(&mut self, event: CycleEvent) {
        match event {
            CycleEvent::SiteLoaded(series) => {
                self.series
                    .insert((series.site.clone(), series.granularity), series);
            }
            CycleEvent::Finished {
                trigger,
                completed_at,
            } => {
                debug!("{:?} refresh finished", trigger);
                self.phase = RefreshPhase::Idle;
                self.last_updated = Some(completed_at);
            }
        }
    }

    /// Takes the reload deferred by a busy [`DashboardSession::begin_refresh`].
    pub fn take_pending_reload(&mut self) -> Option<RefreshTrigger> {
        if self.is_busy() || !self.reload_pending {
            return None;
        }
        self.reload_pending = false;
        Some(RefreshTrigger::GranularityChanged)
    }
}
