//! Terminal dashboard: fetches measurements from the query service, buckets
//! them per site and redraws the charts as cycles complete.
mod app;
mod controller;
mod input;
mod once;
mod refresh;
mod session;
mod source;
mod timer;

#[cfg(test)]
mod tests;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::args::{DashboardArgs, default_sites};
use crate::bucket::Granularity;
use crate::error::AppResult;

pub use controller::Controller;
pub use input::{DashboardInput, input_for_key, spawn_input_reader};
pub use once::summary_lines;
pub use refresh::{Clock, load_site, local_now, refresh, run_cycle};
pub use session::{
    CycleEvent, DashboardSession, RefreshPhase, RefreshPlan, RefreshTrigger, SiteSeries,
};
pub use source::{ApiClient, MeasurementSource};
pub use timer::AutoRefresh;

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub api_url: String,
    pub sites: Vec<String>,
    pub refresh_interval: Duration,
    pub auto_refresh: bool,
    pub granularity: Granularity,
    pub no_ui: bool,
    pub export_charts: Option<PathBuf>,
    pub no_color: bool,
    pub log_file: PathBuf,
}

impl DashboardSettings {
    #[must_use]
    pub fn from_args(args: &DashboardArgs) -> Self {
        let sites = if args.sites.is_empty() {
            default_sites()
        } else {
            args.sites.clone()
        };
        Self {
            api_url: args.api_url.clone(),
            sites,
            refresh_interval: args.refresh_interval,
            auto_refresh: !args.no_auto_refresh,
            granularity: args.granularity,
            no_ui: args.no_ui,
            export_charts: args.export_charts.as_ref().map(PathBuf::from),
            no_color: args.no_color,
            log_file: PathBuf::from(&args.log_file),
        }
    }

    /// Whether the terminal UI runs; `--no-ui` or a non-terminal stdout
    /// selects the one-shot summary.
    #[must_use]
    pub fn interactive(&self) -> bool {
        !self.no_ui && io::stdout().is_terminal()
    }
}

/// Runs the dashboard until the user quits, or once when not interactive.
///
/// # Errors
///
/// Returns an error when the API URL is invalid, the terminal cannot be set
/// up or chart export fails.
pub async fn run(settings: &DashboardSettings) -> AppResult<()> {
    let client = ApiClient::new(&settings.api_url)?;
    if settings.interactive() {
        app::run_interactive(settings, Arc::new(client)).await
    } else {
        info!("Running one-shot summary against {}", settings.api_url);
        once::run_once(settings, &client).await
    }
}
