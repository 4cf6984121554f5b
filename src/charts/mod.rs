//! PNG line charts of the bucketed series, written by the one-shot summary.
mod naming;
mod series;


use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tokio::fs;
use tracing::{error, info};

use crate::bucket::BucketedPoint;
use crate::dashboard::{DashboardSession, local_now};
use crate::error::AppResult;
use crate::ui::model::site_display_name;

use naming::{chart_file_name, run_dir_name};
use series::{MetricChart, plot_metric};

const TTFB_COLOR: RGBColor = RGBColor(37, 99, 235);
const LOADING_DELAY_COLOR: RGBColor = RGBColor(234, 88, 12);

/// Writes a TTFB and a loading-delay chart for every loaded site into a new
/// `run-*` directory under `base_dir`. Returns the written files.
///
/// # Errors
///
/// Returns an error when the output directory cannot be created. A chart
/// that fails to draw is logged and skipped.
pub async fn export_session_charts(
    session: &DashboardSession,
    base_dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    let run_dir = base_dir.join(run_dir_name(local_now()));
    fs::create_dir_all(&run_dir).await?;

    let mut written = Vec::new();
    for index in 0..session.sites().len() {
        let Some(series) = session.series_at(index) else {
            continue;
        };
        let name = site_display_name(&series.site);
        let granularity = series.granularity;
        let charts = [
            (
                "ttfb",
                MetricChart {
                    title: format!("{} - TTFB - {}", name, granularity.description()),
                    y_desc: "TTFB (s)",
                    color: TTFB_COLOR,
                    value: ttfb_of,
                },
            ),
            (
                "loading-delay",
                MetricChart {
                    title: format!("{} - Loading delay - {}", name, granularity.description()),
                    y_desc: "Loading delay (s)",
                    color: LOADING_DELAY_COLOR,
                    value: loading_delay_of,
                },
            ),
        ];
        for (metric, chart) in charts {
            let path = run_dir.join(chart_file_name(&series.site, granularity, metric));
            match plot_metric(&series.points, &chart, &path) {
                Ok(()) => {
                    info!("Wrote chart {}", path.display());
                    written.push(path);
                }
                Err(err) => error!("Failed to plot {}: {}", path.display(), err),
            }
        }
    }
    Ok(written)
}

const fn ttfb_of(point: &BucketedPoint) -> Option<f64> {
    point.ttfb
}

const fn loading_delay_of(point: &BucketedPoint) -> Option<f64> {
    point.loading_delay
}
