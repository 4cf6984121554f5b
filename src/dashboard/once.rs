use tracing::info;

use crate::bucket::BucketedPoint;
use crate::charts::export_session_charts;
use crate::error::AppResult;
use crate::ui::model::site_display_name;

use super::DashboardSettings;
use super::refresh::{local_now, refresh};
use super::session::{DashboardSession, RefreshTrigger};
use super::source::MeasurementSource;

/// Loads every site once, prints the summary and optionally writes PNG charts.
pub(super) async fn run_once(
    settings: &DashboardSettings,
    source: &dyn MeasurementSource,
) -> AppResult<()> {
    let session = DashboardSession::new(settings.sites.clone(), settings.granularity, false);
    let session = refresh(session, source, RefreshTrigger::Initial, local_now).await;

    for line in summary_lines(&session) {
        println!("{}", line);
    }

    if let Some(dir) = settings.export_charts.as_deref() {
        let written = export_session_charts(&session, dir).await?;
        info!("Exported {} charts to {}", written.len(), dir.display());
    }
    Ok(())
}

/// One line per site: populated buckets and the mean of the bucket means.
#[must_use]
pub fn summary_lines(session: &DashboardSession) -> Vec<String> {
    session
        .sites()
        .iter()
        .enumerate()
        .map(|(index, site)| {
            let name = site_display_name(site);
            let granularity = session.granularity_at(index);
            match session.series_at(index) {
                Some(series) if series.fetch_failed => {
                    format!("{} [{}]: fetch failed", name, granularity)
                }
                Some(series) => {
                    let populated = series
                        .points
                        .iter()
                        .filter(|point| point.ttfb.is_some() || point.loading_delay.is_some())
                        .count();
                    format!(
                        "{} [{}]: {}/{} buckets, avg TTFB {}, avg loading delay {}",
                        name,
                        granularity,
                        populated,
                        series.points.len(),
                        format_average(mean_of(&series.points, |point| point.ttfb)),
                        format_average(mean_of(&series.points, |point| point.loading_delay)),
                    )
                }
                None => format!("{} [{}]: not loaded", name, granularity),
            }
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Summary averages are computed in seconds as f64"
)]
fn mean_of(points: &[BucketedPoint], value: fn(&BucketedPoint) -> Option<f64>) -> Option<f64> {
    let (sum, count) = points
        .iter()
        .filter_map(value)
        .fold((0.0_f64, 0_u32), |(sum, count), item| {
            (sum + item, count.saturating_add(1))
        });
    if count == 0 {
        return None;
    }
    Some(sum / f64::from(count))
}

fn format_average(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |seconds| format!("{:.3}s", seconds))
}
