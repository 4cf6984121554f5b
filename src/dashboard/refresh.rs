use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bucket::{Granularity, bucket_measurements, empty_series};

use super::session::{CycleEvent, DashboardSession, RefreshPlan, RefreshTrigger, SiteSeries};
use super::source::MeasurementSource;

/// Wall-clock source used for bucketing and the "last updated" stamp.
pub type Clock = fn() -> NaiveDateTime;

#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Fetches and buckets one site. A failed fetch yields the all-absent series.
pub async fn load_site<S>(
    source: &S,
    site: &str,
    granularity: Granularity,
    clock: Clock,
) -> SiteSeries
where
    S: MeasurementSource + ?Sized,
{
    match source.fetch(site).await {
        Ok(rows) => {
            let points = bucket_measurements(&rows, granularity, clock());
            debug!(
                "Bucketed {} rows for {} ({})",
                rows.len(),
                site,
                granularity
            );
            SiteSeries {
                site: site.to_owned(),
                granularity,
                points,
                fetch_failed: false,
            }
        }
        Err(err) => {
            warn!("Failed to load {}: {}", site, err);
            SiteSeries {
                site: site.to_owned(),
                granularity,
                points: empty_series(granularity, clock().date()),
                fetch_failed: true,
            }
        }
    }
}

/// Runs one cycle: sites strictly one after another, each published as soon
/// as it is bucketed, then a single `Finished`. Stops early when the
/// receiver is gone.
pub async fn run_cycle<S>(
    plan: RefreshPlan,
    source: &S,
    clock: Clock,
    events: &mpsc::UnboundedSender<CycleEvent>,
) where
    S: MeasurementSource + ?Sized,
{
    let site_count = plan.targets.len();
    for (site, granularity) in plan.targets {
        let series = load_site(source, &site, granularity, clock).await;
        if events.send(CycleEvent::SiteLoaded(series)).is_err() {
            debug!("Dashboard closed during {:?} refresh", plan.trigger);
            return;
        }
    }
    debug!("{:?} refresh covered {} sites", plan.trigger, site_count);
    drop(events.send(CycleEvent::Finished {
        trigger: plan.trigger,
        completed_at: clock(),
    }));
}

/// Runs a whole cycle inline and returns the updated session. A busy session
/// is returned unchanged.
pub async fn refresh<S>(
    mut session: DashboardSession,
    source: &S,
    trigger: RefreshTrigger,
    clock: Clock,
) -> DashboardSession
where
    S: MeasurementSource + ?Sized,
{
    let Some(plan) = session.begin_refresh(trigger) else {
        return session;
    };
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    run_cycle(plan, source, clock, &events_tx).await;
    drop(events_tx);
    while let Some(event) = events_rx.recv().await {
        session.apply(event);
    }
    session
}
