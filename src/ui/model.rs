use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::bucket::{BucketedPoint, Granularity, empty_series};
use crate::dashboard::{DashboardSession, RefreshPhase};

/// One monitored site as drawn: the cached series for its selected
/// granularity, or a blank label set when nothing has loaded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteCard {
    pub site: String,
    pub granularity: Granularity,
    pub points: Vec<BucketedPoint>,
    pub loaded: bool,
    pub fetch_failed: bool,
}

impl SiteCard {
    #[must_use]
    pub fn name(&self) -> String {
        site_display_name(&self.site)
    }
}

/// Host name without a leading `www.`; the raw string when it is not a URL.
#[must_use]
pub fn site_display_name(site: &str) -> String {
    url::Url::parse(site)
        .ok()
        .and_then(|url| {
            url.host_str()
                .map(|host| host.strip_prefix("www.").unwrap_or(host).to_owned())
        })
        .unwrap_or_else(|| site.to_owned())
}

/// Snapshot of a [`DashboardSession`] taken before each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub cards: Vec<SiteCard>,
    pub selected: usize,
    pub phase: RefreshPhase,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    pub last_updated: Option<NaiveDateTime>,
    pub no_color: bool,
    /// Advances once per redraw while a cycle runs.
    pub tick: usize,
}

impl DashboardView {
    #[must_use]
    pub fn from_session(
        session: &DashboardSession,
        today: NaiveDate,
        refresh_interval: Duration,
        no_color: bool,
        tick: usize,
    ) -> Self {
        let cards = session
            .sites()
            .iter()
            .enumerate()
            .map(|(index, site)| {
                let granularity = session.granularity_at(index);
                match session.series_at(index) {
                    Some(series) => SiteCard {
                        site: site.clone(),
                        granularity,
                        points: series.points.clone(),
                        loaded: true,
                        fetch_failed: series.fetch_failed,
                    },
                    None => SiteCard {
                        site: site.clone(),
                        granularity,
                        points: empty_series(granularity, today),
                        loaded: false,
                        fetch_failed: false,
                    },
                }
            })
            .collect();

        Self {
            cards,
            selected: session.selected_index(),
            phase: session.phase(),
            auto_refresh: session.auto_refresh(),
            refresh_interval,
            last_updated: session.last_updated(),
            no_color,
            tick,
        }
    }

    #[must_use]
    pub fn selected_card(&self) -> Option<&SiteCard> {
        self.cards.get(self.selected)
    }
}
