use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::bucket::Granularity;
use crate::error::StoreError;

use super::query::{MeasurementStore, close_quietly};

const HOURLY_SQL: &str = "SELECT strftime('%H', timestamp) AS hour, AVG(ttfb)
     FROM measurements
     WHERE website = ?1 AND date(timestamp) = ?2
     GROUP BY hour
     ORDER BY hour";
const HALF_DAY_SQL: &str = "SELECT date(timestamp) AS day,
            CASE WHEN strftime('%H', timestamp) < '12' THEN 'AM' ELSE 'PM' END AS period,
            AVG(ttfb)
     FROM measurements
     WHERE website = ?1 AND date(timestamp) BETWEEN ?2 AND ?3
     GROUP BY day, period
     ORDER BY day, period";
const DAILY_SQL: &str = "SELECT date(timestamp) AS day, AVG(ttfb)
     FROM measurements
     WHERE website = ?1 AND strftime('%m', timestamp) = ?2 AND strftime('%Y', timestamp) = ?3
     GROUP BY day
     ORDER BY day";
/// The half-day view covers today plus the six days before it.
const HALF_DAY_LOOKBACK_DAYS: u64 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour: Option<String>,
    pub avg_ttfb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    pub day: Option<String>,
    pub avg_ttfb: Option<f64>,
}

/// day -> ("AM" | "PM") -> average ttfb
pub type HalfDayAverages = BTreeMap<String, BTreeMap<String, Option<f64>>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SiteAverages {
    Hourly(Vec<HourlyAverage>),
    HalfDay(HalfDayAverages),
    Daily(Vec<DailyAverage>),
}

enum AverageQuery {
    Hourly { today: String },
    HalfDay { from: String, to: String },
    Daily { month: String, year: String },
}

impl AverageQuery {
    fn new(granularity: Granularity, today: NaiveDate) -> Self {
        match granularity {
            Granularity::Daily => Self::Hourly {
                today: today.format("%Y-%m-%d").to_string(),
            },
            Granularity::Weekly => {
                let from = today
                    .checked_sub_days(Days::new(HALF_DAY_LOOKBACK_DAYS))
                    .unwrap_or(today);
                Self::HalfDay {
                    from: from.format("%Y-%m-%d").to_string(),
                    to: today.format("%Y-%m-%d").to_string(),
                }
            }
            Granularity::Monthly => Self::Daily {
                month: format!("{:02}", today.month()),
                year: format!("{:04}", today.year()),
            },
        }
    }
}

impl MeasurementStore {
    /// Server-side averages of `ttfb` for each site, matched exactly.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store fails validation or a query
    /// fails.
    pub async fn averages(
        &self,
        granularity: Granularity,
        sites: &[String],
        today: NaiveDate,
    ) -> Result<BTreeMap<String, SiteAverages>, StoreError> {
        let conn = self.open_validated().await?;
        let query = AverageQuery::new(granularity, today);
        let owned_sites = sites.to_vec();
        let result = conn
            .call(move |conn| {
                let mut averages = BTreeMap::new();
                for site in owned_sites {
                    let series = match &query {
                        AverageQuery::Hourly { today } => {
                            let mut stmt = conn.prepare_cached(HOURLY_SQL)?;
                            let rows = stmt.query_map(rusqlite::params![site, today], |row| {
                                Ok(HourlyAverage {
                                    hour: row.get(0)?,
                                    avg_ttfb: row.get(1)?,
                                })
                            })?;
                            let mut hourly = Vec::new();
                            for row in rows {
                                hourly.push(row?);
                            }
                            SiteAverages::Hourly(hourly)
                        }
                        AverageQuery::HalfDay { from, to } => {
                            let mut stmt = conn.prepare_cached(HALF_DAY_SQL)?;
                            let rows = stmt.query_map(rusqlite::params![site, from, to], |row| {
                                Ok((
                                    row.get::<_, Option<String>>(0)?,
                                    row.get::<_, String>(1)?,
                                    row.get::<_, Option<f64>>(2)?,
                                ))
                            })?;
                            let mut half_days = HalfDayAverages::new();
                            for row in rows {
                                let (day, period, avg) = row?;
                                let Some(day) = day else {
                                    continue;
                                };
                                half_days.entry(day).or_default().insert(period, avg);
                            }
                            SiteAverages::HalfDay(half_days)
                        }
                        AverageQuery::Daily { month, year } => {
                            let mut stmt = conn.prepare_cached(DAILY_SQL)?;
                            let rows =
                                stmt.query_map(rusqlite::params![site, month, year], |row| {
                                    Ok(DailyAverage {
                                        day: row.get(0)?,
                                        avg_ttfb: row.get(1)?,
                                    })
                                })?;
                            let mut daily = Vec::new();
                            for row in rows {
                                daily.push(row?);
                            }
                            SiteAverages::Daily(daily)
                        }
                    };
                    averages.insert(site, series);
                }
                Ok(averages)
            })
            .await
            .map_err(|err| StoreError::Query {
                site: sites.join(", "),
                source: err,
            });
        close_quietly(conn).await;
        result
    }
}
