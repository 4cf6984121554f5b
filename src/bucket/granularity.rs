use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const HOURS_PER_DAY: u32 = 24;
const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const LAST_DAY_OF_WEEK_OFFSET: u64 = 6;

/// Time bucketing scheme for a site's charts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Hourly averages over today.
    #[default]
    Daily,
    /// Daily averages over the current Sunday-to-Saturday week.
    Weekly,
    /// Daily averages over the current calendar month.
    Monthly,
}

impl Granularity {
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Daily => "Daily (hourly avg)",
            Self::Weekly => "Weekly (daily avg)",
            Self::Monthly => "Monthly (daily avg)",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Daily,
        }
    }

    /// The full, ordered label set for the window containing `today`.
    #[must_use]
    pub fn labels(self, today: NaiveDate) -> Vec<String> {
        match self {
            Self::Daily => (0..HOURS_PER_DAY)
                .map(|hour| format!("{:02}:00", hour))
                .collect(),
            Self::Weekly => WEEKDAY_NAMES.iter().map(|&name| name.to_owned()).collect(),
            Self::Monthly => (1..=days_in_month(today))
                .map(|day| day.to_string())
                .collect(),
        }
    }

    /// Index into [`Granularity::labels`] for `timestamp`, or `None` when the
    /// timestamp falls outside the window that contains `now`.
    #[must_use]
    pub fn slot_for(self, timestamp: NaiveDateTime, now: NaiveDateTime) -> Option<usize> {
        let today = now.date();
        let slot = match self {
            Self::Daily => {
                if timestamp.date() != today {
                    return None;
                }
                timestamp.hour()
            }
            Self::Weekly => {
                let (start, end) = week_bounds(today)?;
                let date = timestamp.date();
                if date < start || date > end {
                    return None;
                }
                date.weekday().num_days_from_sunday()
            }
            Self::Monthly => {
                if timestamp.year() != today.year() || timestamp.month() != today.month() {
                    return None;
                }
                timestamp.day0()
            }
        };
        usize::try_from(slot).ok()
    }
}

/// First and last calendar day of the Sunday-to-Saturday week holding `today`.
pub(crate) fn week_bounds(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let since_sunday = u64::from(today.weekday().num_days_from_sunday());
    let start = today.checked_sub_days(Days::new(since_sunday))?;
    let end = start.checked_add_days(Days::new(LAST_DAY_OF_WEEK_OFFSET))?;
    Some((start, end))
}

pub(crate) fn days_in_month(today: NaiveDate) -> u32 {
    let (year, month) = if today.month() == 12 {
        (today.year().saturating_add(1), 1)
    } else {
        (today.year(), today.month().saturating_add(1))
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "hourly" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            _ => Err(ValidationError::InvalidGranularity {
                value: value.to_owned(),
            }),
        }
    }
}
