//! Bucketing of raw measurements into fixed label sets.
mod granularity;
mod timestamp;


use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::store::Measurement;

pub use granularity::Granularity;
pub use timestamp::parse_timestamp;

/// One aggregated chart point. `None` means no measurement mapped to the
/// label, which is distinct from an average of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedPoint {
    #[serde(rename = "time")]
    pub label: String,
    pub ttfb: Option<f64>,
    pub loading_delay: Option<f64>,
}

#[derive(Debug, Default, Clone, Copy)]
struct MeanAccumulator {
    sum: f64,
    count: u32,
}

impl MeanAccumulator {
    #[expect(
        clippy::float_arithmetic,
        reason = "Bucket means are computed in seconds as f64"
    )]
    fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.sum += value;
        self.count = self.count.saturating_add(1);
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "Bucket means are computed in seconds as f64"
    )]
    fn mean(self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / f64::from(self.count))
    }
}

/// Averages `measurements` into the label set of `granularity` for the
/// window that contains `now`.
///
/// The result always has one point per label, in label order. Measurements
/// outside the window, or with unparseable timestamps, are ignored.
#[must_use]
pub fn bucket_measurements(
    measurements: &[Measurement],
    granularity: Granularity,
    now: NaiveDateTime,
) -> Vec<BucketedPoint> {
    let labels = granularity.labels(now.date());
    let mut ttfb = vec![MeanAccumulator::default(); labels.len()];
    let mut loading_delay = vec![MeanAccumulator::default(); labels.len()];

    for measurement in measurements {
        let Some(timestamp) = parse_timestamp(&measurement.timestamp) else {
            continue;
        };
        let Some(slot) = granularity.slot_for(timestamp, now) else {
            continue;
        };
        if let Some(value) = measurement.ttfb
            && let Some(acc) = ttfb.get_mut(slot)
        {
            acc.push(value);
        }
        if let Some(value) = measurement.loading_delay
            && let Some(acc) = loading_delay.get_mut(slot)
        {
            acc.push(value);
        }
    }

    labels
        .into_iter()
        .zip(ttfb.into_iter().zip(loading_delay))
        .map(|(label, (ttfb, loading_delay))| BucketedPoint {
            label,
            ttfb: ttfb.mean(),
            loading_delay: loading_delay.mean(),
        })
        .collect()
}

/// The full label set with every value absent, used when a fetch fails.
#[must_use]
pub fn empty_series(granularity: Granularity, today: NaiveDate) -> Vec<BucketedPoint> {
    granularity
        .labels(today)
        .into_iter()
        .map(|label| BucketedPoint {
            label,
            ttfb: None,
            loading_delay: None,
        })
        .collect()
}
