//! Read-only access to the measurements table written by the collector.
mod averages;
mod query;
mod types;


pub use averages::{DailyAverage, HalfDayAverages, HourlyAverage, SiteAverages};
pub use query::MeasurementStore;
pub use types::{DEFAULT_QUERY_LIMIT, MEASUREMENTS_TABLE, Measurement};
