use serde::{Deserialize, Serialize};

/// Table the collector writes into.
pub const MEASUREMENTS_TABLE: &str = "measurements";
/// Upper bound on rows returned for a single site lookup.
pub const DEFAULT_QUERY_LIMIT: u32 = 1000;

/// One row written by the collector. Values are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "website", alias = "site")]
    pub site: String,
    pub timestamp: String,
    pub ttfb: Option<f64>,
    pub loading_delay: Option<f64>,
}
