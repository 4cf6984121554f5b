use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration_value;
use crate::error::ValidationError;

/// Contents of `sitewatch.toml` / `sitewatch.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Monitored sites shared by both subcommands.
    pub sites: Option<Vec<String>>,
    pub server: Option<ServerSection>,
    pub dashboard: Option<DashboardSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub db_path: Option<String>,
    pub listen: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardSection {
    pub api_url: Option<String>,
    pub refresh_interval: Option<DurationValue>,
    pub auto_refresh: Option<bool>,
    pub granularity: Option<String>,
    pub no_color: Option<bool>,
    pub export_charts: Option<String>,
    pub log_file: Option<String>,
}

/// Either a bare number of seconds or a string such as `"90s"` or `"2m"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
