use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use crate::bucket::Granularity;
use crate::store::DEFAULT_QUERY_LIMIT;

use super::defaults::{DEFAULT_API_URL, DEFAULT_LISTEN, default_db_path, default_log_path};
use super::parsers::{
    parse_api_url, parse_duration_value, parse_granularity, parse_limit, parse_listen_addr,
};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve stored measurements over HTTP
    Serve(ServeArgs),
    /// Show bucketed TTFB and loading-delay charts for the monitored sites
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Path to the SQLite database written by the collector
    #[arg(long = "db-path", env = "SITEWATCH_DB_PATH", default_value_t = default_db_path())]
    pub db_path: String,

    /// Address to listen on
    #[arg(long, default_value = DEFAULT_LISTEN, value_parser = parse_listen_addr)]
    pub listen: SocketAddr,

    /// Maximum number of rows returned per site lookup
    #[arg(long, default_value_t = DEFAULT_QUERY_LIMIT, value_parser = parse_limit)]
    pub limit: u32,

    /// Monitored site (repeatable); used by /api/sites and /api/averages
    #[arg(long = "site")]
    pub sites: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    /// Base URL of the query service
    #[arg(
        long = "api-url",
        env = "SITEWATCH_API_URL",
        default_value = DEFAULT_API_URL,
        value_parser = parse_api_url
    )]
    pub api_url: String,

    /// Monitored site (repeatable)
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Auto-refresh interval (supports ms/s/m/h)
    #[arg(long = "refresh-interval", default_value = "60s", value_parser = parse_duration_value)]
    pub refresh_interval: Duration,

    /// Start with auto-refresh turned off
    #[arg(long = "no-auto-refresh")]
    pub no_auto_refresh: bool,

    /// Initial granularity for every site (daily, weekly, monthly)
    #[arg(long, default_value = "daily", value_parser = parse_granularity)]
    pub granularity: Granularity,

    /// Fetch once, print a summary and exit
    #[arg(long = "no-ui")]
    pub no_ui: bool,

    /// Directory for PNG charts written in --no-ui mode
    #[arg(long = "export-charts")]
    pub export_charts: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log file used while the terminal UI is active
    #[arg(long = "log-file", default_value_t = default_log_path())]
    pub log_file: String,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Website performance dashboard: serves collected TTFB and loading-delay measurements and charts them in the terminal."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}
