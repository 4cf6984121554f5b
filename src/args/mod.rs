//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;


pub use cli::{CliArgs, Command, DashboardArgs, ServeArgs};
pub use defaults::{DEFAULT_API_URL, DEFAULT_LISTEN, DEFAULT_SITES};

pub(crate) use defaults::default_sites;
pub(crate) use parsers::{
    parse_api_url, parse_duration_value, parse_granularity, parse_listen_addr,
};
