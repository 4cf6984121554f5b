//! Core library for the `sitewatch` CLI.
//!
//! `sitewatch serve` exposes the collector's SQLite measurements over a small
//! read-only HTTP API; `sitewatch dashboard` polls that API, buckets the rows
//! per site into daily, weekly or monthly averages and charts them in the
//! terminal.
pub mod args;
pub mod bucket;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logger;
pub mod server;
pub mod shutdown;
pub mod store;
pub mod ui;

mod entry;

pub use entry::run;
