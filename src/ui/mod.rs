//! Terminal rendering of the dashboard.
pub mod model;
pub mod render;
