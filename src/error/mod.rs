mod app;
mod config;
mod http;
mod store;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use store::StoreError;
pub use validation::ValidationError;
