use std::path::PathBuf;

use thiserror::Error;

/// Failure categories of a measurement lookup. Each one maps to its own
/// error payload on the HTTP surface.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database file not found at '{path}'")]
    NotFound { path: PathBuf },
    #[error("Database file '{path}' is empty")]
    Empty { path: PathBuf },
    #[error("File system error while inspecting '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: tokio_rusqlite::Error,
    },
    #[error("Table '{table}' not found in database '{path}'")]
    SchemaMissing { path: PathBuf, table: &'static str },
    #[error("Query for '{site}' failed: {source}")]
    Query {
        site: String,
        #[source]
        source: tokio_rusqlite::Error,
    },
    #[error("Unexpected failure during {context}: {details}")]
    Internal {
        context: &'static str,
        details: String,
    },
}

impl StoreError {
    /// Short, stable description used as the `error` field of API payloads.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Database file not found",
            Self::Empty { .. } => "Database file is empty",
            Self::FileSystem { .. } => "File system error",
            Self::Open { .. } => "Failed to open database",
            Self::SchemaMissing { .. } => "measurements table not found in database",
            Self::Query { .. } => "Query execution failed",
            Self::Internal { .. } => "Failed to fetch data",
        }
    }
}
