use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const NOT_FOUND_SUGGESTION: &str =
    "Start the measurement collector so it creates the database, or point --db-path at it";
const EMPTY_SUGGESTION: &str = "Let the measurement collector record at least one run";
const SCHEMA_SUGGESTION: &str = "Run the measurement collector once to create the table";

/// Body of every non-200 response. Optional fields are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(rename = "dbPath", default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorPayload {
    #[must_use]
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            db_path: None,
            details: None,
            suggestion: None,
        }
    }

    fn with_db_path(mut self, path: &std::path::Path) -> Self {
        self.db_path = Some(path.display().to_string());
        self
    }

    fn with_details(mut self, details: impl ToString) -> Self {
        self.details = Some(details.to_string());
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_owned());
        self
    }
}

impl From<&StoreError> for ErrorPayload {
    fn from(err: &StoreError) -> Self {
        let payload = Self::message(err.summary());
        match err {
            StoreError::NotFound { path } => payload
                .with_db_path(path)
                .with_suggestion(NOT_FOUND_SUGGESTION),
            StoreError::Empty { path } => payload
                .with_db_path(path)
                .with_suggestion(EMPTY_SUGGESTION),
            StoreError::FileSystem { path, source } => {
                payload.with_db_path(path).with_details(source)
            }
            StoreError::Open { path, source } => payload.with_db_path(path).with_details(source),
            StoreError::SchemaMissing { path, .. } => payload
                .with_db_path(path)
                .with_suggestion(SCHEMA_SUGGESTION),
            StoreError::Query { site, source } => {
                payload.with_details(format!("{} (site '{}')", source, site))
            }
            StoreError::Internal { context, details } => {
                payload.with_details(format!("{}: {}", context, details))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(super) struct HealthPayload {
    pub(super) status: &'static str,
}
