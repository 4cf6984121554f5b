use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::{AppError, AppResult, HttpError};
use crate::server::ErrorPayload;
use crate::store::Measurement;

/// Where a refresh cycle gets raw measurements from.
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    async fn fetch(&self, site: &str) -> AppResult<Vec<Measurement>>;
}

/// `GET {api_url}/api/data/{site}` over reqwest.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(api_url: &str) -> AppResult<Self> {
        let base = Url::parse(api_url).map_err(|err| {
            AppError::http(HttpError::InvalidApiUrl {
                url: api_url.to_owned(),
                source: err,
            })
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::http(HttpError::ApiUrlCannotBeBase {
                url: api_url.to_owned(),
            }));
        }
        let client = Client::builder()
            .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self { client, base })
    }

    /// Builds the data URL; the site becomes a single percent-encoded path
    /// segment.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry path segments.
    pub fn data_url(&self, site: &str) -> AppResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::http(HttpError::ApiUrlCannotBeBase {
                    url: self.base.to_string(),
                })
            })?
            .pop_if_empty()
            .extend(["api", "data", site]);
        Ok(url)
    }
}

#[async_trait]
impl MeasurementSource for ApiClient {
    async fn fetch(&self, site: &str) -> AppResult<Vec<Measurement>> {
        let url = self.data_url(site)?;
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await.map_err(|err| {
            AppError::http(HttpError::RequestFailed {
                url: url.to_string(),
                source: err,
            })
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(payload) = serde_json::from_str::<ErrorPayload>(&body) {
                warn!(
                    "API error for {}: {} (details: {}, dbPath: {})",
                    site,
                    payload.error,
                    payload.details.as_deref().unwrap_or("-"),
                    payload.db_path.as_deref().unwrap_or("-")
                );
            }
            return Err(AppError::http(HttpError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            }));
        }

        response.json::<Vec<Measurement>>().await.map_err(|err| {
            AppError::http(HttpError::DecodeFailed {
                url: url.to_string(),
                source: err,
            })
        })
    }
}
