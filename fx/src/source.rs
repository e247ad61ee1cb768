//! Rate source trait and implementations.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::table::RateTable;

/// NBU daily exchange rates, JSON form.
pub const NBU_ENDPOINT: &str =
    "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchangenew?json";

/// Trait for rate table sources.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch a complete rate table. No retries.
    async fn fetch(&self) -> Result<RateTable, FetchError>;
}

/// Configuration for the HTTP rate source.
#[derive(Debug, Clone)]
pub struct RateSourceConfig {
    /// URL returning the JSON rate array.
    pub endpoint: String,
    /// Timeout for the whole request.
    pub timeout: Duration,
}

impl Default for RateSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: NBU_ENDPOINT.to_string(),
            timeout: ratedesk_common::default_request_timeout(),
        }
    }
}

/// Fetches the rate table over HTTP.
pub struct NbuRateSource {
    client: Client,
    config: RateSourceConfig,
}

impl NbuRateSource {
    /// Create a new source from configuration.
    pub fn new(config: RateSourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Host part of the endpoint, used in alerts.
    pub fn host(&self) -> String {
        Url::parse(&self.config.endpoint)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.config.endpoint.clone())
    }
}

#[async_trait]
impl RateSource for NbuRateSource {
    fn name(&self) -> &str {
        "NBU"
    }

    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn fetch(&self) -> Result<RateTable, FetchError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Rate request failed");
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Rate source returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let table = RateTable::from_json(&body)?;

        debug!(
            entries = table.len(),
            exchange_date = %table.exchange_date(),
            "Fetched rate table"
        );

        Ok(table)
    }
}

/// Rate source serving a fixed result, for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticRateSource {
    result: Result<RateTable, FetchError>,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticRateSource {
    /// Serve a table built from `(code, rate)` pairs.
    pub fn with_rates(rates: &[(&str, f64)], exchange_date: &str) -> Self {
        let entries = rates
            .iter()
            .map(|(code, rate)| crate::table::RateEntry {
                code: ratedesk_common::CurrencyCode::new(*code),
                rate: *rate,
            })
            .collect();

        Self {
            result: RateTable::new(entries, exchange_date),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self { result: Err(error) }
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for StaticRateSource {
    fn name(&self) -> &str {
        "STATIC"
    }

    async fn fetch(&self) -> Result<RateTable, FetchError> {
        self.result.clone()
    }
}
