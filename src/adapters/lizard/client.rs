//! Lizard asset-platform client
//!
//! Same authentication and transport-retry shape as the registry client:
//! HTTP Basic with username `__key__` and the API key as password,
//! connection-level failures retried with bounded backoff, HTTP error
//! statuses surfaced immediately.

use crate::config::schema::{LizardConfig, RetryConfig};
use crate::config::SecretString;
use crate::domain::{BrosyncError, LizardError, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::models::{LizardEvent, Location, Paginated, TimeseriesInfo};

/// Authenticated Lizard client
///
/// Constructed once per run; shared by `Arc` with the submitter and the
/// id-sync glue.
pub struct LizardClient {
    base_url: String,
    client: Client,
    api_key: SecretString,
    retry: RetryConfig,
}

impl LizardClient {
    /// Create a new Lizard client from configuration
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error when the API key is missing or
    /// empty — before any request is made.
    pub fn new(config: &LizardConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BrosyncError::Authentication("Lizard API key is not set".to_string()))?;
        if api_key.expose_secret().is_empty() {
            return Err(BrosyncError::Authentication(
                "Lizard API key cannot be empty".to_string(),
            ));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::info!(base_url = %base_url, "Lizard client configured");

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            base_url,
            client,
            api_key,
            retry: config.retry.clone(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header_value(&self) -> String {
        let credentials = format!("__key__:{}", self.api_key.expose_secret().as_ref());
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }

    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    let transient = matches!(
                        &e,
                        BrosyncError::Lizard(lizard_err) if lizard_err.is_transient()
                    );
                    attempt += 1;
                    if !transient || attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = self.retry.initial_delay_ms
                        * (self.retry.backoff_multiplier.powf((attempt - 1) as f64) as u64);
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying Lizard request after connection failure"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    fn map_transport_error(e: reqwest::Error) -> BrosyncError {
        let lizard_err = if e.is_timeout() {
            LizardError::Timeout(e.to_string())
        } else {
            LizardError::ConnectionFailed(e.to_string())
        };
        BrosyncError::Lizard(lizard_err)
    }

    async fn check_status_code(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let lizard_err = if status.is_client_error() {
            LizardError::ClientError {
                status: status.as_u16(),
                message: body,
            }
        } else {
            LizardError::ServerError {
                status: status.as_u16(),
                message: body,
            }
        };
        Err(BrosyncError::Lizard(lizard_err))
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.retry_request(|| async {
            let resp = self
                .client
                .get(url)
                .query(params)
                .header("Authorization", self.auth_header_value())
                .send()
                .await
                .map_err(Self::map_transport_error)?;
            let resp = Self::check_status_code(resp).await?;
            resp.json::<Value>()
                .await
                .map_err(|e| BrosyncError::Lizard(LizardError::InvalidResponse(e.to_string())))
        })
        .await
    }

    async fn get_paginated<T: DeserializeOwned>(
        &self,
        mut url: String,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut results = Vec::new();
        let mut first_page = true;

        loop {
            let page_params: &[(&str, &str)] = if first_page { params } else { &[] };
            let raw = self.get_json(&url, page_params).await?;
            let page: Paginated<T> = serde_json::from_value(raw)
                .map_err(|e| BrosyncError::Lizard(LizardError::InvalidResponse(e.to_string())))?;
            results.extend(page.results);

            match page.next {
                Some(next) => {
                    url = next;
                    first_page = false;
                }
                None => break,
            }
        }

        Ok(results)
    }

    /// List monitoring locations, filtered by `code` / `code__startswith`.
    pub async fn list_locations(&self, params: &[(&str, &str)]) -> Result<Vec<Location>> {
        let url = format!("{}/locations/", self.base_url);
        self.get_paginated(url, params).await
    }

    /// The single location registered under a code, if any.
    pub async fn find_location(&self, code: &str) -> Result<Option<Location>> {
        let locations = self.list_locations(&[("code", code)]).await?;
        Ok(locations.into_iter().next())
    }

    /// List timeseries, filtered by `location__code` / `observation_type`.
    pub async fn list_timeseries(&self, params: &[(&str, &str)]) -> Result<Vec<TimeseriesInfo>> {
        let url = format!("{}/timeseries/", self.base_url);
        self.get_paginated(url, params).await
    }

    /// List the events of a timeseries, following pagination.
    pub async fn list_events(
        &self,
        timeseries_url: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<LizardEvent>> {
        let url = format!("{timeseries_url}events/");
        self.get_paginated(url, params).await
    }

    /// Bulk-write events back onto a timeseries.
    pub async fn post_events(&self, timeseries_url: &str, events: &[LizardEvent]) -> Result<()> {
        let url = format!("{timeseries_url}events/");
        tracing::info!(url = %url, count = events.len(), "Posting timeseries events");

        let resp = self
            .client
            .post(&url)
            .json(events)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        Self::check_status_code(resp).await?;
        Ok(())
    }

    /// Patch a location's `extra_metadata` (stores assigned registry ids).
    pub async fn patch_location_metadata(
        &self,
        location_url: &str,
        extra_metadata: &Value,
    ) -> Result<()> {
        let resp = self
            .client
            .patch(location_url)
            .json(&serde_json::json!({ "extra_metadata": extra_metadata }))
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        Self::check_status_code(resp).await?;
        Ok(())
    }
}
