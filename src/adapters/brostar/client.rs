//! BROSTAR registry client
//!
//! All HTTP interaction with the registry goes through [`BrostarClient`].
//! The client authenticates with HTTP Basic (username `__key__`, the API
//! key as password), follows `next` links on list endpoints, and retries
//! connection-level failures of idempotent requests (GET, DELETE) with
//! bounded exponential backoff. HTTP error statuses are never retried and
//! never swallowed: they surface as [`RegistryError::ClientError`] /
//! [`RegistryError::ServerError`].

use crate::config::schema::{BrostarConfig, Environment, PollConfig, RetryConfig};
use crate::config::SecretString;
use crate::domain::{BrosyncError, RegistryError, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::models::{Paginated, UploadTaskRecord};

/// The registry's endpoint surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrostarEndpoint {
    Users,
    Organisations,
    ImportTasks,
    UploadTasks,
    BulkUploads,
    GmnGmns,
    GmnMeasuringPoints,
    GmwGmws,
    GmwMonitoringTubes,
    GmwEvents,
    GarGars,
    GldGlds,
    GldObservations,
    FrdFrds,
}

impl BrostarEndpoint {
    /// Path segment under the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            BrostarEndpoint::Users => "users",
            BrostarEndpoint::Organisations => "organisations",
            BrostarEndpoint::ImportTasks => "importtasks",
            BrostarEndpoint::UploadTasks => "uploadtasks",
            BrostarEndpoint::BulkUploads => "bulkuploads",
            BrostarEndpoint::GmnGmns => "gmn/gmns",
            BrostarEndpoint::GmnMeasuringPoints => "gmn/measuringpoints",
            BrostarEndpoint::GmwGmws => "gmw/gmws",
            BrostarEndpoint::GmwMonitoringTubes => "gmw/monitoringtubes",
            BrostarEndpoint::GmwEvents => "gmw/events",
            BrostarEndpoint::GarGars => "gar/gars",
            BrostarEndpoint::GldGlds => "gld/glds",
            BrostarEndpoint::GldObservations => "gld/observations",
            BrostarEndpoint::FrdFrds => "frd/frds",
        }
    }
}

/// Authenticated BROSTAR client
///
/// Constructed once per run and shared (by `Arc`) between the coordinator
/// and the submitter. Construction fails immediately when no API key is
/// configured.
pub struct BrostarClient {
    base_url: String,
    public_api_base: String,
    client: Client,
    api_key: SecretString,
    retry: RetryConfig,
    poll: PollConfig,
}

impl BrostarClient {
    /// Create a new BROSTAR client from configuration
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error when the API key is missing or
    /// empty — before any request is made.
    pub fn new(config: &BrostarConfig, environment: Environment) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BrosyncError::Authentication("BROSTAR API key is not set".to_string()))?;
        if api_key.expose_secret().is_empty() {
            return Err(BrosyncError::Authentication(
                "BROSTAR API key cannot be empty".to_string(),
            ));
        }

        let base_url = config.resolved_base_url(environment);
        tracing::info!(base_url = %base_url, "BROSTAR client configured");

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            base_url,
            public_api_base: config.public_api_base.trim_end_matches('/').to_string(),
            client,
            api_key,
            retry: config.retry.clone(),
            poll: config.poll.clone(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the Basic authorization header value
    fn auth_header_value(&self) -> String {
        let credentials = format!("__key__:{}", self.api_key.expose_secret().as_ref());
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }

    /// Retry an idempotent request on connection-level failures with
    /// exponential backoff. Application-level errors pass straight through.
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
                        BrosyncError::Registry(registry_err) if registry_err.is_transient()
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
                        "Retrying request after connection failure"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    fn map_transport_error(e: reqwest::Error) -> BrosyncError {
        let registry_err = if e.is_timeout() {
            RegistryError::Timeout(e.to_string())
        } else {
            RegistryError::ConnectionFailed(e.to_string())
        };
        BrosyncError::Registry(registry_err)
    }

    /// Raise on a non-success status; the error carries the response body.
    async fn check_status_code(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let registry_err = if status.is_client_error() {
            RegistryError::ClientError {
                status: status.as_u16(),
                message: body,
            }
        } else {
            RegistryError::ServerError {
                status: status.as_u16(),
                message: body,
            }
        };
        Err(BrosyncError::Registry(registry_err))
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
            resp.json::<Value>().await.map_err(|e| {
                BrosyncError::Registry(RegistryError::InvalidResponse(e.to_string()))
            })
        })
        .await
    }

    /// List an endpoint, following the `next` link until exhausted.
    pub async fn get_list(
        &self,
        endpoint: BrostarEndpoint,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>> {
        let mut url = format!("{}/{}/", self.base_url, endpoint.path());
        let mut results = Vec::new();
        let mut first_page = true;

        loop {
            let page_params: &[(&str, &str)] = if first_page { params } else { &[] };
            let raw = self.get_json(&url, page_params).await?;
            let page: Paginated<Value> = serde_json::from_value(raw).map_err(|e| {
                BrosyncError::Registry(RegistryError::InvalidResponse(e.to_string()))
            })?;
            results.extend(page.results);

            match page.next {
                Some(next) => {
                    url = next;
                    first_page = false;
                }
                None => break,
            }
        }

        tracing::debug!(
            endpoint = endpoint.path(),
            count = results.len(),
            "Fetched paginated list"
        );
        Ok(results)
    }

    /// Fetch one resource by id.
    pub async fn get_detail(&self, endpoint: BrostarEndpoint, uuid: &str) -> Result<Value> {
        let url = format!("{}/{}/{}", self.base_url, endpoint.path(), uuid);
        self.get_json(&url, &[]).await
    }

    /// Fetch one upload task record.
    pub async fn get_upload_task(&self, uuid: &str) -> Result<UploadTaskRecord> {
        let url = format!("{}/uploadtasks/{}/", self.base_url, uuid);
        let raw = self.get_json(&url, &[]).await?;
        serde_json::from_value(raw)
            .map_err(|e| BrosyncError::Registry(RegistryError::InvalidResponse(e.to_string())))
    }

    /// Create an upload task. Not retried: task creation is not idempotent.
    pub async fn post_upload_task<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<UploadTaskRecord> {
        let url = format!("{}/uploadtasks/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(payload)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        let resp = Self::check_status_code(resp).await?;
        resp.json::<UploadTaskRecord>()
            .await
            .map_err(|e| BrosyncError::Registry(RegistryError::InvalidResponse(e.to_string())))
    }

    /// Patch fields of an existing upload task.
    pub async fn patch_upload_task(&self, uuid: &str, body: &Value) -> Result<()> {
        let url = format!("{}/uploadtasks/{}/", self.base_url, uuid);
        let resp = self
            .client
            .patch(&url)
            .json(body)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        Self::check_status_code(resp).await?;
        Ok(())
    }

    /// Delete an upload task.
    pub async fn delete_upload_task(&self, uuid: &str) -> Result<()> {
        self.retry_request(|| async {
            let url = format!("{}/uploadtasks/{}", self.base_url, uuid);
            let resp = self
                .client
                .delete(&url)
                .header("Authorization", self.auth_header_value())
                .send()
                .await
                .map_err(Self::map_transport_error)?;
            Self::check_status_code(resp).await?;
            Ok(())
        })
        .await
    }

    /// Observation summary of a GLD dossier from the public BRO services
    /// API (no authentication). An empty array means nothing is registered
    /// under the dossier.
    pub async fn public_observations_summary(&self, bro_id: &str) -> Result<Value> {
        let url = format!("{}/objects/{}/observationsSummary", self.public_api_base, bro_id);
        self.retry_request(|| async {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(Self::map_transport_error)?;
            let resp = Self::check_status_code(resp).await?;
            resp.json::<Value>().await.map_err(|e| {
                BrosyncError::Registry(RegistryError::InvalidResponse(e.to_string()))
            })
        })
        .await
    }

    /// Ask the registry to re-evaluate a stuck task before the next poll.
    pub async fn check_status(&self, uuid: &str) -> Result<()> {
        let url = format!("{}/uploadtasks/{}/check_status/", self.base_url, uuid);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        Self::check_status_code(resp).await?;
        Ok(())
    }

    fn multipart_with_payload(payload: &Value) -> Form {
        let mut form = Form::new();
        if let Some(map) = payload.as_object() {
            for (key, value) in map {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                form = form.text(key.clone(), text);
            }
        }
        form
    }

    async fn post_bulk(&self, form: Form, timeout: Duration) -> Result<Value> {
        let url = format!("{}/bulkuploads/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(timeout)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        let resp = Self::check_status_code(resp).await?;
        resp.json::<Value>()
            .await
            .map_err(|e| BrosyncError::Registry(RegistryError::InvalidResponse(e.to_string())))
    }

    /// Bulk groundwater quality delivery: fieldwork and lab CSV files.
    pub async fn post_gar_bulk(
        &self,
        payload: &Value,
        fieldwork_file: Vec<u8>,
        lab_file: Vec<u8>,
    ) -> Result<Value> {
        let form = Self::multipart_with_payload(payload)
            .part(
                "fieldwork_file",
                Part::bytes(fieldwork_file).file_name("fieldwork.csv"),
            )
            .part("lab_file", Part::bytes(lab_file).file_name("lab.csv"));
        self.post_bulk(form, Duration::from_secs(60)).await
    }

    /// Bulk monitoring-network delivery: measuring point CSV file.
    pub async fn post_gmn_bulk(&self, payload: &Value, measuring_point_file: Vec<u8>) -> Result<Value> {
        let form = Self::multipart_with_payload(payload).part(
            "measurement_tvp_file",
            Part::bytes(measuring_point_file).file_name("measuring_points.csv"),
        );
        self.post_bulk(form, Duration::from_secs(30)).await
    }

    /// Bulk groundwater level delivery: observation CSV file.
    pub async fn post_gld_bulk(&self, payload: &Value, timeseries_file: Vec<u8>) -> Result<Value> {
        let form = Self::multipart_with_payload(payload).part(
            "measurement_tvp_file",
            Part::bytes(timeseries_file).file_name("timeseries.csv"),
        );
        self.post_bulk(form, Duration::from_secs(60)).await
    }

    /// Poll an upload task until it reports `COMPLETED` or the polling
    /// ceiling elapses.
    ///
    /// Reaching the ceiling is not an error: the last observed record is
    /// returned and callers branch on its status explicitly. Transient
    /// errors while polling are logged, count against the ceiling, and the
    /// loop continues.
    pub async fn await_completed(&self, uuid: &str) -> Result<UploadTaskRecord> {
        let interval = Duration::from_millis(self.poll.interval_ms);
        let ceiling = Duration::from_millis(self.poll.ceiling_ms);
        let mut elapsed = Duration::ZERO;

        let mut record = self.get_upload_task(uuid).await?;
        while !record.status.is_completed() && elapsed < ceiling {
            tokio::time::sleep(interval).await;
            elapsed += interval;

            match self.get_upload_task(uuid).await {
                Ok(fresh) => record = fresh,
                Err(e) => {
                    tracing::warn!(
                        uuid = %uuid,
                        error = %e,
                        "Error while polling upload task, continuing"
                    );
                }
            }
        }

        tracing::debug!(
            uuid = %uuid,
            status = %record.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Polling finished"
        );
        Ok(record)
    }

    /// Poll an upload task until it carries a BRO id or the polling ceiling
    /// elapses. Returns `None` when no id appeared in time.
    pub async fn await_bro_id(&self, uuid: &str) -> Result<Option<String>> {
        let interval = Duration::from_millis(self.poll.interval_ms);
        let ceiling = Duration::from_millis(self.poll.ceiling_ms);
        let mut elapsed = Duration::ZERO;

        let mut record = self.get_upload_task(uuid).await?;
        while record.assigned_bro_id().is_none() && elapsed < ceiling {
            tokio::time::sleep(interval).await;
            elapsed += interval;

            match self.get_upload_task(uuid).await {
                Ok(fresh) => record = fresh,
                Err(e) => {
                    tracing::warn!(
                        uuid = %uuid,
                        error = %e,
                        "Error while polling for BRO id, continuing"
                    );
                }
            }
        }

        Ok(record.assigned_bro_id().map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config_with_key(key: &str) -> BrostarConfig {
        BrostarConfig {
            api_key: Some(secret_string(key.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = BrostarConfig::default();
        let result = BrostarClient::new(&config, Environment::Staging);
        assert!(matches!(result, Err(BrosyncError::Authentication(_))));
    }

    #[test]
    fn test_client_rejects_empty_api_key() {
        let config = config_with_key("");
        let result = BrostarClient::new(&config, Environment::Staging);
        assert!(matches!(result, Err(BrosyncError::Authentication(_))));
    }

    #[test]
    fn test_client_base_url_per_environment() {
        let client = BrostarClient::new(&config_with_key("key"), Environment::Staging).unwrap();
        assert_eq!(client.base_url(), "https://staging.brostar.nl/api");

        let client = BrostarClient::new(&config_with_key("key"), Environment::Production).unwrap();
        assert_eq!(client.base_url(), "https://www.brostar.nl/api");
    }

    #[test]
    fn test_auth_header_is_basic_with_key_username() {
        let client = BrostarClient::new(&config_with_key("secret"), Environment::Staging).unwrap();
        let header = client.auth_header_value();
        assert!(header.starts_with("Basic "));
        let decoded = general_purpose::STANDARD
            .decode(header.trim_start_matches("Basic "))
            .unwrap();
        assert_eq!(decoded, b"__key__:secret");
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(BrostarEndpoint::UploadTasks.path(), "uploadtasks");
        assert_eq!(BrostarEndpoint::GmwGmws.path(), "gmw/gmws");
        assert_eq!(BrostarEndpoint::GmwMonitoringTubes.path(), "gmw/monitoringtubes");
        assert_eq!(BrostarEndpoint::GldGlds.path(), "gld/glds");
    }
}
