//! HTTP client for the Govee cloud API
//!
//! Every request carries the API key header and is bounded by the configured
//! timeout. Transient failures (connect errors, timeouts, 5xx) are retried
//! `max_retries` times with a linearly growing delay; everything else is
//! returned to the caller immediately.

use crate::client::{
    DeviceEntry, DeviceListResponse, GoveeApi, StateRequest, StateResponse, API_KEY_HEADER,
    DEVICES_PATH, STATE_PATH,
};
use crate::config::{normalize_base_url, GoveeConfig};
use crate::error::{GoveeError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP client for the Govee cloud API
pub struct GoveeHttpClient {
    /// HTTP client instance with the API key as a default header
    client: Client,

    /// Base URL of the vendor API
    base_url: Url,

    /// Extra attempts after a transient failure
    max_retries: u32,

    /// Base delay between attempts
    retry_delay: Duration,
}

impl GoveeHttpClient {
    /// Create a new HTTP client
    pub fn new(config: &GoveeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GoveeError::config("API key is required"));
        }

        let mut default_headers = reqwest::header::HeaderMap::new();
        let mut key = reqwest::header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| GoveeError::config(format!("Invalid API key header value: {e}")))?;
        key.set_sensitive(true);
        default_headers.insert(API_KEY_HEADER, key);

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(format!("govee-hygrometer/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| GoveeError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(config.base_url.clone()),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Build URL for API endpoint
    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GoveeError::config(format!("Invalid URL path {path}: {e}")))
    }

    /// Send a request, retrying transient failures
    async fn execute_request(
        &self,
        method: Method,
        url: Url,
        body: Option<&StateRequest>,
    ) -> Result<reqwest::Response> {
        let attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            debug!("HTTP {method} attempt {attempt}/{attempts} to {url}");

            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            let error = match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("HTTP request successful: {}", response.status());
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    GoveeError::from_status(status, &text)
                }
                Err(e) if e.is_timeout() => {
                    GoveeError::timeout(format!("HTTP request to {url} timed out: {e}"))
                }
                Err(e) if e.is_connect() => {
                    GoveeError::connection(format!("HTTP request to {url} failed: {e}"))
                }
                Err(e) => GoveeError::Http(e),
            };

            if attempt >= attempts || !error.is_retryable() {
                return Err(error);
            }

            let delay = self.retry_delay * attempt;
            warn!("HTTP request failed ({error}), retrying in {delay:?}");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl GoveeApi for GoveeHttpClient {
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>> {
        let url = self.build_url(DEVICES_PATH)?;
        let response = self.execute_request(Method::GET, url, None).await?;

        let text = response
            .text()
            .await
            .map_err(|e| GoveeError::connection(format!("Failed to read device list: {e}")))?;
        let list: DeviceListResponse = serde_json::from_str(&text)
            .map_err(|e| GoveeError::malformed(format!("Unreadable device list: {e}")))?;

        debug!("Device list returned {} entries", list.data.len());
        Ok(list.data)
    }

    async fn device_state(&self, model: &str, address: &str) -> Result<StateResponse> {
        let url = self.build_url(STATE_PATH)?;
        let request = StateRequest::new(model, address);
        debug!(
            request_id = %request.request_id,
            model,
            address,
            "Requesting device state"
        );

        let response = self.execute_request(Method::POST, url, Some(&request)).await?;
        let text = response
            .text()
            .await
            .map_err(|e| GoveeError::connection(format!("Failed to read device state: {e}")))?;

        serde_json::from_str(&text)
            .map_err(|e| GoveeError::malformed(format!("Unreadable device state: {e}")))
    }
}
