//! Mock implementations for testing
//!
//! [`MockGoveeApi`] serves canned device lists and state responses and counts
//! the calls made against it.

use crate::client::{DeviceEntry, GoveeApi, StateResponse};
use crate::error::{GoveeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type ErrorFactory = Box<dyn Fn() -> GoveeError + Send + Sync>;

/// Mock Govee API for testing
#[derive(Default)]
pub struct MockGoveeApi {
    devices: Vec<DeviceEntry>,
    list_error: Option<ErrorFactory>,
    states: HashMap<String, Value>,
    state_error: Option<ErrorFactory>,
    delay: Option<Duration>,
    list_calls: AtomicUsize,
    state_calls: AtomicUsize,
}

impl MockGoveeApi {
    /// Create new mock API with no devices
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device list returned by `list_devices`
    pub fn with_devices(mut self, devices: Vec<DeviceEntry>) -> Self {
        self.devices = devices;
        self
    }

    /// Make `list_devices` fail
    pub fn with_list_error(
        mut self,
        error: impl Fn() -> GoveeError + Send + Sync + 'static,
    ) -> Self {
        self.list_error = Some(Box::new(error));
        self
    }

    /// Set the raw state response body for one device address
    pub fn with_state(mut self, address: &str, body: Value) -> Self {
        self.states.insert(address.to_string(), body);
        self
    }

    /// Make every `device_state` call fail
    pub fn with_state_error(
        mut self,
        error: impl Fn() -> GoveeError + Send + Sync + 'static,
    ) -> Self {
        self.state_error = Some(Box::new(error));
        self
    }

    /// Delay every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl GoveeApi for MockGoveeApi {
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        match &self.list_error {
            Some(error) => Err(error()),
            None => Ok(self.devices.clone()),
        }
    }

    async fn device_state(&self, _model: &str, address: &str) -> Result<StateResponse> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        if let Some(error) = &self.state_error {
            return Err(error());
        }

        let body = self
            .states
            .get(address)
            .cloned()
            .ok_or_else(|| {
                GoveeError::from_status(
                    reqwest::StatusCode::BAD_REQUEST,
                    &format!("unknown device {address}"),
                )
            })?;
        serde_json::from_value(body)
            .map_err(|e| GoveeError::malformed(format!("Unreadable device state: {e}")))
    }
}
