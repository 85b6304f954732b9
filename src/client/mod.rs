//! Govee cloud API client
//!
//! [`GoveeApi`] is the seam between the bridge and the vendor: the directory
//! sync and the reading fetcher only talk to this trait, so tests can swap in
//! a mock or point the HTTP client at a local server.

pub mod http_client;

pub use http_client::GoveeHttpClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "Govee-API-Key";

/// Device list endpoint, relative to the base URL
pub const DEVICES_PATH: &str = "router/api/v1/user/devices";

/// Device state endpoint, relative to the base URL
pub const STATE_PATH: &str = "router/api/v1/device/state";

/// One entry of the device list as returned by the vendor.
///
/// Every field is optional: entries are validated during discovery so a
/// single malformed record never fails the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceEntry {
    pub sku: Option<String>,
    pub device: Option<String>,
    #[serde(rename = "deviceName")]
    pub device_name: Option<String>,
}

/// Body of `GET /router/api/v1/user/devices`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub data: Vec<DeviceEntry>,
}

/// Entries that are not objects, or carry wrongly typed fields, become empty
/// entries so discovery can skip them individually.
fn lenient_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<DeviceEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}

/// A field of the wrong JSON type reads as absent, so a wrong-shape state
/// body surfaces as a missing metric rather than a parse failure.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// Non-array values read as absent; unreadable items become empty items so
/// the remaining ones keep their positions.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Body of `POST /router/api/v1/device/state`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRequest {
    pub request_id: String,
    pub payload: StateRequestPayload,
}

/// Device selector inside a [`StateRequest`]
#[derive(Debug, Clone, Serialize)]
pub struct StateRequestPayload {
    pub sku: String,
    pub device: String,
}

impl StateRequest {
    /// Build a request with a fresh request ID
    pub fn new(model: &str, address: &str) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            payload: StateRequestPayload {
                sku: model.to_string(),
                device: address.to_string(),
            },
        }
    }
}

/// Response of the state endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateResponse {
    #[serde(deserialize_with = "lenient")]
    pub request_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub code: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub msg: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub payload: Option<StatePayload>,
}

/// Device state payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatePayload {
    #[serde(deserialize_with = "lenient")]
    pub sku: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub device: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub capabilities: Option<Vec<Capability>>,
}

/// One measurable or controllable property in a state response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Capability {
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub instance: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub state: Option<CapabilityState>,
}

/// Current value of a capability; numeric or nested depending on the metric
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CapabilityState {
    pub value: serde_json::Value,
}

/// Operations the bridge needs from the vendor API
#[async_trait]
pub trait GoveeApi: Send + Sync {
    /// Fetch the account's device list
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>>;

    /// Fetch the current state of one device
    async fn device_state(&self, model: &str, address: &str) -> Result<StateResponse>;
}
