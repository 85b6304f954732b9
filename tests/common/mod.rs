//! WireMock-based Govee cloud API mocking infrastructure
//!
//! Provides a mock HTTP server that answers the device list and device state
//! endpoints so the bridge can be exercised end to end without an account.

#![allow(dead_code)]

use govee_hygrometer::config::GoveeConfig;
use govee_hygrometer::BridgeConfig;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_API_KEY: &str = "test-api-key";

const DEVICES_PATH: &str = "/router/api/v1/user/devices";
const STATE_PATH: &str = "/router/api/v1/device/state";

/// Mock Govee cloud for testing
pub struct MockGoveeServer {
    pub server: MockServer,
}

impl MockGoveeServer {
    /// Start an empty mock server; tests mount the endpoints they need
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Bridge configuration pointing at this server with a short retry delay
    pub fn config(&self) -> BridgeConfig {
        let mut govee = GoveeConfig::new(TEST_API_KEY, self.url().parse().unwrap());
        govee.retry_delay = Duration::from_millis(10);
        govee.timeout = Duration::from_secs(2);
        BridgeConfig {
            govee,
            ..BridgeConfig::default()
        }
    }

    /// Serve `entries` as the account's device list
    pub async fn mock_device_list(&self, entries: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .and(header("Govee-API-Key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "success",
                "data": entries
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer the device list with an error status
    pub async fn mock_device_list_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("error"))
            .mount(&self.server)
            .await;
    }

    /// Serve a full state body for one device address
    pub async fn mock_state(&self, address: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(STATE_PATH))
            .and(header("Govee-API-Key", TEST_API_KEY))
            .and(body_partial_json(json!({"payload": {"device": address}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serve a state body with the given raw temperature and humidity
    pub async fn mock_sensor(&self, model: &str, address: &str, temperature: i64, humidity: i64) {
        self.mock_state(address, sensor_state(model, address, temperature, humidity))
            .await;
    }

    /// Answer state requests for one device with an error status
    pub async fn mock_state_status(&self, address: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(STATE_PATH))
            .and(body_partial_json(json!({"payload": {"device": address}})))
            .respond_with(ResponseTemplate::new(status).set_body_string("error"))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received on a path
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }

    pub async fn state_requests(&self) -> usize {
        self.request_count(STATE_PATH).await
    }

    pub async fn list_requests(&self) -> usize {
        self.request_count(DEVICES_PATH).await
    }
}

/// Device list entry as the vendor returns it
pub fn device_entry(model: &str, address: &str, name: &str) -> Value {
    json!({
        "sku": model,
        "device": address,
        "deviceName": name,
        "type": "devices.types.thermometer",
        "capabilities": []
    })
}

/// Device state body in the vendor's identified-capability layout
pub fn sensor_state(model: &str, address: &str, temperature: i64, humidity: i64) -> Value {
    json!({
        "requestId": "test",
        "msg": "success",
        "code": 200,
        "payload": {
            "sku": model,
            "device": address,
            "capabilities": [
                {
                    "type": "devices.capabilities.online",
                    "instance": "online",
                    "state": {"value": true}
                },
                {
                    "type": "devices.capabilities.property",
                    "instance": "sensorTemperature",
                    "state": {"value": temperature}
                },
                {
                    "type": "devices.capabilities.property",
                    "instance": "sensorHumidity",
                    "state": {"value": {"currentHumidity": humidity}}
                }
            ]
        }
    })
}
