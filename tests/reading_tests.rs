//! End-to-end characteristic reads against a mocked Govee cloud

use govee_hygrometer::{
    Characteristic, CharacteristicError, GoveePlatform, HygrometerAccessory, InMemoryRegistry,
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod common;
use common::{device_entry, sensor_state, MockGoveeServer};

async fn discovered_accessory(server: &MockGoveeServer, address: &str) -> Arc<HygrometerAccessory> {
    server
        .mock_device_list(vec![device_entry("H5179", address, "Office")])
        .await;

    let registry = Arc::new(InMemoryRegistry::new());
    let platform = GoveePlatform::from_config(&server.config(), registry).unwrap();
    let report = platform.refresh().await.unwrap();
    let uuid = report.added[0].uuid;
    platform.accessory(&uuid).await.unwrap()
}

#[tokio::test]
async fn test_reading_is_scaled_by_one_hundred() {
    let server = MockGoveeServer::start().await;
    server.mock_sensor("H5179", "AA:01", 2500, 4530).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    let temperature = accessory.read_temperature().await.unwrap();
    let humidity = accessory.read_humidity().await.unwrap();

    assert_eq!(temperature, 25.0);
    assert!((humidity - 45.3).abs() < 1e-9);
}

#[tokio::test]
async fn test_negative_temperatures() {
    let server = MockGoveeServer::start().await;
    server.mock_sensor("H5179", "AA:01", -1250, 8800).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    assert_eq!(accessory.read_temperature().await.unwrap(), -12.5);
    assert_eq!(accessory.read_humidity().await.unwrap(), 88.0);
}

#[tokio::test]
async fn test_every_read_goes_to_the_vendor() {
    let server = MockGoveeServer::start().await;
    server.mock_sensor("H5179", "AA:01", 2000, 5000).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    for _ in 0..3 {
        accessory
            .read(Characteristic::CurrentTemperature)
            .await
            .unwrap();
    }

    assert_eq!(server.state_requests().await, 3);
}

#[tokio::test]
async fn test_simultaneous_reads_share_one_request() {
    let server = MockGoveeServer::start().await;
    server
        .mock_device_list(vec![device_entry("H5179", "AA:01", "Office")])
        .await;
    Mock::given(method("POST"))
        .and(path("/router/api/v1/device/state"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sensor_state("H5179", "AA:01", 2100, 4000))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server.server)
        .await;

    let registry = Arc::new(InMemoryRegistry::new());
    let platform = GoveePlatform::from_config(&server.config(), registry).unwrap();
    let report = platform.refresh().await.unwrap();
    let accessory = platform.accessory(&report.added[0].uuid).await.unwrap();

    let (temperature, humidity) =
        tokio::join!(accessory.read_temperature(), accessory.read_humidity());

    assert_eq!(temperature.unwrap(), 21.0);
    assert_eq!(humidity.unwrap(), 40.0);
    assert_eq!(server.state_requests().await, 1);
    assert_eq!(platform.fetcher().stats().shared, 1);
}

#[rstest]
#[case::no_payload(json!({"code": 200}))]
#[case::no_capabilities(json!({"code": 200, "payload": {"sku": "H5179", "device": "AA:01"}}))]
#[case::empty_capabilities(json!({"code": 200, "payload": {"capabilities": []}}))]
#[case::offline(json!({"code": 400, "msg": "device offline", "payload": {"capabilities": []}}))]
#[case::capabilities_not_a_list(json!({"payload": {"capabilities": {"sensorTemperature": 2500}}}))]
#[case::scalar_state(json!({"payload": {"capabilities": [
    {"instance": "sensorTemperature", "state": 2500},
    {"instance": "sensorHumidity", "state": {"value": 4000}}
]}}))]
#[case::body_not_an_object(json!(["sensorTemperature", 2500]))]
#[case::humidity_missing(json!({"code": 200, "payload": {"capabilities": [
    {"instance": "sensorTemperature", "state": {"value": 2000}}
]}}))]
#[tokio::test]
async fn test_incomplete_state_is_not_responding(#[case] body: serde_json::Value) {
    let server = MockGoveeServer::start().await;
    server.mock_state("AA:01", body).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    let err = accessory.read_temperature().await.unwrap_err();

    assert!(matches!(err, CharacteristicError::NotResponding { .. }));
    assert!(!err.is_permanent());
}

#[tokio::test]
async fn test_legacy_positional_capabilities() {
    let server = MockGoveeServer::start().await;
    server
        .mock_state(
            "AA:01",
            json!({"payload": {"capabilities": [
                {"state": {"value": true}},
                {"state": {"value": 2500}},
                {"state": {"value": 4530}}
            ]}}),
        )
        .await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    assert_eq!(accessory.read_temperature().await.unwrap(), 25.0);
}

#[tokio::test]
async fn test_server_errors_retry_once_then_fail() {
    let server = MockGoveeServer::start().await;
    server.mock_state_status("AA:01", 503).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    let err = accessory.read_humidity().await.unwrap_err();

    assert!(!err.is_permanent());
    assert_eq!(server.state_requests().await, 2);
}

#[tokio::test]
async fn test_bad_request_is_sent_once() {
    let server = MockGoveeServer::start().await;
    server.mock_state_status("AA:01", 400).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    assert!(accessory.read_temperature().await.is_err());
    assert_eq!(server.state_requests().await, 1);
}

#[tokio::test]
async fn test_rejected_api_key_is_permanent() {
    let server = MockGoveeServer::start().await;
    server.mock_state_status("AA:01", 401).await;
    let accessory = discovered_accessory(&server, "AA:01").await;

    let err = accessory.read_humidity().await.unwrap_err();

    assert!(err.is_permanent());
    assert_eq!(server.state_requests().await, 1);
}
