//! End-to-end discovery tests against a mocked Govee cloud

use govee_hygrometer::{
    AccessoryRegistry, DeviceDescriptor, DeviceIdentity, GoveePlatform, InMemoryRegistry,
    LaunchSignal,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{device_entry, MockGoveeServer};

async fn platform_for(server: &MockGoveeServer) -> (GoveePlatform, Arc<InMemoryRegistry>) {
    let registry = Arc::new(InMemoryRegistry::new());
    let platform = GoveePlatform::from_config(&server.config(), registry.clone()).unwrap();
    (platform, registry)
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
#[tokio::test]
async fn test_each_entry_registers_once(#[case] count: usize) {
    let server = MockGoveeServer::start().await;
    let entries = (0..count)
        .map(|i| device_entry("H5179", &format!("AA:BB:CC:DD:EE:{i:02X}"), &format!("Sensor {i}")))
        .collect();
    server.mock_device_list(entries).await;

    let (platform, registry) = platform_for(&server).await;
    let report = platform.refresh().await.unwrap();

    assert_eq!(report.added.len(), count);
    assert_eq!(registry.registration_count(), count);
    assert_eq!(registry.len().await, count);
    assert_eq!(platform.accessories().await.len(), count);
}

#[tokio::test]
async fn test_second_cycle_registers_nothing() {
    let server = MockGoveeServer::start().await;
    server
        .mock_device_list(vec![
            device_entry("H5179", "AA:01", "Office"),
            device_entry("H5075", "AA:02", "Cellar"),
        ])
        .await;

    let (platform, registry) = platform_for(&server).await;
    let first = platform.refresh().await.unwrap();
    let second = platform.refresh().await.unwrap();

    assert_eq!(first.added.len(), 2);
    assert!(second.added.is_empty());
    assert_eq!(second.restored.len(), 2);
    assert_eq!(registry.registration_count(), 2);
    assert_eq!(server.list_requests().await, 2);
}

#[tokio::test]
async fn test_restored_identities_are_not_registered_again() {
    let server = MockGoveeServer::start().await;
    server
        .mock_device_list(vec![
            device_entry("H5179", "AA:01", "Office"),
            device_entry("H5179", "AA:02", "Garage"),
        ])
        .await;

    let (platform, registry) = platform_for(&server).await;
    let cached = DeviceIdentity::new(DeviceDescriptor::new("H5179", "AA:01", "Office"));
    platform.configure_accessory(cached.clone()).await;

    let launch = LaunchSignal::new();
    launch.fire();
    let report = platform.run(&launch).await.unwrap();

    assert_eq!(report.restored, vec![cached.uuid]);
    assert_eq!(report.added.len(), 1);
    assert_eq!(registry.registration_count(), 1);
    assert_eq!(registry.identities().await.len(), 2);
}

#[tokio::test]
async fn test_malformed_entries_are_skipped() {
    let server = MockGoveeServer::start().await;
    server
        .mock_device_list(vec![
            device_entry("H5179", "AA:01", "Office"),
            json!({"sku": "H5179", "deviceName": "No address"}),
            json!({"device": "AA:03", "deviceName": "No model"}),
            json!({"sku": "H5179", "device": 42, "deviceName": "Wrong type"}),
            json!("not an object"),
            device_entry("H5075", "AA:02", "Cellar"),
        ])
        .await;

    let (platform, registry) = platform_for(&server).await;
    let report = platform.refresh().await.unwrap();

    assert_eq!(report.added.len(), 2);
    assert_eq!(registry.registration_count(), 2);
}

#[rstest]
#[case(401)]
#[case(404)]
#[case(429)]
#[case(500)]
#[tokio::test]
async fn test_failed_device_list_registers_nothing(#[case] status: u16) {
    let server = MockGoveeServer::start().await;
    server.mock_device_list_status(status).await;

    let (platform, registry) = platform_for(&server).await;
    let cached = DeviceIdentity::new(DeviceDescriptor::new("H5179", "AA:01", "Office"));
    platform.configure_accessory(cached.clone()).await;

    let report = platform.refresh().await.unwrap();

    assert!(report.list_unavailable);
    assert!(report.added.is_empty());
    assert!(report.stale.is_empty());
    assert_eq!(registry.registration_count(), 0);
    assert!(registry.lookup(&cached.uuid).await.is_some());
    assert!(platform.accessory(&cached.uuid).await.is_some());
}

#[tokio::test]
async fn test_device_missing_from_list_is_reported_stale() {
    let server = MockGoveeServer::start().await;
    server
        .mock_device_list(vec![device_entry("H5179", "AA:02", "Garage")])
        .await;

    let (platform, registry) = platform_for(&server).await;
    let cached = DeviceIdentity::new(DeviceDescriptor::new("H5179", "AA:01", "Office"));
    platform.configure_accessory(cached.clone()).await;

    let report = platform.refresh().await.unwrap();

    assert!(!report.list_unavailable);
    assert_eq!(report.stale, vec![cached.clone()]);
    assert!(registry.lookup(&cached.uuid).await.is_some());
}

#[rstest]
#[case(400)]
#[case(404)]
#[tokio::test]
async fn test_client_errors_are_not_retried(#[case] status: u16) {
    let server = MockGoveeServer::start().await;
    server.mock_device_list_status(status).await;

    let (platform, _registry) = platform_for(&server).await;
    let report = platform.refresh().await.unwrap();

    assert!(report.list_unavailable);
    assert_eq!(server.list_requests().await, 1);
}

#[tokio::test]
async fn test_renamed_device_is_updated_in_place() {
    let server = MockGoveeServer::start().await;
    server
        .mock_device_list(vec![device_entry("H5179", "AA:01", "Living room")])
        .await;

    let (platform, registry) = platform_for(&server).await;
    let cached = DeviceIdentity::new(DeviceDescriptor::new("H5179", "AA:01", "Office"));
    platform.configure_accessory(cached.clone()).await;

    let report = platform.refresh().await.unwrap();

    assert_eq!(report.updated, vec![cached.uuid]);
    assert_eq!(registry.registration_count(), 0);
    let identity = registry.lookup(&cached.uuid).await.unwrap();
    assert_eq!(identity.display_name, "Living room");
}
