//! Host platform integration
//!
//! [`GoveePlatform`] is what a host embeds: it takes restored identities,
//! waits for the host's launch signal, runs discovery against the injected
//! [`AccessoryRegistry`] and keeps one [`HygrometerAccessory`] per identity
//! for characteristic reads.

pub mod launch;
pub mod registry;

pub use launch::LaunchSignal;
pub use registry::{AccessoryRegistry, InMemoryRegistry};

use crate::accessory::HygrometerAccessory;
use crate::client::{GoveeApi, GoveeHttpClient};
use crate::config::BridgeConfig;
use crate::discovery::{DeviceDirectory, DirectorySync, SyncReport};
use crate::error::Result;
use crate::models::DeviceIdentity;
use crate::services::ReadingFetcher;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Platform name reported to the host
pub const PLATFORM_NAME: &str = "GoveeHygrometer";

/// Bridge between the Govee cloud and a host platform
pub struct GoveePlatform {
    sync: DirectorySync,
    fetcher: Arc<ReadingFetcher>,
    registry: Arc<dyn AccessoryRegistry>,
    accessories: RwLock<HashMap<Uuid, Arc<HygrometerAccessory>>>,
}

impl GoveePlatform {
    pub fn new(api: Arc<dyn GoveeApi>, registry: Arc<dyn AccessoryRegistry>) -> Self {
        Self {
            sync: DirectorySync::new(DeviceDirectory::new(api.clone())),
            fetcher: Arc::new(ReadingFetcher::new(api)),
            registry,
            accessories: RwLock::new(HashMap::new()),
        }
    }

    /// Validate the configuration and build a platform backed by the HTTP client
    pub fn from_config(config: &BridgeConfig, registry: Arc<dyn AccessoryRegistry>) -> Result<Self> {
        config.validate()?;
        let api = GoveeHttpClient::new(&config.govee)?;
        Ok(Self::new(Arc::new(api), registry))
    }

    /// Restore an identity the host persisted in an earlier run. Called by the
    /// host before launch finishes.
    pub async fn configure_accessory(&self, identity: DeviceIdentity) {
        info!("Loading accessory from cache: {}", identity.display_name);
        self.attach(identity.clone()).await;
        self.registry.restore(identity).await;
    }

    /// Wait for the host's launch signal, then run the first discovery cycle
    pub async fn run(&self, launch: &LaunchSignal) -> Result<SyncReport> {
        launch.wait().await;
        info!("{PLATFORM_NAME} finished launching, discovering devices");
        self.refresh().await
    }

    /// Run a discovery cycle and wire read handlers for every live identity
    pub async fn refresh(&self) -> Result<SyncReport> {
        let report = self.sync.sync(self.registry.as_ref()).await?;

        for key in report.current_keys() {
            if let Some(identity) = self.registry.lookup(&key).await {
                self.attach(identity).await;
            }
        }

        info!(
            added = report.added.len(),
            restored = report.restored.len(),
            updated = report.updated.len(),
            stale = report.stale.len(),
            list_unavailable = report.list_unavailable,
            "Discovery cycle complete"
        );
        Ok(report)
    }

    async fn attach(&self, identity: DeviceIdentity) {
        let accessory = Arc::new(HygrometerAccessory::new(identity, self.fetcher.clone()));
        self.accessories
            .write()
            .await
            .insert(accessory.identity().uuid, accessory);
    }

    /// Accessory for an identity key, if one is wired
    pub async fn accessory(&self, uuid: &Uuid) -> Option<Arc<HygrometerAccessory>> {
        self.accessories.read().await.get(uuid).cloned()
    }

    pub async fn accessories(&self) -> Vec<Arc<HygrometerAccessory>> {
        self.accessories.read().await.values().cloned().collect()
    }

    pub fn fetcher(&self) -> &Arc<ReadingFetcher> {
        &self.fetcher
    }
}
