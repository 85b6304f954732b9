//! Known-identity registry owned by the host platform
//!
//! Directory sync only sees the registry through [`AccessoryRegistry`], so a
//! host can back it with its own persistence. [`InMemoryRegistry`] is the
//! default used by the CLI and the tests.

use crate::error::{GoveeError, Result};
use crate::models::DeviceIdentity;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Identity store the host platform injects into the bridge
#[async_trait]
pub trait AccessoryRegistry: Send + Sync {
    /// Find a known identity by key
    async fn lookup(&self, uuid: &Uuid) -> Option<DeviceIdentity>;

    /// Register a newly created identity with the host platform
    async fn register(&self, identity: DeviceIdentity) -> Result<()>;

    /// Replace the stored copy of an already registered identity
    async fn update(&self, identity: DeviceIdentity) -> Result<()>;

    /// Re-insert an identity persisted by the host across restarts
    async fn restore(&self, identity: DeviceIdentity);

    /// All known identities
    async fn identities(&self) -> Vec<DeviceIdentity>;
}

/// Registry kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    identities: RwLock<HashMap<Uuid, DeviceIdentity>>,
    registrations: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `register` calls
    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::Relaxed)
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl AccessoryRegistry for InMemoryRegistry {
    async fn lookup(&self, uuid: &Uuid) -> Option<DeviceIdentity> {
        self.identities.read().await.get(uuid).cloned()
    }

    async fn register(&self, identity: DeviceIdentity) -> Result<()> {
        let mut identities = self.identities.write().await;
        if identities.contains_key(&identity.uuid) {
            return Err(GoveeError::invalid_input(format!(
                "identity {} is already registered",
                identity.uuid
            )));
        }

        debug!(uuid = %identity.uuid, address = identity.address(), "Registered identity");
        identities.insert(identity.uuid, identity);
        self.registrations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn update(&self, identity: DeviceIdentity) -> Result<()> {
        let mut identities = self.identities.write().await;
        match identities.get_mut(&identity.uuid) {
            Some(existing) => {
                *existing = identity;
                Ok(())
            }
            None => Err(GoveeError::invalid_input(format!(
                "identity {} is not registered",
                identity.uuid
            ))),
        }
    }

    async fn restore(&self, identity: DeviceIdentity) {
        self.identities.write().await.insert(identity.uuid, identity);
    }

    async fn identities(&self) -> Vec<DeviceIdentity> {
        self.identities.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceDescriptor;

    fn identity(address: &str) -> DeviceIdentity {
        DeviceIdentity::new(DeviceDescriptor::new("H5179", address, "Sensor"))
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let registry = InMemoryRegistry::new();
        registry.register(identity("AA")).await.unwrap();
        assert!(registry.register(identity("AA")).await.is_err());
        assert_eq!(registry.registration_count(), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_restore_does_not_count_as_registration() {
        let registry = InMemoryRegistry::new();
        let restored = identity("BB");
        registry.restore(restored.clone()).await;

        assert_eq!(registry.registration_count(), 0);
        assert_eq!(registry.lookup(&restored.uuid).await, Some(restored));
    }

    #[tokio::test]
    async fn test_update_requires_known_identity() {
        let registry = InMemoryRegistry::new();
        assert!(registry.update(identity("CC")).await.is_err());

        registry.register(identity("CC")).await.unwrap();
        let mut renamed = identity("CC");
        renamed.display_name = "Basement".to_string();
        registry.update(renamed.clone()).await.unwrap();

        assert_eq!(registry.lookup(&renamed.uuid).await.unwrap().display_name, "Basement");
    }
}
