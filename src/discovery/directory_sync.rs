//! Reconciles discovered devices against the host's known identities

use crate::discovery::DeviceDirectory;
use crate::error::{GoveeError, Result};
use crate::log_structured_error;
use crate::models::{DeviceDescriptor, DeviceIdentity};
use crate::platform::AccessoryRegistry;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one discovery cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Identities created and registered in this cycle
    pub added: Vec<DeviceIdentity>,
    /// Known identities seen again, untouched
    pub restored: Vec<Uuid>,
    /// Known identities whose descriptor changed and were updated in place
    pub updated: Vec<Uuid>,
    /// Known identities absent from this cycle's list. Reported, never removed.
    pub stale: Vec<DeviceIdentity>,
    /// The device list could not be fetched, so nothing was reconciled
    pub list_unavailable: bool,
}

impl SyncReport {
    /// Identities that are live after this cycle
    pub fn current_keys(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.added
            .iter()
            .map(|identity| identity.uuid)
            .chain(self.restored.iter().copied())
            .chain(self.updated.iter().copied())
    }
}

/// Runs discovery cycles against an injected registry
pub struct DirectorySync {
    directory: DeviceDirectory,
    running: AtomicBool,
}

/// Clears the running flag when a cycle ends, including on cancellation
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DirectorySync {
    pub fn new(directory: DeviceDirectory) -> Self {
        Self {
            directory,
            running: AtomicBool::new(false),
        }
    }

    /// Run one discovery cycle. Running it again with the same device list
    /// creates nothing new. Fails only when another cycle is in flight.
    pub async fn sync(&self, registry: &dyn AccessoryRegistry) -> Result<SyncReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Discovery requested while a cycle is already running");
            return Err(GoveeError::DiscoveryInProgress);
        }
        let _guard = RunningGuard(&self.running);

        match self.directory.fetch_descriptors().await {
            Some(descriptors) => Ok(reconcile(descriptors, registry).await),
            None => {
                warn!("Device list unavailable, known accessories are left as they are");
                Ok(SyncReport {
                    list_unavailable: true,
                    ..SyncReport::default()
                })
            }
        }
    }
}

/// Match descriptors to identities: reuse known keys, register unknown ones
pub async fn reconcile(
    descriptors: Vec<DeviceDescriptor>,
    registry: &dyn AccessoryRegistry,
) -> SyncReport {
    let mut report = SyncReport::default();
    let mut seen = HashSet::new();

    for descriptor in descriptors {
        let key = descriptor.identity_key();
        if !seen.insert(key) {
            continue;
        }

        match registry.lookup(&key).await {
            Some(existing) if existing.context == descriptor => {
                info!("Restoring existing accessory from cache: {}", existing.display_name);
                report.restored.push(key);
            }
            Some(mut existing) => {
                info!(
                    "Updating cached accessory {} -> {}",
                    existing.display_name, descriptor.display_name
                );
                existing.display_name = descriptor.display_name.clone();
                existing.context = descriptor;
                match registry.update(existing).await {
                    Ok(()) => report.updated.push(key),
                    Err(e) => {
                        log_structured_error!(e, "directory_sync", "update", "uuid" => key.to_string());
                        report.restored.push(key);
                    }
                }
            }
            None => {
                info!("Adding new accessory: {}", descriptor.display_name);
                let identity = DeviceIdentity::new(descriptor);
                match registry.register(identity.clone()).await {
                    Ok(()) => report.added.push(identity),
                    Err(e) => {
                        log_structured_error!(e, "directory_sync", "register", "uuid" => key.to_string());
                    }
                }
            }
        }
    }

    for identity in registry.identities().await {
        if !seen.contains(&identity.uuid) {
            warn!(
                "Accessory {} ({}) was not in the device list; keeping it registered",
                identity.display_name,
                identity.address()
            );
            report.stale.push(identity);
        }
    }

    report
}
