//! Device list normalization
//!
//! Turns the vendor's device list into [`DeviceDescriptor`]s. A failed call
//! degrades to an empty list for this cycle; a malformed entry is skipped
//! without affecting the others.

use crate::client::{DeviceEntry, GoveeApi};
use crate::models::DeviceDescriptor;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reads the account's device list from the vendor API
pub struct DeviceDirectory {
    api: Arc<dyn GoveeApi>,
}

impl DeviceDirectory {
    pub fn new(api: Arc<dyn GoveeApi>) -> Self {
        Self { api }
    }

    /// Discover devices, in the order the vendor lists them. Never fails.
    pub async fn discover_devices(&self) -> Vec<DeviceDescriptor> {
        self.fetch_descriptors().await.unwrap_or_default()
    }

    /// Like [`discover_devices`](Self::discover_devices), but `None` when the
    /// list itself could not be fetched, as opposed to an empty account.
    pub async fn fetch_descriptors(&self) -> Option<Vec<DeviceDescriptor>> {
        let entries = match self.api.list_devices().await {
            Ok(entries) => entries,
            Err(e) => {
                let code = e.to_error_code();
                error!(
                    error_code = code.as_number(),
                    category = code.category(),
                    retryable = e.is_retryable(),
                    "Failed to fetch device list: {e}"
                );
                return None;
            }
        };

        let total = entries.len();
        let descriptors = normalize_entries(entries);
        info!(
            "Discovered {} device(s) ({} skipped)",
            descriptors.len(),
            total - descriptors.len()
        );
        Some(descriptors)
    }
}

/// Keep entries with a non-empty model, address and name; first occurrence
/// of an address wins.
pub fn normalize_entries(entries: Vec<DeviceEntry>) -> Vec<DeviceDescriptor> {
    let mut seen = HashSet::new();
    let mut descriptors = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let Some(descriptor) = to_descriptor(entry) else {
            warn!("Skipping malformed device entry at index {index}");
            continue;
        };

        if !seen.insert(descriptor.address.clone()) {
            debug!(address = %descriptor.address, "Skipping duplicate device entry");
            continue;
        }

        descriptors.push(descriptor);
    }

    descriptors
}

fn to_descriptor(entry: DeviceEntry) -> Option<DeviceDescriptor> {
    let non_empty = |field: Option<String>| field.filter(|value| !value.trim().is_empty());

    Some(DeviceDescriptor {
        model: non_empty(entry.sku)?,
        address: non_empty(entry.device)?,
        display_name: non_empty(entry.device_name)?,
    })
}
