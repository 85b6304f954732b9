//! Core data model shared by discovery, reading and the host platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving identity keys from device addresses
pub const IDENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x8c5b_7f3e_2d41_5a96_b0e7_41c2_9d3f_6a18);

/// Scale factor between raw vendor values and human units
pub const VALUE_SCALE: f64 = 100.0;

/// Normalized record identifying one physical sensor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Vendor SKU, e.g. "H5179"
    pub model: String,
    /// Vendor device identifier; unique per device
    pub address: String,
    /// Name given in the vendor app
    pub display_name: String,
}

impl DeviceDescriptor {
    pub fn new(
        model: impl Into<String>,
        address: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            address: address.into(),
            display_name: display_name.into(),
        }
    }

    /// Stable identity key for this device
    pub fn identity_key(&self) -> Uuid {
        identity_key(&self.address)
    }
}

/// Derive the identity key for a device address. Same address, same key,
/// across processes and restarts.
pub fn identity_key(address: &str) -> Uuid {
    Uuid::new_v5(&IDENTITY_NAMESPACE, address.as_bytes())
}

/// The host platform's persisted handle for a device descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Key derived from the descriptor address
    pub uuid: Uuid,
    /// Name shown by the host platform
    pub display_name: String,
    /// Descriptor the identity was created for
    pub context: DeviceDescriptor,
}

impl DeviceIdentity {
    /// Create an identity for a newly discovered device
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        Self {
            uuid: descriptor.identity_key(),
            display_name: descriptor.display_name.clone(),
            context: descriptor,
        }
    }

    pub fn address(&self) -> &str {
        &self.context.address
    }
}

/// One fetched temperature/humidity sample. Never cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_celsius: f64,
    pub relative_humidity_percent: f64,
    pub sampled_at: DateTime<Utc>,
}

impl Reading {
    /// Build a reading from raw vendor values (hundredths of a unit)
    pub fn from_raw(raw_temperature: f64, raw_humidity: f64) -> Self {
        Self {
            temperature_celsius: raw_temperature / VALUE_SCALE,
            relative_humidity_percent: raw_humidity / VALUE_SCALE,
            sampled_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_is_deterministic() {
        let a = DeviceDescriptor::new("H5179", "AA:BB:CC:DD", "Office");
        let b = DeviceDescriptor::new("H5075", "AA:BB:CC:DD", "Renamed");
        assert_eq!(a.identity_key(), b.identity_key());
        assert_eq!(a.identity_key(), identity_key("AA:BB:CC:DD"));
        assert_ne!(a.identity_key(), identity_key("AA:BB:CC:DE"));
    }

    #[test]
    fn test_identity_owns_descriptor() {
        let descriptor = DeviceDescriptor::new("H5179", "AA:BB", "Office");
        let identity = DeviceIdentity::new(descriptor.clone());
        assert_eq!(identity.uuid, descriptor.identity_key());
        assert_eq!(identity.display_name, "Office");
        assert_eq!(identity.address(), "AA:BB");
        assert_eq!(identity.context, descriptor);
    }

    #[test]
    fn test_reading_scale() {
        let reading = Reading::from_raw(2500.0, 4530.0);
        assert_eq!(reading.temperature_celsius, 25.0);
        assert!((reading.relative_humidity_percent - 45.3).abs() < 1e-9);
    }
}
