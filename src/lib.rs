//! Govee thermo-hygrometer bridge
//!
//! Discovers thermo-hygrometers on a Govee cloud account and exposes each one
//! to a smart-home host platform as a temperature and a humidity sensor.
//!
//! # Features
//!
//! - Device discovery from the vendor device list, reconciled against the
//!   host's persisted identities
//! - On-demand readings, one state request shared by both characteristics
//! - Typed errors separating device outages from misconfiguration
//! - Bounded timeouts and a single retry for transient failures

pub mod accessory;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod models;
pub mod platform;
pub mod services;

// Test support modules - available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types for convenience
pub use accessory::{Characteristic, CharacteristicError, HygrometerAccessory};
pub use config::BridgeConfig;
pub use error::{GoveeError, Result};
pub use models::{DeviceDescriptor, DeviceIdentity, Reading};
pub use platform::{AccessoryRegistry, GoveePlatform, InMemoryRegistry, LaunchSignal};
