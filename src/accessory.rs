//! Hygrometer accessory exposed to the host platform
//!
//! Each identity gets two read-only characteristics. Reads go straight to the
//! [`ReadingFetcher`]; any failure surfaces as
//! [`CharacteristicError::NotResponding`] so the host can mark the device
//! unresponsive instead of showing a stale or bogus value.

use crate::error::GoveeError;
use crate::models::{DeviceIdentity, Reading};
use crate::services::ReadingFetcher;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Manufacturer shown in accessory information
pub const MANUFACTURER: &str = "Govee";

/// Sensor characteristics a hygrometer accessory exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Characteristic {
    CurrentTemperature,
    CurrentRelativeHumidity,
}

/// Host-facing read failure
#[derive(Error, Debug)]
pub enum CharacteristicError {
    /// Device could not be read; transient from the host's point of view
    #[error("Device not responding: {reason}")]
    NotResponding {
        reason: String,
        /// True when the cause is a configuration problem an operator must fix
        permanent: bool,
    },
}

impl CharacteristicError {
    pub fn is_permanent(&self) -> bool {
        match self {
            CharacteristicError::NotResponding { permanent, .. } => *permanent,
        }
    }
}

impl From<GoveeError> for CharacteristicError {
    fn from(error: GoveeError) -> Self {
        CharacteristicError::NotResponding {
            permanent: error.is_permanent(),
            reason: error.sanitized_message(),
        }
    }
}

/// Display metadata for the host's accessory information service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub name: String,
}

/// One thermo-hygrometer bound to the reading fetcher
pub struct HygrometerAccessory {
    identity: DeviceIdentity,
    fetcher: Arc<ReadingFetcher>,
}

impl HygrometerAccessory {
    pub fn new(identity: DeviceIdentity, fetcher: Arc<ReadingFetcher>) -> Self {
        Self { identity, fetcher }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            manufacturer: MANUFACTURER.to_string(),
            model: self.identity.context.model.clone(),
            serial_number: self.identity.context.address.clone(),
            name: self.identity.display_name.clone(),
        }
    }

    /// Fetch both values with one request
    pub async fn read_both(&self) -> Result<Reading, CharacteristicError> {
        Ok(self.fetcher.fetch_reading(&self.identity.context).await?)
    }

    /// Read handler for a single characteristic
    pub async fn read(&self, characteristic: Characteristic) -> Result<f64, CharacteristicError> {
        let reading = self.read_both().await?;
        Ok(match characteristic {
            Characteristic::CurrentTemperature => reading.temperature_celsius,
            Characteristic::CurrentRelativeHumidity => reading.relative_humidity_percent,
        })
    }

    pub async fn read_temperature(&self) -> Result<f64, CharacteristicError> {
        self.read(Characteristic::CurrentTemperature).await
    }

    pub async fn read_humidity(&self) -> Result<f64, CharacteristicError> {
        self.read(Characteristic::CurrentRelativeHumidity).await
    }
}
