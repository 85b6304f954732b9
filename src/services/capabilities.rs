//! Metric extraction from device state responses
//!
//! Capabilities are located by their `instance` identifier. Responses whose
//! capabilities carry no identifiers at all fall back to the fixed positions
//! the vendor has historically used. Any gap becomes
//! [`GoveeError::DeviceUnreachable`].

use crate::client::{Capability, StateResponse};
use crate::error::{GoveeError, Result};
use crate::models::Reading;
use serde_json::Value;

/// Metrics a thermo-hygrometer reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
}

impl Metric {
    /// Vendor capability identifier
    pub fn instance(self) -> &'static str {
        match self {
            Metric::Temperature => "sensorTemperature",
            Metric::Humidity => "sensorHumidity",
        }
    }

    fn legacy_index(self) -> usize {
        match self {
            Metric::Temperature => 1,
            Metric::Humidity => 2,
        }
    }

    fn nested_field(self) -> &'static str {
        match self {
            Metric::Temperature => "currentTemperature",
            Metric::Humidity => "currentHumidity",
        }
    }
}

/// Pull temperature and humidity out of one state response
pub fn extract_reading(response: &StateResponse) -> Result<Reading> {
    if let Some(code) = response.code {
        if code != 200 {
            return Err(GoveeError::device_unreachable(format!(
                "state request returned code {code}: {}",
                response.msg.as_deref().unwrap_or("no message")
            )));
        }
    }

    let capabilities = response
        .payload
        .as_ref()
        .and_then(|payload| payload.capabilities.as_deref())
        .ok_or_else(|| GoveeError::device_unreachable("state response has no capabilities"))?;

    let temperature = raw_metric(capabilities, Metric::Temperature)?;
    let humidity = raw_metric(capabilities, Metric::Humidity)?;
    Ok(Reading::from_raw(temperature, humidity))
}

/// Raw (unscaled) value of one metric
pub fn raw_metric(capabilities: &[Capability], metric: Metric) -> Result<f64> {
    let capability = find_capability(capabilities, metric).ok_or_else(|| {
        GoveeError::device_unreachable(format!("capability {} missing", metric.instance()))
    })?;

    let value = capability
        .state
        .as_ref()
        .map(|state| &state.value)
        .unwrap_or(&Value::Null);

    numeric(value, metric.nested_field()).ok_or_else(|| {
        GoveeError::device_unreachable(format!(
            "capability {} has no numeric value: {value}",
            metric.instance()
        ))
    })
}

fn find_capability(capabilities: &[Capability], metric: Metric) -> Option<&Capability> {
    let identified = capabilities.iter().any(|c| c.instance.is_some());
    if identified {
        capabilities
            .iter()
            .find(|c| c.instance.as_deref() == Some(metric.instance()))
    } else {
        capabilities.get(metric.legacy_index())
    }
}

fn numeric(value: &Value, nested_field: &str) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.get(nested_field).and_then(Value::as_f64))
}
