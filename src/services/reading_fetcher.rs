//! On-demand reading fetcher
//!
//! One state request per call, never cached. Callers that ask for the same
//! device while a request is already in flight wait for that request instead
//! of issuing their own, so the temperature and humidity reads of one
//! accessory cost a single round-trip.

use crate::client::GoveeApi;
use crate::error::{GoveeError, Result};
use crate::log_structured_error;
use crate::models::{DeviceDescriptor, Reading};
use crate::services::capabilities::extract_reading;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

type Waiters = Vec<oneshot::Sender<Result<Reading>>>;

/// Request counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    /// State requests actually sent
    pub requests: u64,
    /// Calls served by joining an in-flight request
    pub shared: u64,
}

/// Fetches readings for device descriptors
pub struct ReadingFetcher {
    api: Arc<dyn GoveeApi>,
    in_flight: Arc<Mutex<HashMap<String, Waiters>>>,
    requests: AtomicU64,
    shared: AtomicU64,
}

/// Removes the in-flight entry if the leading request is dropped before it
/// finishes, which releases its waiters with an error.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashMap<String, Waiters>>>,
    address: String,
    armed: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.armed {
            lock(&self.in_flight).remove(&self.address);
        }
    }
}

fn lock(map: &Mutex<HashMap<String, Waiters>>) -> MutexGuard<'_, HashMap<String, Waiters>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ReadingFetcher {
    pub fn new(api: Arc<dyn GoveeApi>) -> Self {
        Self {
            api,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            requests: AtomicU64::new(0),
            shared: AtomicU64::new(0),
        }
    }

    /// Fetch the current reading for a device
    pub async fn fetch_reading(&self, descriptor: &DeviceDescriptor) -> Result<Reading> {
        let joined = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get_mut(&descriptor.address) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    in_flight.insert(descriptor.address.clone(), Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = joined {
            self.shared.fetch_add(1, Ordering::Relaxed);
            debug!(address = %descriptor.address, "Joining in-flight state request");
            return rx.await.unwrap_or_else(|_| {
                Err(GoveeError::device_unreachable(
                    "shared state request was cancelled",
                ))
            });
        }

        let mut guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
            address: descriptor.address.clone(),
            armed: true,
        };

        let result = self.request_reading(descriptor).await;

        let waiters = lock(&self.in_flight)
            .remove(&descriptor.address)
            .unwrap_or_default();
        guard.armed = false;

        for waiter in waiters {
            let shared = match &result {
                Ok(reading) => Ok(*reading),
                Err(e) => Err(e.replicate()),
            };
            let _ = waiter.send(shared);
        }

        result
    }

    async fn request_reading(&self, descriptor: &DeviceDescriptor) -> Result<Reading> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let result = match self
            .api
            .device_state(&descriptor.model, &descriptor.address)
            .await
        {
            Ok(response) => extract_reading(&response),
            Err(GoveeError::MalformedResponse(reason)) => Err(GoveeError::device_unreachable(
                format!("unusable state response: {reason}"),
            )),
            Err(e) => Err(e),
        };

        match &result {
            Ok(reading) => debug!(
                address = %descriptor.address,
                temperature = reading.temperature_celsius,
                humidity = reading.relative_humidity_percent,
                "Fetched reading"
            ),
            Err(e) => log_structured_error!(
                e,
                "reading_fetcher",
                "fetch_reading",
                "address" => descriptor.address.as_str(),
                "model" => descriptor.model.as_str()
            ),
        }

        result
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            requests: self.requests.load(Ordering::Relaxed),
            shared: self.shared.load(Ordering::Relaxed),
        }
    }
}
