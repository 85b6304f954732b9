//! Reading services
//!
//! Fetches device state on demand and turns the vendor's capability list
//! into a [`Reading`](crate::models::Reading).

pub mod capabilities;
pub mod reading_fetcher;

pub use capabilities::{extract_reading, Metric};
pub use reading_fetcher::{FetchStats, ReadingFetcher};
