//! Device discovery
//!
//! [`DeviceDirectory`] reads the vendor device list; [`DirectorySync`] maps
//! the result onto the host platform's identities.

pub mod device_directory;
pub mod directory_sync;

pub use device_directory::{normalize_entries, DeviceDirectory};
pub use directory_sync::{reconcile, DirectorySync, SyncReport};
