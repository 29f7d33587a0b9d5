//! Loading sample data into a running app over the device bridge.
//!
//! The loader tries, in order:
//! - writing the app database directly via `run-as` (debuggable builds)
//! - pushing a CSV export and opening it with the app's import intent
//! - leaving the CSV on the device for a manual import

mod bridge;
mod config;
mod loader;
pub mod seed;

pub use bridge::{AdbBridge, Bridge, BridgeError, BridgeOutput};
pub use config::DeviceConfig;
pub use loader::{Attempt, DeviceError, FailedAttempt, LoadOutcome, LoadReport, Loader, Strategy};
pub use seed::{SeedCard, SeedData, SeedGroup};
