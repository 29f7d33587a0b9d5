//! Device loader settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the bridge lives, which app to target, and where the sample data
/// goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Bridge executable; a bare name is looked up on `PATH`.
    pub adb_path: PathBuf,
    /// Application package to seed.
    pub package: String,
    /// Local CSV export pushed for the import fallback.
    pub seed_csv: PathBuf,
    /// Where the CSV is pushed on the device.
    pub device_csv_path: String,
    /// Database file name inside the app's `databases/` directory.
    pub database_name: String,
    /// Activity started after seeding, relative to the package.
    pub launch_activity: String,
    /// Pause after stopping the app before touching its database.
    pub settle_delay_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: PathBuf::from("adb"),
            package: "me.hackerchick.catima.debug".to_string(),
            seed_csv: PathBuf::from("app/src/test/res/protect/card_locker/catima_v2.csv"),
            device_csv_path: "/sdcard/Download/catima_test_auto.csv".to_string(),
            database_name: "Catima.db".to_string(),
            launch_activity: ".MainActivity".to_string(),
            settle_delay_ms: 1000,
        }
    }
}

impl DeviceConfig {
    /// Absolute path of the app database on the device.
    pub fn database_path(&self) -> String {
        format!("/data/data/{}/databases/{}", self.package, self.database_name)
    }

    /// Component name for `am start -n`.
    pub fn launch_component(&self) -> String {
        format!("{}/{}", self.package, self.launch_activity)
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
