//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use flowrec_core::{DEFAULT_FIXTURE_PACKAGE, DEFAULT_MARKER};
use flowrec_device::DeviceConfig;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text that precedes each flow event payload in the log.
    pub marker: String,
    /// Package declared by generated fixtures.
    pub fixture_package: String,
    /// Device loader settings.
    pub device: DeviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            fixture_package: DEFAULT_FIXTURE_PACKAGE.to_string(),
            device: DeviceConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`,
    /// then `FLOWREC_*` environment variables (`__` separates nested keys,
    /// e.g. `FLOWREC_DEVICE__PACKAGE`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("FLOWREC_").split("__"));

        figment.extract()
    }

    /// Source directory that matches `fixture_package`, for copy hints.
    pub fn fixture_source_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from("app/src/test/java");
        dir.extend(self.fixture_package.split('.'));
        dir
    }
}

/// Returns the platform-specific config directory for flowrec.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("flowrec"))
}
