//! Loading sample data into a running app, falling back through strategies.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::bridge::{Bridge, BridgeError, BridgeOutput};
use crate::config::DeviceConfig;
use crate::seed::{SeedData, shell_command};

/// Conditions that stop the loader before any strategy can succeed.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// `adb devices` lists no attached device.
    #[error("no Android device connected")]
    NoDevice,

    /// The target package is not installed.
    #[error("package {package} is not installed on the device")]
    NotInstalled { package: String },

    /// The local CSV for the import fallback does not exist.
    #[error("seed CSV not found: {}", path.display())]
    SeedFileMissing { path: PathBuf },

    /// A required bridge command exited non-zero.
    #[error("`adb {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// The ways of getting sample data onto the device, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Write the app database through `run-as` (debuggable builds).
    DirectDatabase,
    /// Push a CSV and open it with the app's import intent.
    ImportIntent,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectDatabase => f.write_str("direct database insertion"),
            Self::ImportIntent => f.write_str("import intent"),
        }
    }
}

/// Result of trying one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The strategy did its job.
    Applied,
    /// The strategy did not apply, for the given reason.
    Failed(String),
}

/// A strategy that was tried and did not work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub strategy: Strategy,
    pub reason: String,
}

/// How the data ended up on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The database now holds `cards` sample cards.
    DatabaseSeeded { cards: usize },
    /// The import screen was opened; the user confirms it in the app.
    ImportTriggered,
    /// No automatic method worked; the CSV waits at `device_path`.
    ManualImport { device_path: String },
}

/// Result of a load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    pub failed: Vec<FailedAttempt>,
}

/// Drives one load against a device.
pub struct Loader<'a, B> {
    bridge: &'a B,
    config: &'a DeviceConfig,
    seed: SeedData,
}

impl<'a, B: Bridge> Loader<'a, B> {
    pub fn new(bridge: &'a B, config: &'a DeviceConfig) -> Self {
        Self {
            bridge,
            config,
            seed: SeedData::default(),
        }
    }

    /// Replaces the sample data written by the database strategy.
    #[must_use]
    pub fn with_seed(mut self, seed: SeedData) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the device and app, then tries each strategy in turn.
    pub fn run(&self) -> Result<LoadReport, DeviceError> {
        self.check_device()?;
        self.check_app_installed()?;

        let mut failed = Vec::new();

        match self.try_direct_database()? {
            Attempt::Applied => {
                return Ok(LoadReport {
                    outcome: LoadOutcome::DatabaseSeeded {
                        cards: self.seed.cards.len(),
                    },
                    failed,
                });
            }
            Attempt::Failed(reason) => failed.push(FailedAttempt {
                strategy: Strategy::DirectDatabase,
                reason,
            }),
        }

        match self.try_import_intent()? {
            Attempt::Applied => {
                return Ok(LoadReport {
                    outcome: LoadOutcome::ImportTriggered,
                    failed,
                });
            }
            Attempt::Failed(reason) => failed.push(FailedAttempt {
                strategy: Strategy::ImportIntent,
                reason,
            }),
        }

        Ok(LoadReport {
            outcome: LoadOutcome::ManualImport {
                device_path: self.config.device_csv_path.clone(),
            },
            failed,
        })
    }

    /// Fails unless `adb devices` reports an attached device.
    pub fn check_device(&self) -> Result<(), DeviceError> {
        let output = self.required(&["devices"])?;
        if !output.stdout.contains("\tdevice") {
            return Err(DeviceError::NoDevice);
        }
        tracing::debug!("device connected");
        Ok(())
    }

    /// Fails unless the configured package is installed.
    pub fn check_app_installed(&self) -> Result<(), DeviceError> {
        let command = shell_command(["pm", "list", "packages"]);
        let output = self.required(&["shell", command.as_str()])?;
        let wanted = format!("package:{}", self.config.package);
        if !output.stdout.lines().any(|line| line.trim() == wanted) {
            return Err(DeviceError::NotInstalled {
                package: self.config.package.clone(),
            });
        }
        tracing::debug!(package = %self.config.package, "app installed");
        Ok(())
    }

    /// Stops the app, writes the seed SQL through `run-as`, and restarts it.
    pub fn try_direct_database(&self) -> Result<Attempt, DeviceError> {
        let package = self.config.package.as_str();

        if !self.shell(&["am", "force-stop", package])?.success {
            tracing::debug!(package, "force-stop failed, continuing");
        }
        std::thread::sleep(self.config.settle_delay());

        let database = self.config.database_path();
        let sql = self.seed.to_sql();
        let output = self.shell(&["run-as", package, "sqlite3", database.as_str(), sql.as_str()])?;
        if !output.success {
            let reason = failure_reason(&output, "app not debuggable or no root");
            tracing::warn!(%reason, "direct database access not available");
            return Ok(Attempt::Failed(reason));
        }

        let component = self.config.launch_component();
        if !self.shell(&["am", "start", "-n", component.as_str()])?.success {
            tracing::warn!(%component, "seeded database but failed to restart the app");
        }

        Ok(Attempt::Applied)
    }

    /// Pushes the seed CSV and asks the app to open it.
    ///
    /// A missing local CSV is fatal; bridge failures only fail the strategy.
    pub fn try_import_intent(&self) -> Result<Attempt, DeviceError> {
        let seed_csv = &self.config.seed_csv;
        if !seed_csv.exists() {
            return Err(DeviceError::SeedFileMissing {
                path: seed_csv.clone(),
            });
        }

        let local = seed_csv.to_string_lossy();
        let push = self
            .bridge
            .run(&["push", &*local, self.config.device_csv_path.as_str()])?;
        if !push.success {
            let reason = failure_reason(&push, "push failed");
            tracing::warn!(%reason, "failed to push seed CSV");
            return Ok(Attempt::Failed(reason));
        }
        tracing::debug!(device_path = %self.config.device_csv_path, "seed CSV uploaded");

        let uri = format!("file://{}", self.config.device_csv_path);
        let start = self.shell(&[
            "am",
            "start",
            "-a",
            "android.intent.action.VIEW",
            "-d",
            uri.as_str(),
            "-t",
            "text/csv",
            self.config.package.as_str(),
        ])?;
        if !start.success {
            let reason = failure_reason(&start, "import intent not handled");
            tracing::warn!(%reason, "failed to trigger import intent");
            return Ok(Attempt::Failed(reason));
        }

        Ok(Attempt::Applied)
    }

    /// Runs `words` as one command line in the device shell.
    ///
    /// `adb shell` joins its arguments with spaces before the device shell
    /// parses them, so each word is quoted here.
    fn shell(&self, words: &[&str]) -> Result<BridgeOutput, BridgeError> {
        let command = shell_command(words.iter().copied());
        self.bridge.run(&["shell", command.as_str()])
    }

    fn required(&self, args: &[&str]) -> Result<BridgeOutput, DeviceError> {
        let output = self.bridge.run(args)?;
        if !output.success {
            return Err(DeviceError::CommandFailed {
                command: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn failure_reason(output: &BridgeOutput, fallback: &str) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        fallback.to_string()
    } else {
        stderr.to_string()
    }
}
