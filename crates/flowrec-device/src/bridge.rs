//! Invocation of the device bridge (`adb`).

use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// Errors starting the bridge process.
///
/// A bridge command that runs but exits non-zero is not an error here; see
/// [`BridgeOutput::success`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge executable does not exist.
    #[error("device bridge not found: {}", program.display())]
    NotFound { program: PathBuf },

    /// The process could not be spawned or waited on.
    #[error("failed to run {}: {source}", program.display())]
    Io {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Captured result of one bridge command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl BridgeOutput {
    /// Output of a command that exited zero.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a command that exited non-zero.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs device bridge commands.
pub trait Bridge {
    /// Runs the bridge with `args` and waits for it to exit.
    fn run(&self, args: &[&str]) -> Result<BridgeOutput, BridgeError>;
}

/// [`Bridge`] backed by an `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: PathBuf,
}

impl AdbBridge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Bridge for AdbBridge {
    fn run(&self, args: &[&str]) -> Result<BridgeOutput, BridgeError> {
        tracing::debug!(program = %self.program.display(), ?args, "running device bridge");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    BridgeError::NotFound {
                        program: self.program.clone(),
                    }
                } else {
                    BridgeError::Io {
                        program: self.program.clone(),
                        source,
                    }
                }
            })?;

        Ok(BridgeOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
