//! Load command: sample cards onto a connected device.

use std::io::Write;

use anyhow::{Context, Result};
use flowrec_device::{AdbBridge, Bridge, LoadOutcome, Loader};

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let bridge = AdbBridge::new(config.device.adb_path.clone());
    run_with(writer, &bridge, config)
}

/// Runs the loader against any bridge.
pub fn run_with<W: Write, B: Bridge>(writer: &mut W, bridge: &B, config: &Config) -> Result<()> {
    writeln!(writer, "Test data loader for {}", config.device.package)?;

    let report = Loader::new(bridge, &config.device)
        .run()
        .context("failed to load test data")?;

    for attempt in &report.failed {
        writeln!(writer, "{} unavailable: {}", attempt.strategy, attempt.reason)?;
    }

    match report.outcome {
        LoadOutcome::DatabaseSeeded { cards } => {
            writeln!(writer, "Success! Test cards loaded")?;
            writeln!(writer, "   The app should now show {cards} test cards")?;
        }
        LoadOutcome::ImportTriggered => {
            writeln!(writer, "Import triggered!")?;
            writeln!(writer, "   Complete the import in the app UI")?;
        }
        LoadOutcome::ManualImport { device_path } => {
            writeln!(writer, "No automatic method succeeded")?;
            writeln!(writer, "   With the app open at the main screen:")?;
            writeln!(writer, "   Tap Menu -> Import/Export -> Import")?;
            writeln!(writer, "   Then select: {device_path}")?;
        }
    }

    Ok(())
}
