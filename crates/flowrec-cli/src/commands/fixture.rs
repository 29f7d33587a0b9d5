//! Fixture command: Kotlin fixture from a saved recording.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use flowrec_core::{FixtureRenderer, Recording};

use crate::Config;

#[derive(Debug, Args)]
pub struct FixtureArgs {
    /// Recording JSON written by `flowrec parse`.
    pub recording: PathBuf,

    /// Where to write the fixture (defaults to the recording path with `.kt`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run<W: Write>(writer: &mut W, args: &FixtureArgs, config: &Config) -> Result<()> {
    let contents = fs::read_to_string(&args.recording)
        .with_context(|| format!("failed to read {}", args.recording.display()))?;
    let recording: Recording = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", args.recording.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.recording.with_extension("kt"));
    write_fixture(&output, &recording, &config.fixture_package)?;

    writeln!(writer, "Generated Kotlin fixture: {}", output.display())?;
    writeln!(
        writer,
        "   Copy this to: {}/",
        config.fixture_source_dir().display()
    )?;
    Ok(())
}

/// Renders `recording` and writes it to `path`.
pub fn write_fixture(path: &Path, recording: &Recording, package: &str) -> Result<()> {
    let source = FixtureRenderer::new(package)
        .render(recording)
        .context("failed to render fixture")?;
    fs::write(path, source).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote fixture");
    Ok(())
}
