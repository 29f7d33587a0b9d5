//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::fixture::FixtureArgs;
use crate::commands::parse::ParseArgs;

/// Flow recorder for Android test fixtures.
///
/// Turns `FLOW_EVENT` lines from logcat into JSON recordings and Kotlin
/// fixtures, and loads sample data onto a connected device.
#[derive(Debug, Parser)]
#[command(name = "flowrec", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a logcat capture into a JSON recording.
    Parse(ParseArgs),

    /// Regenerate the Kotlin fixture for an existing recording.
    Fixture(FixtureArgs),

    /// Load sample cards into the app on a connected device.
    Load,
}
