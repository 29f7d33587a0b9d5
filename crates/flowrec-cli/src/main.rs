use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowrec_cli::commands::{fixture, load, parse};
use flowrec_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support; warnings about skipped
    // log lines are shown unless RUST_LOG says otherwise.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Parse(args)) => {
            let config = load_config(cli.config.as_deref())?;
            parse::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Fixture(args)) => {
            let config = load_config(cli.config.as_deref())?;
            fixture::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Load) => {
            let config = load_config(cli.config.as_deref())?;
            load::run(&mut stdout, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
