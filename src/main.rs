//! Playdeck command-line entry point.

use clap::{CommandFactory, Parser};
use playdeck::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("playdeck=info".parse()?))
        .init();

    if !cli::run_command(&args)? {
        cli::Cli::command().print_help()?;
    }
    Ok(())
}
