//! react-to-svelte: convert React components into Svelte components.

mod cli;
mod config;
mod discovery;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let summary = orchestrator::run(&args).into_diagnostic()?;
    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
