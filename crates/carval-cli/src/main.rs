//! carval CLI - price a vehicle with an exported model.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use carval_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only results.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("carval CLI starting...");

    match cli.command {
        Commands::Predict(cmd) => cmd.run()?,
        Commands::Interactive(cmd) => cmd.run()?,
        Commands::Schema(cmd) => cmd.run()?,
        Commands::Options(cmd) => cmd.run()?,
    }

    info!("carval CLI completed successfully");
    Ok(())
}
