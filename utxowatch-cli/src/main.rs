//! utxowatch CLI - Command-line interface
//!
//! Provides command-line access to the utxowatch simulator.

mod commands;

use clap::Parser;
use utxowatch_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "utxowatch")]
#[command(about = "A synthetic block-explorer dashboard simulator")]
struct Cli {
    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), None)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    commands::handle_command(cli.command).await
}
