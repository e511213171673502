//! crmsync CLI - Command-line interface for crmsync
//!
//! Provides commands for:
//! - Reconciling a Drive folder into the record store
//! - Listing synced records
//! - Managing leads and replaying call events
//! - Inspecting configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    config::ConfigCommand, leads::LeadsCommand, records::RecordsCommand, sync::SyncCommand,
    Context,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "crmsync", version, about = "Drive folder sync and PBX call tracking")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile a Drive folder into the record store
    Sync(SyncCommand),
    /// Inspect synced records
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Manage leads
    #[command(subcommand)]
    Leads(LeadsCommand),
    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = Context::new(cli.config, format);

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Records(cmd) => cmd.execute(&ctx).await,
        Commands::Leads(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    }
}
