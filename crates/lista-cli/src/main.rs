//! lista CLI
//!
//! Command-line interface for lista - shared Markdown lists with
//! offline-safe saves.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lista_core::Config;

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "lista")]
#[command(about = "lista - shared Markdown lists with offline-safe saves")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save Markdown for a list (queued locally when offline)
    Save {
        /// List id
        list_id: String,
        /// Read the Markdown body from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show locally queued changes
    Pending,
    /// Replay queued changes against the server
    Sync,
    /// Show connectivity and queue status
    Status,
    /// Watch connectivity and sync continuously
    Watch,
    /// Create a new list or template locally
    New {
        /// List title
        title: String,
        /// Create a template instead of a regular list
        #[arg(long)]
        template: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, server_url, probe_interval_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config management doesn't need a loaded (and validated) config
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, &output)
            }
        };
    }

    let config = Config::load()?;

    match cli.command {
        Commands::Save { list_id, file } => {
            commands::save::run(&config, list_id, file, &output).await
        }
        Commands::Pending => commands::pending::show(&config, &output),
        Commands::Sync => commands::sync::run(&config, &output).await,
        Commands::Status => commands::status::show(&config, &output).await,
        Commands::Watch => commands::watch::run(&config, &output).await,
        Commands::New { title, template } => commands::new::create(title, template, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}
