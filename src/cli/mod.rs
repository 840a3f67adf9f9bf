pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::config;
use crate::database::{DatabaseManager, DocumentStore};

#[derive(Parser)]
#[command(name = "hostelctl")]
#[command(about = "hostelctl - operator tooling for the Hostel Admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Hash or verify the shared dashboard password")]
    Password {
        #[command(subcommand)]
        cmd: commands::password::PasswordCommands,
    },

    #[command(about = "Repair legacy documents in place")]
    Migrate {
        #[command(subcommand)]
        cmd: commands::migrate::MigrateCommands,
    },

    #[command(about = "Insert default data")]
    Seed {
        #[command(subcommand)]
        cmd: commands::seed::SeedCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Store selected by the same environment the server reads
pub async fn connect_store() -> anyhow::Result<Arc<dyn DocumentStore>> {
    Ok(DatabaseManager::connect(config()).await?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Password { cmd } => commands::password::handle(cmd, output_format).await,
        Commands::Migrate { cmd } => commands::migrate::handle(cmd, output_format).await,
        Commands::Seed { cmd } => commands::seed::handle(cmd, output_format).await,
    }
}
