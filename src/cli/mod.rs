pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::services::ServiceFactory;

#[derive(Parser)]
#[command(name = "tenders")]
#[command(about = "Tenders CLI - browse, manage and subscribe to tenders locally or against the API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, conflicts_with = "remote", help = "Use the local simulated store")]
    pub local: bool,

    #[arg(long, global = true, help = "Call the remote API")]
    pub remote: bool,

    #[arg(long, global = true, help = "API base URL, e.g. http://localhost:3000/api")]
    pub api_url: Option<String>,

    #[arg(long, global = true, help = "Directory holding the session and local data")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Browse, search and manage tenders")]
    Tender {
        #[command(subcommand)]
        cmd: commands::tender::TenderCommands,
    },

    #[command(about = "Login, logout and registration")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Profiles and passwords")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Create demo users and tenders in the database")]
    Seed {
        #[arg(long, help = "Create tables before seeding")]
        bootstrap: bool,
    },

    #[command(about = "Show the effective client configuration and API reachability")]
    Status,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client_config = config::resolve_client_config(&cli);
    tracing::debug!("client config: {:?}", client_config);

    let factory = || ServiceFactory::with_file_store(client_config.clone());

    match cli.command {
        Commands::Tender { cmd } => commands::tender::handle(cmd, &factory(), output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &factory(), output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &factory(), output_format).await,
        Commands::Seed { bootstrap } => commands::seed::handle(bootstrap, output_format).await,
        Commands::Status => config::handle_status(&client_config, output_format).await,
    }
}
