mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use bizdash_core::{BizdashConfig, EntityKind};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bizdash")]
#[command(about = "Bulk-import customers and inventory into your bizdash dashboard")]
struct Cli {
    /// Dashboard API base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides config and BIZDASH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file, one row at a time
    Import {
        /// customers or inventory
        entity: EntityKind,

        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Parse and validate a CSV file without importing it
    Check {
        /// customers or inventory
        entity: EntityKind,

        file: PathBuf,
    },
    /// Print a CSV header row with every recognized column
    Template {
        /// customers or inventory
        entity: EntityKind,
    },
    /// Show or change settings
    Config {
        #[arg(long)]
        set_api_url: Option<String>,

        #[arg(long)]
        set_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Import { entity, file, yes } => {
            let mut config = BizdashConfig::load()?;
            init_logging(&config.log_level);
            tracing::debug!(api_url = %config.api_url, "loaded config");

            apply_overrides(&mut config, cli.api_url, cli.token);
            commands::import::run(&config, entity, &file, yes).await
        }
        Commands::Check { entity, file } => {
            init_logging(&BizdashConfig::default().log_level);
            commands::check::run(entity, &file).await
        }
        Commands::Template { entity } => {
            commands::template::run(entity);
            Ok(())
        }
        Commands::Config {
            set_api_url,
            set_token,
        } => {
            init_logging(&BizdashConfig::default().log_level);
            commands::config::run(set_api_url, set_token)
        }
    }
}

fn apply_overrides(config: &mut BizdashConfig, api_url: Option<String>, token: Option<String>) {
    if let Some(url) = api_url {
        config.api_url = url;
    }
    if token.is_some() {
        config.token = token;
    }
}

/// Log to stderr. RUST_LOG wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
