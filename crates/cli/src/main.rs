//! Zoo product form CLI - migrations and metaobject sync.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! zpf-cli migrate
//!
//! # Make sure the zoo_service metaobject definition exists
//! zpf-cli sync definition
//!
//! # Mirror every service into its metaobject
//! zpf-cli sync backfill
//! zpf-cli sync backfill --json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zpf-cli")]
#[command(author, version, about = "Zoo product form CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Metaobject sync operations
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
}

#[derive(Subcommand)]
enum SyncAction {
    /// Ensure the metaobject definition exists
    Definition,
    /// Mirror every stored service by handle
    Backfill {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zoo_product_form_admin=info,zpf_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Sync { action } => match action {
            SyncAction::Definition => commands::sync::definition().await,
            SyncAction::Backfill { json } => commands::sync::backfill(json).await,
        },
    }
}
