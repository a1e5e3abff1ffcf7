//! drillbook CLI - runs the drill catalog HTTP API
//!
//! - `serve`: bootstrap the schema and serve the REST API
//! - `migrate`: bootstrap the schema and exit

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::migrate::{run_migrate, MigrateArgs};
use commands::serve::{run_serve, ServeArgs};
use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "drillbook",
    author,
    version,
    about = "Catalog of defense drills with categories and step-by-step instructions"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.drillbook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the REST API
    Serve(ServeArgs),
    /// Create the database schema and exit
    Migrate(MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; values already in the environment win
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })?;

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => run_serve(args, config).await,
        Commands::Migrate(args) => run_migrate(args, config).await,
    }
}
