//! HTTP server command

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use drillbook_server::run_server;

use super::{load_settings, prepare_database, DatabaseArgs};
use crate::config::Overrides;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', env = "DRILLBOOK_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(
        config,
        Overrides {
            bind: args.bind,
            cors_permissive: args.cors_permissive,
            database_url: args.database.database_url,
            max_connections: args.database.max_connections,
        },
    )?;

    tracing::info!("Starting drillbook server on {}", settings.server.bind_addr);

    let pool = prepare_database(&settings).await?;

    // Run server (blocks until shutdown)
    run_server(pool, settings.server)
        .await
        .context("Server error")?;

    Ok(())
}
