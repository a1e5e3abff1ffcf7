//! Schema bootstrap command

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use super::{load_settings, prepare_database, DatabaseArgs};
use crate::config::Overrides;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create tables and indexes, then verify constraint names
pub async fn run_migrate(args: MigrateArgs, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(
        config,
        Overrides {
            database_url: args.database.database_url,
            max_connections: args.database.max_connections,
            ..Default::default()
        },
    )?;

    let pool = prepare_database(&settings).await?;
    pool.close().await;

    tracing::info!("Schema is up to date");
    Ok(())
}
