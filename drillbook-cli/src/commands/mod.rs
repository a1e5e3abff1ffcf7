//! Subcommand implementations

pub mod migrate;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use drillbook_server::db::{create_pool_with_options, schema, PgPool};

use crate::config::{FileConfig, Overrides, Settings};

/// Database connection arguments shared by all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pool connections (default: 5)
    #[arg(long)]
    pub max_connections: Option<u32>,
}

/// Resolve settings from flags, environment and the config file
pub(crate) fn load_settings(config: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let file = FileConfig::load(config)?;
    Settings::resolve(overrides, file)
}

/// Connect, create the schema if needed and check constraint names
pub(crate) async fn prepare_database(settings: &Settings) -> Result<PgPool> {
    let pool = create_pool_with_options(&settings.database_url, settings.max_connections)
        .await
        .context("Failed to create database pool")?;

    schema::run(&pool)
        .await
        .context("Failed to create database schema")?;
    schema::verify_constraints(&pool)
        .await
        .context("Database schema does not match")?;

    Ok(pool)
}
