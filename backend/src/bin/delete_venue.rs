//! Delete a venue and its stock-less offers from the command line.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;

use backend::domain::ports::VenueService;
use backend::domain::{DomainVenueService, VenueId};
use backend::outbound::persistence::{DbPool, PoolConfig, PostgresStore};
use clap::Parser;
use tokio::runtime::Builder;

const DATABASE_URL_ENV: &str = "PASS_CULTURE_DATABASE_URL";

/// `delete-venue` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "delete-venue",
    about = "Delete a venue together with its offers, provided none has stocks",
    version
)]
struct CliArgs {
    /// Identifier of the venue to delete.
    #[arg(value_name = "venue-id")]
    venue_id: VenueId,
    /// Database connection URL. Falls back to `PASS_CULTURE_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url, env::var(DATABASE_URL_ENV).ok())?;
    let config = PoolConfig::new(&database_url)
        .with_max_size(1)
        .with_min_idle(None);
    let pool = DbPool::new(config)
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let service = DomainVenueService::new(PostgresStore::new(pool).ports());
    service
        .delete(&args.venue_id)
        .await
        .map_err(|error| io::Error::other(format!("delete venue {}: {error}", args.venue_id)))?;

    println!("deleted venue {}", args.venue_id);
    Ok(())
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("database URL missing: set --database-url or {DATABASE_URL_ENV}"),
        )),
    }
}
