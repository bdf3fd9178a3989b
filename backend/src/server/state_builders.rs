//! Builders for the repository ports behind the HTTP state.

use std::io;

use backend::ServerSettings;
use backend::domain::RepositoryPorts;
use backend::outbound::memory::InMemoryStore;
use backend::outbound::persistence::{DbPool, PoolConfig, PostgresStore, run_migrations};
use tracing::{info, warn};

/// Repository ports for the configured store.
///
/// With a database URL, pending migrations are applied before the pool is
/// built. Without one, data lives in memory for the lifetime of the process.
///
/// # Errors
/// Returns [`io::Error`] when migrations fail or the pool cannot be built.
pub(crate) async fn build_ports(settings: &ServerSettings) -> io::Result<RepositoryPorts> {
    let Some(url) = settings.database_url() else {
        warn!("no database configured; data is kept in memory");
        return Ok(InMemoryStore::new().ports());
    };

    let applied = run_migrations(url).await.map_err(io::Error::other)?;
    info!(applied, "database schema up to date");

    let config = PoolConfig::new(url).with_max_size(settings.pool_max_size());
    let pool = DbPool::new(config).await.map_err(io::Error::other)?;
    Ok(PostgresStore::new(pool).ports())
}
