use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a lazily-connecting PostgreSQL pool. Nothing is dialed until the
/// first query, so an unreachable database degrades vector lookups to
/// "absent" instead of failing startup.
pub fn create_pool(database_url: &str, acquire_timeout: Duration) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)?;

    info!("PostgreSQL pool configured (lazy connect)");
    Ok(pool)
}
