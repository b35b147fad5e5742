use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL connection pool without connecting.
///
/// The first query opens the connection, so an unreachable database shows up
/// as a catalog failure inside the batch rather than here.
pub fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect_lazy(database_url)?;

    info!("PostgreSQL connection pool configured");
    Ok(pool)
}
