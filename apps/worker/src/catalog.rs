use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::errors::CatalogError;
use crate::models::movie::Subject;

/// Source of movies for a batch run.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Returns every movie, or at most `limit` when bounded.
    /// An empty catalog is `Ok(vec![])`, not an error.
    async fn fetch_subjects(&self, limit: Option<u32>) -> Result<Vec<Subject>, CatalogError>;
}

/// Reads the `movies` table.
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PgCatalog {
    async fn fetch_subjects(&self, limit: Option<u32>) -> Result<Vec<Subject>, CatalogError> {
        // LIMIT NULL is no limit in Postgres; ORDER BY id keeps bounded runs reproducible.
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id::BIGINT AS id, title, COALESCE(synopsis, '') AS synopsis
            FROM movies
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;

        info!("Fetched {} movies from catalog", subjects.len());
        Ok(subjects)
    }
}
