use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::recommendation::PersistedRecommendation;

/// Append-only sink for accepted recommendations.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save(&self, recommendation: &PersistedRecommendation) -> Result<(), StoreError>;
}

/// Writes to the `recommendations` table.
/// No uniqueness on (movie_id, emotion, reason): re-running a batch appends duplicates.
pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save(&self, recommendation: &PersistedRecommendation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO recommendations (movie_id, emotion, reason, recommendation_text)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(recommendation.movie_id)
        .bind(&recommendation.emotion)
        .bind(&recommendation.reason)
        .bind(&recommendation.recommendation_text)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
