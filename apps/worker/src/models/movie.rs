use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A movie from the catalog. Read once per batch and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i64,
    pub title: String,
    pub synopsis: String,
}
