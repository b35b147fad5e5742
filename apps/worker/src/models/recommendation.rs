use serde::{Deserialize, Serialize};

use crate::taxonomy::MoodReason;

/// One accepted recommendation, appended to the `recommendations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecommendation {
    pub movie_id: i64,
    pub emotion: String,
    pub reason: String,
    pub recommendation_text: String,
}

impl PersistedRecommendation {
    pub fn new(movie_id: i64, pair: &MoodReason, recommendation_text: String) -> Self {
        Self {
            movie_id,
            emotion: pair.mood.clone(),
            reason: pair.reason.clone(),
            recommendation_text,
        }
    }
}
