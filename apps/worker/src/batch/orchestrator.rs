//! Batch Orchestrator — runs the full cross product of movies × moods × reasons.
//!
//! Flow per work item: build_prompt → generate → classify →
//!       (accepted only) persist → record outcome.
//!
//! Items are processed sequentially. A failure in one item is logged and
//! counted; it never stops the loop. Only a catalog failure before the loop
//! aborts the run.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::batch::summary::{ItemOutcome, RunSummary};
use crate::catalog::CatalogReader;
use crate::errors::BatchError;
use crate::generation::classifier::{word_count, MAX_RECOMMENDATION_WORDS};
use crate::generation::{build_prompt, generate, GenerationOutcome};
use crate::llm_client::TextGenerator;
use crate::models::movie::Subject;
use crate::models::recommendation::PersistedRecommendation;
use crate::store::ResultStore;
use crate::taxonomy::{MoodReason, Taxonomy};

/// Options fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Caps the number of movies fetched. `None` processes the whole catalog.
    pub bounded_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Done,
    Aborted,
}

pub struct BatchOrchestrator {
    catalog: Arc<dyn CatalogReader>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn ResultStore>,
    taxonomy: Taxonomy,
    config: BatchConfig,
    state: BatchState,
}

impl BatchOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn ResultStore>,
        taxonomy: Taxonomy,
        config: BatchConfig,
    ) -> Self {
        Self {
            catalog,
            generator,
            store,
            taxonomy,
            config,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Runs the batch once.
    ///
    /// Returns `Err` only when the catalog cannot be read (state becomes
    /// `Aborted`) or the orchestrator was already run. Otherwise reaches `Done`
    /// however many items were rejected or failed.
    pub async fn run(&mut self) -> Result<RunSummary, BatchError> {
        if self.state != BatchState::Idle {
            return Err(BatchError::AlreadyStarted(self.state));
        }

        let started_at = Utc::now();
        let limit = self.config.bounded_limit;

        info!("Fetching movies from catalog...");
        if let Some(limit) = limit {
            info!("Bounded mode enabled: limiting to {limit} movies");
        }

        let subjects = match self.catalog.fetch_subjects(limit).await {
            Ok(subjects) => subjects,
            Err(e) => {
                self.state = BatchState::Aborted;
                error!("Catalog unavailable, aborting batch: {e}");
                return Err(e.into());
            }
        };

        self.state = BatchState::Running;

        let pairs = self.taxonomy.pairs();
        let mut summary = RunSummary::new(subjects.len(), pairs.len(), started_at);

        if subjects.is_empty() {
            info!("No movies found. Nothing to generate.");
        } else {
            info!(
                "Found {} movies × {} mood/reason pairs = {} work items. Starting generation...",
                subjects.len(),
                pairs.len(),
                summary.work_items
            );
        }

        for subject in &subjects {
            for pair in &pairs {
                let outcome = self.process_item(subject, pair).await;
                summary.record(outcome);
            }
        }

        summary.finish(Utc::now());
        self.state = BatchState::Done;

        info!(
            "Workflow complete: {} attempted, {} accepted, {} rejected, {} generation failures, {} store failures ({}s)",
            summary.attempted,
            summary.accepted,
            summary.rejected,
            summary.generation_failed,
            summary.store_failed,
            summary.elapsed_secs().unwrap_or_default()
        );

        Ok(summary)
    }

    /// Processes one work item. Every error is handled here.
    async fn process_item(&self, subject: &Subject, pair: &MoodReason) -> ItemOutcome {
        let prompt = build_prompt(subject, pair);

        let text = match generate(self.generator.as_ref(), &prompt).await {
            Ok(GenerationOutcome::Accepted(text)) => text,
            Ok(GenerationOutcome::Rejected) => {
                info!(
                    "Skipping '{}' ({}/{}): not a strong match",
                    subject.title, pair.mood, pair.reason
                );
                return ItemOutcome::Rejected;
            }
            Err(e) => {
                warn!(
                    "Generation failed for '{}' (movie {}, {}/{}): {e}",
                    subject.title, subject.id, pair.mood, pair.reason
                );
                return ItemOutcome::GenerationFailed;
            }
        };

        let words = word_count(&text);
        if words > MAX_RECOMMENDATION_WORDS {
            warn!(
                "Recommendation for '{}' ({}/{}) has {words} words (max {MAX_RECOMMENDATION_WORDS}); storing as-is",
                subject.title, pair.mood, pair.reason
            );
        }

        info!(
            "Generated for '{}' ({}/{}): {}",
            subject.title, pair.mood, pair.reason, text
        );

        let recommendation = PersistedRecommendation::new(subject.id, pair, text);
        match self.store.save(&recommendation).await {
            Ok(()) => ItemOutcome::Accepted,
            Err(e) => {
                error!(
                    "Failed to save recommendation for '{}' (movie {}, {}/{}): {e}",
                    subject.title, subject.id, pair.mood, pair.reason
                );
                ItemOutcome::StoreFailed
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
