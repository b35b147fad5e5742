use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a single work item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Classified as a recommendation and persisted.
    Accepted,
    /// Model replied with the sentinel. A successful classification, not a failure.
    Rejected,
    GenerationFailed,
    /// Accepted by the classifier but the write failed.
    StoreFailed,
}

/// End-of-run counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub subjects: usize,
    pub work_items: usize,
    pub attempted: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub generation_failed: usize,
    pub store_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(subjects: usize, pairs: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            subjects,
            work_items: subjects * pairs,
            attempted: 0,
            accepted: 0,
            rejected: 0,
            generation_failed: 0,
            store_failed: 0,
            started_at,
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: ItemOutcome) {
        self.attempted += 1;
        match outcome {
            ItemOutcome::Accepted => self.accepted += 1,
            ItemOutcome::Rejected => self.rejected += 1,
            ItemOutcome::GenerationFailed => self.generation_failed += 1,
            ItemOutcome::StoreFailed => self.store_failed += 1,
        }
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }

    pub fn failed(&self) -> usize {
        self.generation_failed + self.store_failed
    }

    pub fn elapsed_secs(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_summary_sizes_work_queue() {
        let summary = RunSummary::new(20, 72, Utc::now());
        assert_eq!(summary.work_items, 1440);
        assert_eq!(summary.attempted, 0);
        assert!(summary.finished_at.is_none());
    }

    #[test]
    fn test_record_counts_each_outcome() {
        let mut summary = RunSummary::new(1, 5, Utc::now());
        for outcome in [
            ItemOutcome::Accepted,
            ItemOutcome::Accepted,
            ItemOutcome::Rejected,
            ItemOutcome::GenerationFailed,
            ItemOutcome::StoreFailed,
        ] {
            summary.record(outcome);
        }

        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.generation_failed, 1);
        assert_eq!(summary.store_failed, 1);
        assert_eq!(summary.failed(), 2);
    }

    #[test]
    fn test_elapsed_after_finish() {
        let start = Utc::now();
        let mut summary = RunSummary::new(0, 72, start);
        assert_eq!(summary.elapsed_secs(), None);
        summary.finish(start + Duration::seconds(90));
        assert_eq!(summary.elapsed_secs(), Some(90));
    }
}
