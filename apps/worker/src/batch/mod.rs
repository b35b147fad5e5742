// Batch run: drives every movie × mood × reason through generation and persistence.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::{BatchConfig, BatchOrchestrator, BatchState};
