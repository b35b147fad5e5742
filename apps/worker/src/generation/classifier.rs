/// Exact model reply meaning "no strong fit".
pub const REJECTION_SENTINEL: &str = "N/A";

/// Length the prompt asks for. Advisory only; never enforced on accepted text.
pub const MAX_RECOMMENDATION_WORDS: usize = 25;

/// Classified model reply for one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Accepted(String),
    Rejected,
}

/// Trims the reply; an exact, case-sensitive `"N/A"` is a rejection, anything else is accepted.
pub fn classify(raw_text: &str) -> GenerationOutcome {
    let trimmed = raw_text.trim();
    if trimmed == REJECTION_SENTINEL {
        GenerationOutcome::Rejected
    } else {
        GenerationOutcome::Accepted(trimmed.to_string())
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
