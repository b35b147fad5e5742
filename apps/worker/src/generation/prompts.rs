// Prompt text for the recommendation call.
// The classifier depends on the model honoring the "N/A" instruction below.

use crate::generation::classifier::{MAX_RECOMMENDATION_WORDS, REJECTION_SENTINEL};
use crate::models::movie::Subject;
use crate::taxonomy::MoodReason;

/// Builds the single-turn prompt for one (movie, mood, reason) work item.
/// Pure: same inputs always give the same text.
pub fn build_prompt(subject: &Subject, pair: &MoodReason) -> String {
    format!(
        r#"You are an expert film critic writing for a culture magazine. Your task is to write a compelling one-sentence recommendation for a film, tailored to a viewer's specific emotional state.

CONTEXT:
- The film is: {title}
- Its synopsis is: {synopsis}
- The viewer's mood is: {mood}
- The specific reason for their mood is: {reason}

INSTRUCTIONS:
1. Write a single, compelling sentence ({max_words} words or less) that explains why this film would resonate with the viewer. The recommendation should subtly speak to their emotional state without explicitly naming the emotion or the reason.
2. Output only this single sentence, with no extra commentary.
3. If the film is not a good fit for this emotional state, or the connection is weak, return the exact phrase "{sentinel}" instead of a sentence."#,
        title = subject.title,
        synopsis = subject.synopsis,
        mood = pair.mood,
        reason = pair.reason,
        max_words = MAX_RECOMMENDATION_WORDS,
        sentinel = REJECTION_SENTINEL,
    )
}
