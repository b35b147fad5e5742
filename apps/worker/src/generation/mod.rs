// Recommendation generation: prompt building, the model call, and reply classification.
// All model calls go through llm_client — no direct HTTP here.

pub mod classifier;
pub mod prompts;

use crate::llm_client::{LlmError, TextGenerator};

pub use classifier::{classify, GenerationOutcome};
pub use prompts::build_prompt;

/// Sends one prompt and classifies the reply.
///
/// Any client failure comes back as `Err` for the caller to record against the
/// single work item; nothing here retries beyond what the client itself does.
pub async fn generate(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<GenerationOutcome, LlmError> {
    let raw = generator.generate_text(prompt).await?;
    Ok(classify(&raw))
}
