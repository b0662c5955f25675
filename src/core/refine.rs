/// Critique-refine stage — a judge pass that rewrites the draft against a fixed rubric.

use crate::core::backend::{BackendError, GenerationBackend, GenerationParams};
use crate::schema::story::{Draft, RefinedStory};

/// Rules the judge is asked to enforce. Advisory: nothing checks the
/// rewrite against them afterwards unless a `ContentGuard` is configured.
pub const RUBRIC: &[&str] = &[
    "Safe, gentle, imaginative, fun",
    "No bad words or inappropriate themes",
    "Structured with a clear arc (beginning, middle, end)",
    "Written with a warm, kind tone",
    "Appropriate for bedtime (soothing ending)",
];

/// Build the judge instruction for a draft.
pub fn judge_prompt(draft: &Draft, original_request: &str) -> String {
    let mut prompt = String::from(
        "You are a bedtime story quality judge for children ages 5–10.\nThe story must be:\n",
    );
    for rule in RUBRIC {
        prompt.push_str("- ");
        prompt.push_str(rule);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nUser request: {}\nGenerated story draft:\n---\n{}\n---\n\n",
        original_request,
        draft.as_str()
    ));
    prompt.push_str(
        "Please improve and rewrite the story if needed so it fully matches these rules.\n\
         Return ONLY the improved bedtime story text.\n",
    );
    prompt
}

/// Ask the backend to rewrite `draft`. The answer replaces the draft
/// wholesale; backend failures come back unchanged.
pub async fn refine<B>(
    backend: &B,
    draft: &Draft,
    original_request: &str,
) -> Result<RefinedStory, BackendError>
where
    B: GenerationBackend + ?Sized,
{
    let prompt = judge_prompt(draft, original_request);
    let text = backend.generate(&prompt, GenerationParams::REFINE).await?;
    Ok(RefinedStory::new(text))
}
