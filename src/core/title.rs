/// Title synthesizer — a short, playful title from the finished story.

use crate::core::backend::{BackendError, GenerationBackend, GenerationParams};
use crate::schema::category::Category;
use crate::schema::story::{RefinedStory, Title};

/// Maximum number of story characters shown to the title call.
pub const EXCERPT_CHARS: usize = 500;

const EXAMPLE_TITLES: &[&str] = &[
    "The Brave Little Mouse",
    "Adventures in Starland",
    "The Magic Forest Friends",
];

/// The first `EXCERPT_CHARS` characters of `story`, cut on a char boundary.
pub fn excerpt(story: &str) -> &str {
    match story.char_indices().nth(EXCERPT_CHARS) {
        Some((end, _)) => &story[..end],
        None => story,
    }
}

pub fn title_prompt(story: &RefinedStory, category: Category) -> String {
    let examples = EXAMPLE_TITLES
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are a creative title generator for children's bedtime stories.\n\
         Based on the story content and category, create a short, engaging title that would appeal to kids ages 5-10.\n\
         \n\
         Category: {}\n\
         Story excerpt: {}...\n\
         \n\
         Generate ONLY a creative, fun title (3-7 words max). Make it magical and appealing for bedtime.\n\
         Examples: {}\n",
        category.label(),
        excerpt(story.as_str()),
        examples
    )
}

/// Ask the backend for a title. The answer is taken as-is apart from
/// trimming; word count is requested, not enforced.
pub async fn title_for<B>(
    backend: &B,
    story: &RefinedStory,
    category: Category,
) -> Result<Title, BackendError>
where
    B: GenerationBackend + ?Sized,
{
    let prompt = title_prompt(story, category);
    let text = backend.generate(&prompt, GenerationParams::TITLE).await?;
    Ok(Title::new(&text))
}
