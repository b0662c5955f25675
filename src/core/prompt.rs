/// Prompt composer — the storyteller instruction for the draft call.

use crate::schema::category::Category;
use crate::schema::story::Prompt;

const STYLE_LINE: &str = "Make the story very imaginative, fun, and soothing for bedtime.";
const STRUCTURE_LINE: &str =
    "Use a beginning, middle, and end. Include gentle dialogue if helpful.";
const ENDING_LINE: &str = "End with a calming note, like falling asleep peacefully.";
const START_LINE: &str = "Now tell the story:";

/// Build the storyteller prompt.
///
/// Line order is fixed: role and category, tone, structure, ending, the
/// request exactly as given, then the directive to begin.
pub fn compose_prompt(request_text: &str, category: Category) -> Prompt {
    let mut prompt = format!(
        "You are a bedtime storyteller for kids ages 5–10. Category: {}.",
        category.label()
    );
    for line in [STYLE_LINE, STRUCTURE_LINE, ENDING_LINE] {
        prompt.push('\n');
        prompt.push_str(line);
    }
    prompt.push_str("\nUser request: ");
    prompt.push_str(request_text);
    prompt.push('\n');
    prompt.push_str(START_LINE);
    Prompt::new(prompt)
}
