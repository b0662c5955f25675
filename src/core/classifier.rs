/// Request classifier — keyword heuristics mapping free text to a category.

use crate::schema::category::Category;

/// Keyword sets in priority order. The first set with any keyword present
/// in the lower-cased request wins, so "magic dragon in space" is an
/// animal adventure.
const KEYWORD_SETS: &[(Category, &[&str])] = &[
    (
        Category::AnimalAdventure,
        &["animal", "dog", "cat", "dragon", "unicorn"],
    ),
    (Category::SpaceExploration, &["space", "star", "moon", "planet"]),
    (Category::FantasyTale, &["magic", "fairy", "wizard", "castle"]),
    (
        Category::FriendshipStory,
        &["friend", "family", "school", "playground"],
    ),
];

/// Classify a request. Matching is plain substring search, so "scatter"
/// counts as "cat". Never fails; unmatched input is a general bedtime story.
pub fn classify(request_text: &str) -> Category {
    let lowered = request_text.to_lowercase();
    KEYWORD_SETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::GeneralBedtime)
}
