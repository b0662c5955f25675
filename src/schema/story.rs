use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;

macro_rules! text_artifact {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(text: impl Into<String>) -> Self {
                Self(text.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

text_artifact!(
    /// The instruction sent to the backend for the first-pass story.
    Prompt
);
text_artifact!(
    /// First-pass story text, before the judge has seen it.
    Draft
);
text_artifact!(
    /// Judge-rewritten story. Replaces the draft entirely.
    RefinedStory
);

/// A short story title. Surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub fn new(text: &str) -> Self {
        Self(text.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The finished story handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryResult {
    pub category: Category,
    pub story: RefinedStory,
    pub title: Title,
}

impl StoryResult {
    pub fn word_count(&self) -> usize {
        self.story.as_str().split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_trims_surrounding_whitespace() {
        let title = Title::new("\n  The Sleepy Moon  \n");
        assert_eq!(title.as_str(), "The Sleepy Moon");
    }

    #[test]
    fn title_keeps_inner_text() {
        let title = Title::new("\"Stars,  Softly\"");
        assert_eq!(title.as_str(), "\"Stars,  Softly\"");
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        let result = StoryResult {
            category: Category::GeneralBedtime,
            story: RefinedStory::new("Once upon\na  time,\tthe end."),
            title: Title::new("Words"),
        };
        assert_eq!(result.word_count(), 6);
    }

    #[test]
    fn result_serializes_flat_strings() {
        let result = StoryResult {
            category: Category::FriendshipStory,
            story: RefinedStory::new("Two friends slept."),
            title: Title::new("Friends"),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "friendship-story");
        assert_eq!(json["story"], "Two friends slept.");
        assert_eq!(json["title"], "Friends");
    }
}
