use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of narrative themes a story can be told in.
///
/// The category decides the wording of the storyteller instruction and the
/// title instruction. Anything the classifier cannot place lands in
/// `GeneralBedtime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    AnimalAdventure,
    SpaceExploration,
    FantasyTale,
    FriendshipStory,
    GeneralBedtime,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown story category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 5] = [
        Self::AnimalAdventure,
        Self::SpaceExploration,
        Self::FantasyTale,
        Self::FriendshipStory,
        Self::GeneralBedtime,
    ];

    /// Returns the tag string for this category (e.g., "animal-adventure").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AnimalAdventure => "animal-adventure",
            Self::SpaceExploration => "space-exploration",
            Self::FantasyTale => "fantasy-tale",
            Self::FriendshipStory => "friendship-story",
            Self::GeneralBedtime => "general-bedtime",
        }
    }

    /// The lower-case phrase embedded in backend instructions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AnimalAdventure => "animal adventure",
            Self::SpaceExploration => "space exploration",
            Self::FantasyTale => "fantasy tale",
            Self::FriendshipStory => "friendship story",
            Self::GeneralBedtime => "general bedtime",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AnimalAdventure => "Animal Adventure",
            Self::SpaceExploration => "Space Exploration",
            Self::FantasyTale => "Fantasy Tale",
            Self::FriendshipStory => "Friendship Story",
            Self::GeneralBedtime => "General Bedtime",
        }
    }

    /// Request text offered when a reader picks a category but writes nothing.
    pub fn default_request(&self) -> &'static str {
        match self {
            Self::AnimalAdventure => "Tell me a story about animals going on an adventure",
            Self::SpaceExploration => "Tell me a story about exploring space",
            Self::FantasyTale => "Tell me a story with magic and fantasy",
            Self::FriendshipStory => "Tell me a story about friendship",
            Self::GeneralBedtime => "Tell me a gentle bedtime story",
        }
    }

    /// Look up a category by its 1-based menu position.
    pub fn from_menu(choice: &str) -> Option<Category> {
        let index: usize = choice.trim().parse().ok()?;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the tag, the label, the display name (any case), or a menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if let Some(category) = Self::from_menu(&needle) {
            return Ok(category);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| {
                c.tag() == needle
                    || c.label() == needle
                    || c.display_name().to_lowercase() == needle
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
