/// Content guard — an optional post-hoc check on the refined story.
///
/// The judge call is only an instruction to the backend. When configured,
/// the guard scans the rewrite for banned words and checks its length, and
/// the pipeline stops before the title call if anything is flagged.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::story::RefinedStory;

const DEFAULT_BANNED: &[&str] = &[
    "blood", "bloody", "kill", "killed", "murder", "gun", "knife", "damn", "hell", "stupid",
    "hate", "dead", "die", "corpse", "weapon",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Whole words (case-insensitive) that must not appear.
    pub banned_words: Vec<String>,
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            banned_words: DEFAULT_BANNED.iter().map(|w| w.to_string()).collect(),
            min_words: 50,
            max_words: 1500,
        }
    }
}

/// One reason a story failed the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardIssue {
    BannedWord(String),
    TooShort { words: usize, min: usize },
    TooLong { words: usize, max: usize },
}

impl fmt::Display for GuardIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BannedWord(word) => write!(f, "contains banned word \"{}\"", word),
            Self::TooShort { words, min } => write!(f, "{} words, expected at least {}", words, min),
            Self::TooLong { words, max } => write!(f, "{} words, expected at most {}", words, max),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentGuard {
    banned: FxHashSet<String>,
    min_words: usize,
    max_words: usize,
}

impl Default for ContentGuard {
    fn default() -> Self {
        Self::from_config(&GuardConfig::default())
    }
}

impl ContentGuard {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            banned: config
                .banned_words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            min_words: config.min_words,
            max_words: config.max_words,
        }
    }

    /// Check a story. An empty list means it passed. Banned words are
    /// reported once each, in order of first appearance.
    pub fn check(&self, story: &RefinedStory) -> Vec<GuardIssue> {
        let mut issues = Vec::new();
        let mut reported = FxHashSet::default();
        let mut words = 0usize;

        for token in story.as_str().split_whitespace() {
            words += 1;
            for word in token
                .split(|c: char| !c.is_alphanumeric() && c != '\'')
                .filter(|w| !w.is_empty())
            {
                let word = word.trim_matches('\'').to_lowercase();
                if self.banned.contains(&word) && reported.insert(word.clone()) {
                    issues.push(GuardIssue::BannedWord(word));
                }
            }
        }

        if words < self.min_words {
            issues.push(GuardIssue::TooShort {
                words,
                min: self.min_words,
            });
        }
        if words > self.max_words {
            issues.push(GuardIssue::TooLong {
                words,
                max: self.max_words,
            });
        }
        issues
    }
}
