use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::Category;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("story request is empty")]
    EmptyRequest,
}

/// What the reader asked for, optionally with a category already chosen.
///
/// Construction rejects text that is empty after trimming; the text itself
/// is kept exactly as typed so it can be embedded verbatim in prompts.
/// Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStoryRequest")]
pub struct StoryRequest {
    text: String,
    category: Option<Category>,
}

#[derive(Deserialize)]
struct RawStoryRequest {
    text: String,
    #[serde(default)]
    category: Option<Category>,
}

impl TryFrom<RawStoryRequest> for StoryRequest {
    type Error = ValidationError;

    fn try_from(raw: RawStoryRequest) -> Result<Self, Self::Error> {
        let request = Self::new(raw.text)?;
        Ok(match raw.category {
            Some(category) => request.with_category(category),
            None => request,
        })
    }
}

impl StoryRequest {
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyRequest);
        }
        Ok(Self {
            text,
            category: None,
        })
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Build a request from a category menu choice, falling back to the
    /// category's default text when the reader left the prompt blank.
    pub fn for_category(category: Category, custom: &str) -> Self {
        let text = if custom.trim().is_empty() {
            category.default_request().to_string()
        } else {
            custom.to_string()
        };
        Self {
            text,
            category: Some(category),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_text() {
        assert_eq!(StoryRequest::new(""), Err(ValidationError::EmptyRequest));
        assert_eq!(
            StoryRequest::new("  \n\t "),
            Err(ValidationError::EmptyRequest)
        );
    }

    #[test]
    fn keeps_text_verbatim() {
        let request = StoryRequest::new("  a sleepy owl  ").unwrap();
        assert_eq!(request.text(), "  a sleepy owl  ");
        assert_eq!(request.category(), None);
    }

    #[test]
    fn for_category_uses_default_when_blank() {
        let request = StoryRequest::for_category(Category::SpaceExploration, "   ");
        assert_eq!(request.text(), "Tell me a story about exploring space");
        assert_eq!(request.category(), Some(Category::SpaceExploration));

        let custom = StoryRequest::for_category(Category::FantasyTale, "a shy wizard");
        assert_eq!(custom.text(), "a shy wizard");
    }

    #[test]
    fn deserialize_rejects_blank_text() {
        for json in [
            r#"{"text":"   "}"#,
            r#"{"text":"","category":null}"#,
            r#"{"text":"\n\t","category":"fantasy-tale"}"#,
        ] {
            let err = serde_json::from_str::<StoryRequest>(json).unwrap_err();
            assert!(
                err.to_string().contains("story request is empty"),
                "json: {}, error: {}",
                json,
                err
            );
        }
    }

    #[test]
    fn deserialize_keeps_text_and_category() {
        let request: StoryRequest =
            serde_json::from_str(r#"{"text":" a sleepy owl ","category":"space-exploration"}"#)
                .unwrap();
        assert_eq!(request.text(), " a sleepy owl ");
        assert_eq!(request.category(), Some(Category::SpaceExploration));

        let request: StoryRequest = serde_json::from_str(r#"{"text":"a fox"}"#).unwrap();
        assert_eq!(request.category(), None);
    }
}
