/// The story pipeline: Request → StoryResult orchestration.
///
/// Wires together classification, prompt composition, the draft call,
/// the judge rewrite, the optional content guard, and the title call.

use thiserror::Error;

use crate::core::backend::{BackendError, ChatBackend, GenerationBackend, GenerationParams};
use crate::core::classifier::classify;
use crate::core::config::EngineConfig;
use crate::core::guard::{ContentGuard, GuardIssue};
use crate::core::prompt::compose_prompt;
use crate::core::refine::refine;
use crate::core::retry::RetryingBackend;
use crate::core::title::title_for;
use crate::schema::category::Category;
use crate::schema::request::{StoryRequest, ValidationError};
use crate::schema::story::{Draft, StoryResult};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("story rejected by content guard: {}", format_issues(.0))]
    Rejected(Vec<GuardIssue>),
}

fn format_issues(issues: &[GuardIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The top-level story pipeline. Built via `StoryPipeline::builder()`.
///
/// Holds no per-request state, so one pipeline can serve concurrent
/// requests when the backend is shareable.
pub struct StoryPipeline<B> {
    backend: B,
    guard: Option<ContentGuard>,
}

/// Builder for constructing a `StoryPipeline`.
pub struct StoryPipelineBuilder<B> {
    backend: B,
    guard: Option<ContentGuard>,
}

/// The production pipeline: HTTP backend behind the retry decorator.
pub type ChatPipeline = StoryPipeline<RetryingBackend<ChatBackend>>;

impl<B: GenerationBackend> StoryPipeline<B> {
    pub fn builder(backend: B) -> StoryPipelineBuilder<B> {
        StoryPipelineBuilder {
            backend,
            guard: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generate a story for raw request text.
    ///
    /// Blank text fails before any backend call. A preselected category
    /// skips classification.
    pub async fn run(
        &self,
        request_text: &str,
        preselected: Option<Category>,
    ) -> Result<StoryResult, PipelineError> {
        let mut request = StoryRequest::new(request_text)?;
        if let Some(category) = preselected {
            request = request.with_category(category);
        }
        self.run_request(&request).await
    }

    /// Generate a story for an already validated request.
    ///
    /// Three backend calls in sequence: draft, judge rewrite, title. Any
    /// failure aborts the whole request.
    pub async fn run_request(&self, request: &StoryRequest) -> Result<StoryResult, PipelineError> {
        let text = request.text();

        // 1. Resolve category
        let category = request.category().unwrap_or_else(|| classify(text));
        log::debug!("story category: {}", category.tag());

        // 2. Compose storyteller prompt
        let prompt = compose_prompt(text, category);

        // 3. Draft
        let draft = Draft::new(
            self.backend
                .generate(prompt.as_str(), GenerationParams::DRAFT)
                .await?,
        );
        log::debug!("draft received ({} chars)", draft.as_str().len());

        // 4. Judge rewrite
        let story = refine(&self.backend, &draft, text).await?;
        log::debug!("refined story received ({} chars)", story.as_str().len());

        // 5. Optional guard
        if let Some(ref guard) = self.guard {
            let issues = guard.check(&story);
            if !issues.is_empty() {
                log::debug!("content guard flagged {} issue(s)", issues.len());
                return Err(PipelineError::Rejected(issues));
            }
        }

        // 6. Title
        let title = title_for(&self.backend, &story, category).await?;

        Ok(StoryResult {
            category,
            story,
            title,
        })
    }
}

impl ChatPipeline {
    /// Build the HTTP-backed pipeline from an explicit config.
    pub fn from_config(config: &EngineConfig) -> Result<Self, BackendError> {
        let backend = ChatBackend::new(config.backend.clone())?;
        let mut builder =
            StoryPipeline::builder(RetryingBackend::new(backend, config.retry.clone()));
        if let Some(ref guard) = config.guard {
            builder = builder.guard(ContentGuard::from_config(guard));
        }
        Ok(builder.build())
    }
}

impl<B: GenerationBackend> StoryPipelineBuilder<B> {
    /// Check every refined story before titling it.
    pub fn guard(mut self, guard: ContentGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn build(self) -> StoryPipeline<B> {
        StoryPipeline {
            backend: self.backend,
            guard: self.guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RetryPolicy;
    use crate::core::guard::GuardConfig;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with canned answers in order and records each call.
    struct Canned {
        replies: Mutex<Vec<Result<String, BackendError>>>,
        calls: Mutex<Vec<(String, GenerationParams)>>,
    }

    impl Canned {
        fn new(replies: Vec<Result<String, BackendError>>) -> Self {
            let mut replies = replies;
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn calls(&self) -> Vec<(String, GenerationParams)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for Canned {
        async fn generate(
            &self,
            prompt: &str,
            params: GenerationParams,
        ) -> Result<String, BackendError> {
            self.calls.lock().unwrap().push((prompt.to_string(), params));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(BackendError::MalformedResponse("script exhausted".into())))
        }
    }

    #[tokio::test]
    async fn preselected_category_skips_classifier() {
        let pipeline = StoryPipeline::builder(Canned::ok(&["draft", "story", "title"])).build();
        let result = pipeline
            .run("a dragon on the moon", Some(Category::FriendshipStory))
            .await
            .unwrap();
        assert_eq!(result.category, Category::FriendshipStory);

        let calls = pipeline.backend().calls();
        assert!(calls[0].0.contains("Category: friendship story."));
        assert!(calls[2].0.contains("Category: friendship story"));
    }

    #[tokio::test]
    async fn draft_feeds_judge_and_story_feeds_title() {
        let pipeline = StoryPipeline::builder(Canned::ok(&[
            "DRAFT-TEXT",
            "REFINED-TEXT",
            "  Moonlit Dreams \n",
        ]))
        .build();
        let result = pipeline.run("a sleepy star", None).await.unwrap();

        assert_eq!(result.category, Category::SpaceExploration);
        assert_eq!(result.story.as_str(), "REFINED-TEXT");
        assert_eq!(result.title.as_str(), "Moonlit Dreams");

        let calls = pipeline.backend().calls();
        assert!(calls[1].0.contains("DRAFT-TEXT"));
        assert!(calls[1].0.contains("User request: a sleepy star"));
        assert!(calls[2].0.contains("REFINED-TEXT"));
        assert!(!calls[2].0.contains("DRAFT-TEXT"));
    }

    #[tokio::test]
    async fn guard_rejection_skips_title_call() {
        let pipeline = StoryPipeline::builder(Canned::ok(&["draft", "He grabbed a knife.", "t"]))
            .guard(ContentGuard::from_config(&GuardConfig {
                banned_words: vec!["knife".to_string()],
                min_words: 1,
                max_words: 100,
            }))
            .build();
        let err = pipeline.run("a pirate", None).await.unwrap_err();
        match err {
            PipelineError::Rejected(issues) => {
                assert_eq!(issues, vec![GuardIssue::BannedWord("knife".to_string())]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(pipeline.backend().calls().len(), 2);
    }

    #[tokio::test]
    async fn guard_passes_clean_story() {
        let pipeline = StoryPipeline::builder(Canned::ok(&["draft", "A calm clean tale.", "t"]))
            .guard(ContentGuard::from_config(&GuardConfig {
                banned_words: vec!["knife".to_string()],
                min_words: 1,
                max_words: 100,
            }))
            .build();
        assert!(pipeline.run("a pirate", None).await.is_ok());
        assert_eq!(pipeline.backend().calls().len(), 3);
    }

    #[test]
    fn rejected_error_lists_issues() {
        let err = PipelineError::Rejected(vec![
            GuardIssue::BannedWord("hate".into()),
            GuardIssue::TooShort { words: 2, min: 50 },
        ]);
        assert_eq!(
            err.to_string(),
            "story rejected by content guard: contains banned word \"hate\"; 2 words, expected at least 50"
        );
    }

    #[tokio::test]
    async fn chat_pipeline_without_key_fails_on_first_call() {
        let config = EngineConfig {
            retry: RetryPolicy::none(),
            ..EngineConfig::default()
        };
        let pipeline = ChatPipeline::from_config(&config).unwrap();
        let err = pipeline.run("a sleepy owl", None).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Backend(BackendError::MissingCredential)
        ));
    }
}
