//! Bedtime Story Engine — staged generation of gentle stories for ages 5–10.
//!
//! A request is classified into a story category, turned into a storyteller
//! prompt, drafted by a generative-text backend, rewritten by a judge pass
//! against a fixed rubric, and finally given a short title.

pub mod core;
pub mod schema;

pub use crate::core::backend::{BackendError, ChatBackend, GenerationBackend, GenerationParams};
pub use crate::core::config::{BackendConfig, ConfigError, EngineConfig, RetryPolicy};
pub use crate::core::pipeline::{ChatPipeline, PipelineError, StoryPipeline};
pub use crate::schema::category::Category;
pub use crate::schema::request::{StoryRequest, ValidationError};
pub use crate::schema::story::StoryResult;
