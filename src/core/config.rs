/// Engine configuration — backend endpoint, credential, retry policy, guard.
///
/// Loaded from a RON file and then overlaid from the environment. The
/// resulting value is passed explicitly to the backend at construction time;
/// nothing in the library reads process state on its own.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::guard::GuardConfig;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

/// Connection settings for the chat-completions backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub api_url: String,
    pub model: String,
    /// Bearer credential. Absent is allowed here; the first call fails instead.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Bounded exponential backoff for retryable backend failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. 1 disables retrying.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Each wait is spread by up to this fraction either way (0.0..1.0).
    pub randomization_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            randomization_factor: 0.5,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: BackendConfig,
    pub retry: RetryPolicy,
    /// Post-refinement content guard. Off when absent.
    pub guard: Option<GuardConfig>,
}

impl EngineConfig {
    pub fn parse_ron(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(contents)?)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Load `path` if it exists, otherwise start from defaults. A file that
    /// exists but fails to read or parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_ron(path)
        } else {
            log::info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Overlay values from an environment lookup. Only keys that are present
    /// and non-empty replace the loaded values.
    ///
    /// Keys: `OPENAI_API_KEY`, `STORY_API_URL`, `STORY_MODEL`,
    /// `STORY_TIMEOUT_SECS`, `STORY_MAX_ATTEMPTS`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.backend.api_key = Some(key);
        }
        if let Some(url) = get("STORY_API_URL") {
            self.backend.api_url = url;
        }
        if let Some(model) = get("STORY_MODEL") {
            self.backend.model = model;
        }
        if let Some(value) = get("STORY_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse_env("STORY_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("STORY_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_env("STORY_MAX_ATTEMPTS", &value)?;
        }
        Ok(())
    }

    /// Overlay from the real process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}
