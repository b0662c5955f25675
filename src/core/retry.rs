/// Retry decorator — bounded exponential backoff around any backend.
///
/// Stages never retry on their own; wrapping the backend keeps them
/// testable against a deterministic stub.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

use crate::core::backend::{BackendError, GenerationBackend, GenerationParams};
use crate::core::config::RetryPolicy;

#[derive(Debug, Clone)]
pub struct RetryingBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B> RetryingBackend<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.policy.initial_delay_ms))
            .with_max_interval(Duration::from_millis(self.policy.max_delay_ms))
            .with_multiplier(self.policy.multiplier)
            .with_randomization_factor(self.policy.randomization_factor)
            .with_max_elapsed_time(None)
            .build()
    }
}

#[async_trait]
impl<B: GenerationBackend> GenerationBackend for RetryingBackend<B> {
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, BackendError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.inner.generate(prompt, params).await {
                Ok(text) => return Ok(text),
                Err(err) if !err.is_retryable() || attempt >= max_attempts => {
                    if attempt > 1 {
                        log::error!("backend call failed after {} attempts: {}", attempt, err);
                    }
                    return Err(err);
                }
                Err(err) => {
                    let Some(delay) = backoff.next_backoff() else {
                        return Err(err);
                    };
                    log::warn!(
                        "retryable backend error on attempt {}/{}: {}. Retrying in {:?}",
                        attempt,
                        max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
