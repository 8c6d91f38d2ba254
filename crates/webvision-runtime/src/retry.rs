//! Provider retry and error handling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use webvision_protocols::error::ProviderError;
use webvision_protocols::provider::{
    CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition,
};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay between retries.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Exponential backoff multiplier.
    pub backoff_multiplier: f64,
    /// Add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Calculate delay for a given attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay =
            self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay = delay.min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.jitter {
            (delay + rand_jitter(delay * 0.1)).max(0.0) as u64
        } else {
            delay as u64
        };

        Duration::from_millis(delay_ms)
    }
}

/// Jitter in `[-max, max]` seeded from the clock.
fn rand_jitter(max: f64) -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos as f64 / 1_000_000_000.0) * max * 2.0 - max
}

/// Check if an error is retryable.
pub fn is_retryable(error: &ProviderError) -> bool {
    error.is_transient()
}

/// Provider wrapper that retries transient failures.
pub struct RetryProvider {
    inner: Arc<dyn LLMProvider>,
    config: RetryConfig,
}

impl RetryProvider {
    pub fn new(provider: Arc<dyn LLMProvider>, config: RetryConfig) -> Self {
        Self {
            inner: provider,
            config,
        }
    }

    pub fn inner(&self) -> &Arc<dyn LLMProvider> {
        &self.inner
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            let e = match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };
            if !is_retryable(&e) || attempt >= self.config.max_retries {
                return Err(e);
            }

            let delay = match &e {
                ProviderError::RateLimited { retry_after_seconds } => {
                    Duration::from_secs(*retry_after_seconds).min(self.config.max_delay)
                }
                _ => self.config.delay_for_attempt(attempt),
            };

            warn!(
                "Provider error (attempt {}/{}): {}, retrying in {:?}",
                attempt + 1,
                self.config.max_retries + 1,
                e,
                delay
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl LLMProvider for RetryProvider {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn models(&self) -> &[ModelDefinition] {
        self.inner.models()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        debug!("Completing with retry: model={}", request.model);
        self.with_retry(|| {
            let req = request.clone();
            let provider = self.inner.clone();
            async move { provider.complete(req).await }
        })
        .await
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
