//! Completion client: provider selection, per-call settings, and retry.

use std::sync::Arc;

use super::offline::OfflineProvider;
use super::retry::{RetryPolicy, Transient};
use super::rig::RigProvider;
use super::{CompletionProvider, CompletionRequest, ModelSettings, ProviderError};
use crate::config::Config;

/// Issues completion calls with the configured defaults and retry policy.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    defaults: ModelSettings,
    seed: u64,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("offline", &self.provider.is_offline())
            .field("defaults", &self.defaults)
            .field("seed", &self.seed)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CompletionClient {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        defaults: ModelSettings,
        seed: u64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            defaults,
            seed,
            retry,
        }
    }

    /// Build the client from loaded configuration. Without an API key every
    /// call returns an offline placeholder.
    pub fn from_config(config: &Config) -> Self {
        let provider: Arc<dyn CompletionProvider> = match RigProvider::new(config.provider.clone()) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::info!("using offline completions: {e}");
                Arc::new(OfflineProvider)
            }
        };
        Self::new(
            provider,
            config.model_settings(),
            config.provider.seed,
            config.retry,
        )
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_offline()
    }

    /// Complete with the default model settings.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let defaults = self.defaults.clone();
        self.complete_with(&defaults, system, user).await
    }

    /// Complete with explicit settings, retrying transient failures.
    pub async fn complete_with(
        &self,
        settings: &ModelSettings,
        system: &str,
        user: &str,
    ) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            system,
            user,
            model: &settings.model,
            temperature: settings.temperature,
            seed: self.seed,
        };

        let mut attempt = 0;
        loop {
            match self.provider.complete(&request).await {
                Ok(text) => return Ok(text),
                Err(ref e) if self.retry.should_retry(e, attempt) => {
                    let backoff = self.retry.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max = self.retry.max_retries,
                        backoff_secs = backoff.as_secs(),
                        reason = %Transient::classify(e).map_or("transient".to_string(), |t| t.to_string()),
                        "retrying completion"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
