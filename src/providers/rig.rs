//! rig-core integration for chat completions.
//!
//! Talks to the OpenAI chat completions API, or any OpenAI-compatible
//! endpoint when a base URL is configured.

use async_trait::async_trait;
use rig::client::CompletionClient as _;
use rig::completion::Prompt;
use rig::providers;
use serde_json::json;

use crate::config::ProviderConfig;

use super::{CompletionProvider, CompletionRequest, ProviderError};

/// Maximum tokens per completion response.
const MAX_TOKENS: u64 = 4096;

/// rig-core backed completion provider.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a provider. Fails when no API key is configured.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found. Set {}.",
                crate::constants::ENV_API_KEY
            )));
        }
        Ok(Self { config })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_client(&self) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(self.api_key()?);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }
}

#[async_trait]
impl CompletionProvider for RigProvider {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        let client = self.build_client()?;
        let agent = client
            .agent(request.model)
            .preamble(request.system)
            .temperature(request.temperature)
            .max_tokens(MAX_TOKENS)
            .additional_params(json!({ "seed": request.seed }))
            .build();
        agent
            .prompt(request.user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("OpenAI API error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.map(str::to_string),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn new_provider_missing_api_key() {
        match RigProvider::new(config(None)) {
            Err(e) => assert!(e.to_string().contains("OPENAI_API_KEY"), "got: {e}"),
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_provider_with_api_key() {
        assert!(RigProvider::new(config(Some("sk-test"))).is_ok());
    }

    #[test]
    fn client_builds_with_custom_base_url() {
        let provider = RigProvider::new(ProviderConfig {
            base_url: Some("http://localhost:11434/v1".to_string()),
            ..config(Some("sk-test"))
        })
        .unwrap();
        assert!(provider.build_client().is_ok());
    }
}
