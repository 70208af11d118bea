//! Placeholder provider used when no completion credential is configured.

use async_trait::async_trait;

use super::{CompletionProvider, CompletionRequest, ProviderError};
use crate::constants::ENV_API_KEY;

const SYSTEM_PREVIEW_CHARS: usize = 80;
const USER_PREVIEW_CHARS: usize = 1200;

/// Returns a deterministic dry-run text instead of calling a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

#[async_trait]
impl CompletionProvider for OfflineProvider {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        Ok(placeholder(request.system, request.user))
    }

    fn is_offline(&self) -> bool {
        true
    }
}

/// The dry-run text for a system and user message.
pub fn placeholder(system: &str, user: &str) -> String {
    format!(
        "[DRY-RUN: no completion credential] System={}...\n\
         --- REQ ---\n{}\n\
         --- NOTE ---\n{ENV_API_KEY} is not set, so no model was called.",
        head_chars(system, SYSTEM_PREVIEW_CHARS),
        head_chars(user, USER_PREVIEW_CHARS),
    )
}

fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
