//! Review orchestrator: the three-stage structured review over a diff.
//!
//! ```text
//! NoDiff ─┐
//!         └─ Planner → Reviewer → TestDesigner → Merged
//! ```
//!
//! Stages run strictly in sequence. An empty diff short-circuits to the
//! canonical empty payload without calling the model.

pub mod agents;

use strum::Display;
use thiserror::Error;

use crate::config::Config;
use crate::diff::{filter_diff, normalize_extensions};
use crate::models::ReviewPayload;
use crate::prompt::{PromptBuilder, Role, StageContext, StagePrompt};
use crate::providers::{CompletionClient, ModelSettings, ProviderError};
use crate::response::try_extract_json;

/// Errors from the review pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Provider {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
}

impl PipelineError {
    /// Short name of the error kind, recorded in fallback payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Provider { .. } => "ProviderError",
        }
    }
}

/// Pipeline states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    NoDiff,
    Planner,
    Reviewer,
    TestDesigner,
    Merged,
}

/// Runs the Planner → Reviewer → TestDesigner review over a diff.
pub struct ReviewPipeline {
    client: CompletionClient,
    prompts: PromptBuilder,
    allowed_extensions: Vec<String>,
    planner: ModelSettings,
    reviewer: ModelSettings,
    test_designer: ModelSettings,
}

impl ReviewPipeline {
    pub fn new(client: CompletionClient, config: &Config) -> Self {
        Self {
            client,
            prompts: PromptBuilder::new(config.review.trim_limit),
            allowed_extensions: normalize_extensions(&config.review.allowed_extensions),
            planner: config.settings_for(Role::Planner),
            reviewer: config.settings_for(Role::Reviewer),
            test_designer: config.settings_for(Role::TestDesigner),
        }
    }

    /// Review `diff`, converting any failure into a fallback payload.
    pub async fn review(&self, diff: &str) -> ReviewPayload {
        match self.run(diff).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "review pipeline failed, writing fallback payload");
                ReviewPayload::fallback(e.kind(), e.to_string())
            }
        }
    }

    /// Review `diff`, reporting the first stage failure.
    pub async fn run(&self, diff: &str) -> Result<ReviewPayload, PipelineError> {
        if diff.trim().is_empty() {
            tracing::debug!(stage = %Stage::NoDiff, "empty diff");
            return Ok(ReviewPayload::no_changes("No diff: review skipped."));
        }
        let filtered = filter_diff(diff, &self.allowed_extensions);
        if filtered.trim().is_empty() {
            tracing::debug!(stage = %Stage::NoDiff, "no reviewable files after filtering");
            return Ok(ReviewPayload::no_changes(format!(
                "No files matching {} changed: review skipped.",
                self.allowed_extensions.join(" ")
            )));
        }

        let plan_prompt = self
            .prompts
            .build(Role::Planner, &StageContext::with_diff(&filtered));
        let plan = self.call(Stage::Planner, &self.planner, &plan_prompt).await?;

        let review_prompt = self.prompts.build(
            Role::Reviewer,
            &StageContext {
                diff: Some(&filtered),
                upstream: Some(&plan),
                ..StageContext::default()
            },
        );
        let review_text = self
            .call(Stage::Reviewer, &self.reviewer, &review_prompt)
            .await?;
        let review_json = parse_stage_json(Stage::Reviewer, &review_text);

        // Re-serialise what was parsed; fall back to the raw text when
        // nothing parsed so the next stage still sees the reviewer output.
        let tests_input = if review_json.is_empty() {
            review_text
        } else {
            serde_json::to_string(&review_json).unwrap_or(review_text)
        };
        let tests_prompt = self
            .prompts
            .build(Role::TestDesigner, &StageContext::with_upstream(&tests_input));
        let tests_text = self
            .call(Stage::TestDesigner, &self.test_designer, &tests_prompt)
            .await?;
        let tests_json = parse_stage_json(Stage::TestDesigner, &tests_text);

        tracing::debug!(stage = %Stage::Merged, "merging stage outputs");
        Ok(ReviewPayload::merge(&review_json, &tests_json))
    }

    async fn call(
        &self,
        stage: Stage,
        settings: &ModelSettings,
        prompt: &StagePrompt,
    ) -> Result<String, PipelineError> {
        tracing::debug!(%stage, model = %settings.model, "calling model");
        self.client
            .complete_with(settings, &prompt.system, &prompt.user)
            .await
            .map_err(|source| PipelineError::Provider { stage, source })
    }
}

fn parse_stage_json(stage: Stage, text: &str) -> serde_json::Map<String, serde_json::Value> {
    try_extract_json(text).unwrap_or_else(|e| {
        tracing::debug!(%stage, error = %e, "no JSON object in stage output, using defaults");
        serde_json::Map::new()
    })
}
