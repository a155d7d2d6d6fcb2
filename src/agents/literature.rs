//! Literature Review Agent
//!
//! Asks the model for an analysis of the current state of research on a topic.
//! The topic is appended to the instruction template as plain text.

use super::{AgentCore, Phase, PhaseAgent, PhaseOutput};
use crate::config::PromptTemplates;
use crate::llm::CompletionClient;
use crate::types::ModelId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Result of the literature review phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteratureReview {
    pub topic: String,
    pub review: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PhaseOutput for LiteratureReview {
    fn output_text(&self) -> &str {
        &self.review
    }

    fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

pub struct LiteratureReviewAgent {
    core: AgentCore,
}

impl LiteratureReviewAgent {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<ModelId>) -> Self {
        Self::with_template(client, model, PromptTemplates::default().literature_review)
    }

    pub fn with_template(
        client: Arc<dyn CompletionClient>,
        model: impl Into<ModelId>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            core: AgentCore::new(client, model, template),
        }
    }
}

#[async_trait]
impl PhaseAgent for LiteratureReviewAgent {
    type Input = String;
    type Output = LiteratureReview;

    fn phase(&self) -> Phase {
        Phase::LiteratureReview
    }

    async fn execute(&self, topic: String) -> LiteratureReview {
        info!(topic = %topic, "Starting literature review");
        let completion = self.core.complete(self.phase(), &topic).await;

        LiteratureReview {
            topic,
            review: completion.text,
            failure: completion.failure,
        }
    }
}
