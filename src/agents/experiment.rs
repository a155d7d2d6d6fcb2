//! Experimentation Agent
//!
//! Designs experiments from a plan holding the topic, the literature review and
//! any task notes. The whole plan is rendered as JSON after the template.

use super::{render_input, AgentCore, LiteratureReview, Phase, PhaseAgent, PhaseOutput};
use crate::config::PromptTemplates;
use crate::llm::CompletionClient;
use crate::models::TaskNotes;
use crate::types::ModelId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input of the experimentation phase. Holding the review by value means an
/// experiment plan cannot exist before the review it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    pub topic: String,
    pub literature_review: LiteratureReview,
    pub task_notes: Option<TaskNotes>,
}

impl ExperimentPlan {
    pub fn new(topic: impl Into<String>, literature_review: LiteratureReview, task_notes: Option<TaskNotes>) -> Self {
        Self {
            topic: topic.into(),
            literature_review,
            task_notes,
        }
    }
}

/// Result of the experimentation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    pub plan: ExperimentPlan,
    pub results: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PhaseOutput for ExperimentResults {
    fn output_text(&self) -> &str {
        &self.results
    }

    fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

pub struct ExperimentationAgent {
    core: AgentCore,
}

impl ExperimentationAgent {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<ModelId>) -> Self {
        Self::with_template(client, model, PromptTemplates::default().experimentation)
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
impl PhaseAgent for ExperimentationAgent {
    type Input = ExperimentPlan;
    type Output = ExperimentResults;

    fn phase(&self) -> Phase {
        Phase::Experimentation
    }

    async fn execute(&self, plan: ExperimentPlan) -> ExperimentResults {
        info!(topic = %plan.topic, "Planning and executing experiments");
        let rendered = render_input(&plan);
        let completion = self.core.complete(self.phase(), &rendered).await;

        ExperimentResults {
            plan,
            results: completion.text,
            failure: completion.failure,
        }
    }
}
