//! Report Writing Agent
//!
//! Final step in the pipeline. Writes the research report from the topic, the
//! literature review, the experiment results and any task notes.

use super::{render_input, AgentCore, ExperimentResults, LiteratureReview, Phase, PhaseAgent, PhaseOutput};
use crate::config::PromptTemplates;
use crate::llm::CompletionClient;
use crate::models::TaskNotes;
use crate::types::ModelId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input of the report-writing phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInput {
    pub topic: String,
    pub literature_review: LiteratureReview,
    pub experiment_results: ExperimentResults,
    pub task_notes: Option<TaskNotes>,
}

/// Result of the report-writing phase. Same `{input, output}` shape as the
/// other phases; the pipeline run exposes only `report` as its final text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub input: ReportInput,
    pub report: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ResearchReport {
    pub fn into_text(self) -> String {
        self.report
    }
}

impl PhaseOutput for ResearchReport {
    fn output_text(&self) -> &str {
        &self.report
    }

    fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

pub struct ReportWritingAgent {
    core: AgentCore,
}

impl ReportWritingAgent {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<ModelId>) -> Self {
        Self::with_template(client, model, PromptTemplates::default().report_writing)
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
impl PhaseAgent for ReportWritingAgent {
    type Input = ReportInput;
    type Output = ResearchReport;

    fn phase(&self) -> Phase {
        Phase::ReportWriting
    }

    async fn execute(&self, input: ReportInput) -> ResearchReport {
        info!(topic = %input.topic, "Generating research report");
        let rendered = render_input(&input);
        let completion = self.core.complete(self.phase(), &rendered).await;

        ResearchReport {
            input,
            report: completion.text,
            failure: completion.failure,
        }
    }
}
