//! Agent System
//!
//! The three phase agents of the research pipeline:
//!
//! - **Literature Review Agent**: reviews the current state of research on a topic
//! - **Experimentation Agent**: designs experiments from the topic and the review
//! - **Report Writing Agent**: writes the final report from everything before it
//!
//! ## Pipeline Overview
//!
//! ```text
//!   Topic
//!     │
//!     ▼
//! ┌─────────────┐
//! │ Literature  │  → LiteratureReview { topic, review }
//! │   Review    │
//! └─────────────┘
//!     │
//!     ▼
//! ┌─────────────┐
//! │ Experiment  │  → ExperimentResults { plan, results }
//! │   Agent     │
//! └─────────────┘
//!     │
//!     ▼
//! ┌─────────────┐
//! │   Report    │  → ResearchReport { input, report }
//! │   Agent     │
//! └─────────────┘
//! ```
//!
//! Every agent sends exactly one user message (instruction template followed by
//! its input) and accepts whatever text comes back. A failed completion call
//! yields empty text with the failure reason recorded on the result.

pub mod literature;
pub mod experiment;
pub mod report;

pub use literature::{LiteratureReview, LiteratureReviewAgent};
pub use experiment::{ExperimentPlan, ExperimentResults, ExperimentationAgent};
pub use report::{ReportInput, ReportWritingAgent, ResearchReport};

use crate::llm::CompletionClient;
use crate::types::{LLMMessage, ModelId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    LiteratureReview,
    Experimentation,
    ReportWriting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::LiteratureReview => write!(f, "literature review"),
            Phase::Experimentation => write!(f, "experimentation"),
            Phase::ReportWriting => write!(f, "report writing"),
        }
    }
}

/// One step of the pipeline: consumes its input, produces a result record.
#[async_trait]
pub trait PhaseAgent: Send + Sync {
    type Input: Send + 'static;
    type Output: PhaseOutput;

    fn phase(&self) -> Phase;

    async fn execute(&self, input: Self::Input) -> Self::Output;
}

/// Uniform view over the phase result records.
pub trait PhaseOutput {
    fn output_text(&self) -> &str;
    fn failure(&self) -> Option<&str>;
}

/// Reply text plus the failure reason when the call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub failure: Option<String>,
}

/// The parts every agent shares: the client, the model fixed at construction,
/// and the instruction template.
#[derive(Clone)]
pub struct AgentCore {
    client: Arc<dyn CompletionClient>,
    model: ModelId,
    template: String,
}

impl AgentCore {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<ModelId>, template: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            template: template.into(),
        }
    }

    /// The single message sent for this phase.
    pub fn build_messages(&self, rendered_input: &str) -> Vec<LLMMessage> {
        vec![LLMMessage::user(format!("{}{}", self.template, rendered_input))]
    }

    pub async fn complete(&self, phase: Phase, rendered_input: &str) -> Completion {
        let messages = self.build_messages(rendered_input);

        match self.client.complete(&self.model, &messages).await {
            Ok(text) => {
                info!(phase = %phase, model = %self.model, response_len = text.len(), "Phase completion received");
                Completion { text, failure: None }
            }
            Err(e) => {
                error!(phase = %phase, model = %self.model, error = %e, "Error getting completion");
                Completion {
                    text: String::new(),
                    failure: Some(e.to_string()),
                }
            }
        }
    }
}

/// Pretty JSON rendering of a phase input, appended to the instruction template.
pub(crate) fn render_input<T: Serialize + std::fmt::Debug>(input: &T) -> String {
    serde_json::to_string_pretty(input).unwrap_or_else(|_| format!("{:?}", input))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::llm::CompletionClient;
    use crate::types::{AppError, AppResult, LLMMessage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A recorded call: the model and messages the client received.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub model: String,
        pub messages: Vec<LLMMessage>,
    }

    /// Replays scripted replies in order and records every call.
    /// `None` in the script simulates a transport failure.
    #[derive(Default)]
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<Option<String>>>,
        fallback: Option<String>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedClient {
        pub fn new(replies: &[Option<&str>]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.map(str::to_string)).collect()),
                fallback: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(replies: &[&str]) -> Self {
            let script: Vec<Option<&str>> = replies.iter().map(|r| Some(*r)).collect();
            Self::new(&script)
        }

        pub fn always(reply: &str) -> Self {
            Self {
                fallback: Some(reply.to_string()),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, model: &str, messages: &[LLMMessage]) -> AppResult<String> {
            self.calls.lock().unwrap().push(RecordedCall {
                model: model.to_string(),
                messages: messages.to_vec(),
            });
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Some(reply)) => Ok(reply),
                Some(None) => Err(AppError::LLMApi("simulated transport error".to_string())),
                None => self
                    .fallback
                    .clone()
                    .ok_or_else(|| AppError::LLMApi("simulated transport error".to_string())),
            }
        }
    }
}
