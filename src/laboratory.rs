//! Research pipeline orchestrator
//!
//! Runs the literature review, experimentation and report-writing agents in a
//! fixed order, feeding each phase's result into the next.

use crate::agents::{
    ExperimentPlan, ExperimentResults, ExperimentationAgent, LiteratureReview, LiteratureReviewAgent,
    Phase, PhaseAgent, PhaseOutput, ReportInput, ReportWritingAgent, ResearchReport,
};
use crate::config::{Config, FailurePolicy, PipelineConfig};
use crate::llm::{CompletionClient, LLM};
use crate::models::{PipelineRun, PipelineStage, ResearchStatus, TaskNotes};
use crate::types::{AppError, AppResult, ModelId};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

type StageObserver = Box<dyn Fn(PipelineStage) + Send + Sync>;

pub struct Laboratory {
    model: ModelId,
    failure_policy: FailurePolicy,

    literature_agent: LiteratureReviewAgent,
    experiment_agent: ExperimentationAgent,
    report_agent: ReportWritingAgent,

    research_review: Option<LiteratureReview>,
    experiment_results: Option<ExperimentResults>,
    final_report: Option<ResearchReport>,

    observer: Option<StageObserver>,
}

impl Laboratory {
    /// Build a laboratory talking to the configured provider. The credential is
    /// taken from `config.llm` and owned by this instance's client.
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Arc::new(LLM::new(&config.llm)?);
        Ok(Self::with_client(client, config.llm.model.clone(), &config.pipeline))
    }

    pub fn with_client(
        client: Arc<dyn CompletionClient>,
        model: impl Into<ModelId>,
        pipeline: &PipelineConfig,
    ) -> Self {
        let model = model.into();
        let templates = &pipeline.templates;

        Self {
            literature_agent: LiteratureReviewAgent::with_template(
                client.clone(),
                model.clone(),
                templates.literature_review.clone(),
            ),
            experiment_agent: ExperimentationAgent::with_template(
                client.clone(),
                model.clone(),
                templates.experimentation.clone(),
            ),
            report_agent: ReportWritingAgent::with_template(client, model.clone(), templates.report_writing.clone()),
            model,
            failure_policy: pipeline.failure_policy,
            research_review: None,
            experiment_results: None,
            final_report: None,
            observer: None,
        }
    }

    /// Receive every stage transition of subsequent runs.
    pub fn on_stage<F>(mut self, observer: F) -> Self
    where
        F: Fn(PipelineStage) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Execute the complete research workflow.
    pub async fn conduct_research(&mut self, topic: &str, task_notes: Option<TaskNotes>) -> AppResult<PipelineRun> {
        let run_id = uuid::Uuid::new_v4();
        let started_at = Utc::now();
        info!(run_id = %run_id, topic = %topic, model = %self.model, "Starting research");

        self.reset();

        // Phase 1: Literature Review
        let review = self.literature_agent.execute(topic.to_string()).await;
        self.check(Phase::LiteratureReview, &review)?;
        self.research_review = Some(review.clone());
        self.notify();

        // Phase 2: Experimentation
        let plan = ExperimentPlan::new(topic, review.clone(), task_notes.clone());
        let results = self.experiment_agent.execute(plan).await;
        self.check(Phase::Experimentation, &results)?;
        self.experiment_results = Some(results.clone());
        self.notify();

        // Phase 3: Report Writing
        let report = self
            .report_agent
            .execute(ReportInput {
                topic: topic.to_string(),
                literature_review: review.clone(),
                experiment_results: results.clone(),
                task_notes,
            })
            .await;
        self.check(Phase::ReportWriting, &report)?;
        let report_failure = report.failure.clone();
        let final_report = report.report.clone();
        self.final_report = Some(report);
        self.notify();

        let run = PipelineRun {
            run_id,
            topic: topic.to_string(),
            literature_review: review,
            experiment_results: results,
            final_report,
            report_failure,
            model_name: self.model.clone(),
            started_at,
            completed_at: Utc::now(),
        };

        if run.is_degraded() {
            warn!(run_id = %run_id, failed_phases = ?run.failed_phases(), "Research finished with empty phases");
        } else {
            info!(run_id = %run_id, report_len = run.final_report.len(), "Research complete");
        }

        Ok(run)
    }

    /// Current status of research phases.
    pub fn research_status(&self) -> ResearchStatus {
        ResearchStatus {
            literature_review_complete: self.research_review.is_some(),
            experiments_complete: self.experiment_results.is_some(),
            report_complete: self.final_report.is_some(),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        PipelineStage::from_status(&self.research_status())
    }

    pub fn literature_review(&self) -> Option<&LiteratureReview> {
        self.research_review.as_ref()
    }

    pub fn experiment_results(&self) -> Option<&ExperimentResults> {
        self.experiment_results.as_ref()
    }

    pub fn final_report(&self) -> Option<&ResearchReport> {
        self.final_report.as_ref()
    }

    fn reset(&mut self) {
        self.research_review = None;
        self.experiment_results = None;
        self.final_report = None;
        self.notify();
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(self.stage());
        }
    }

    // Under the abort policy a failed phase stops the run before its result is stored.
    fn check<O: PhaseOutput>(&self, phase: Phase, output: &O) -> AppResult<()> {
        match (self.failure_policy, output.failure()) {
            (FailurePolicy::Abort, Some(reason)) => Err(AppError::PhaseFailed {
                phase: phase.to_string(),
                reason: reason.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
