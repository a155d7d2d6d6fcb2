use crate::agents::{ExperimentResults, LiteratureReview, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied hints threaded unchanged into the experimentation and
/// report-writing phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskNotes {
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_preferences: Option<ExperimentPreferences>,
    /// Any other free-form hints.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TaskNotes {
    /// Build notes from comma-separated focus areas with the default
    /// experiment preferences.
    pub fn from_focus_areas(focus_areas: &str) -> Self {
        Self {
            focus_areas: split_focus_areas(focus_areas),
            experiment_preferences: Some(ExperimentPreferences::default()),
            extra: BTreeMap::new(),
        }
    }
}

/// Split "a, b ,c" into ["a", "b", "c"]. Every segment is kept, including
/// empty ones, so the list lines up with what the user typed.
pub fn split_focus_areas(raw: &str) -> Vec<String> {
    raw.split(',').map(|area| area.trim().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentPreferences {
    pub dataset_size: String,
    pub model_complexity: String,
    pub evaluation_metrics: Vec<String>,
}

impl Default for ExperimentPreferences {
    fn default() -> Self {
        Self {
            dataset_size: "small".to_string(),
            model_complexity: "medium".to_string(),
            evaluation_metrics: vec!["accuracy".to_string(), "perplexity".to_string()],
        }
    }
}

/// Aggregate record of one complete three-phase execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: uuid::Uuid,
    pub topic: String,
    pub literature_review: LiteratureReview,
    pub experiment_results: ExperimentResults,
    pub final_report: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_failure: Option<String>,
    pub model_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PipelineRun {
    /// Phases whose completion call failed and were filled with empty text.
    pub fn failed_phases(&self) -> Vec<Phase> {
        let mut failed = Vec::new();
        if self.literature_review.failure.is_some() {
            failed.push(Phase::LiteratureReview);
        }
        if self.experiment_results.failure.is_some() {
            failed.push(Phase::Experimentation);
        }
        if self.report_failure.is_some() {
            failed.push(Phase::ReportWriting);
        }
        failed
    }

    pub fn is_degraded(&self) -> bool {
        !self.failed_phases().is_empty()
    }
}

/// Which phases have produced a result. A phase counts as complete once its
/// result is stored, even when the text is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResearchStatus {
    pub literature_review_complete: bool,
    pub experiments_complete: bool,
    pub report_complete: bool,
}

/// Linear pipeline state: Start -> LiteratureDone -> ExperimentsDone -> ReportDone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PipelineStage {
    #[default]
    Start,
    LiteratureDone,
    ExperimentsDone,
    ReportDone,
}

impl PipelineStage {
    pub fn from_status(status: &ResearchStatus) -> Self {
        match (
            status.literature_review_complete,
            status.experiments_complete,
            status.report_complete,
        ) {
            (true, true, true) => PipelineStage::ReportDone,
            (true, true, false) => PipelineStage::ExperimentsDone,
            (true, false, _) => PipelineStage::LiteratureDone,
            _ => PipelineStage::Start,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::ReportDone)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Start => write!(f, "start"),
            PipelineStage::LiteratureDone => write!(f, "literature review done"),
            PipelineStage::ExperimentsDone => write!(f, "experiments done"),
            PipelineStage::ReportDone => write!(f, "report done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_focus_areas_trims() {
        assert_eq!(
            split_focus_areas(" spatial modelling,temporal  , datasets"),
            vec!["spatial modelling", "temporal", "datasets"]
        );
        assert_eq!(split_focus_areas("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_task_notes_defaults() {
        let notes = TaskNotes::from_focus_areas("graphs, traffic");
        assert_eq!(notes.focus_areas, vec!["graphs", "traffic"]);
        let prefs = notes.experiment_preferences.unwrap();
        assert_eq!(prefs.dataset_size, "small");
        assert_eq!(prefs.model_complexity, "medium");
        assert_eq!(prefs.evaluation_metrics, vec!["accuracy", "perplexity"]);
    }

    #[test]
    fn test_task_notes_keep_extra_hints() {
        let notes: TaskNotes = serde_json::from_value(serde_json::json!({
            "focus_areas": ["x"],
            "deadline": "friday"
        }))
        .unwrap();
        assert_eq!(notes.extra.get("deadline"), Some(&serde_json::json!("friday")));
        assert!(notes.experiment_preferences.is_none());
    }

    #[test]
    fn test_stage_from_status() {
        let mut status = ResearchStatus::default();
        assert_eq!(PipelineStage::from_status(&status), PipelineStage::Start);
        status.literature_review_complete = true;
        assert_eq!(PipelineStage::from_status(&status), PipelineStage::LiteratureDone);
        status.experiments_complete = true;
        assert_eq!(PipelineStage::from_status(&status), PipelineStage::ExperimentsDone);
        status.report_complete = true;
        let stage = PipelineStage::from_status(&status);
        assert_eq!(stage, PipelineStage::ReportDone);
        assert!(stage.is_terminal());
    }
}
