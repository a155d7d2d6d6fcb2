//! Research History Storage
//!
//! Keeps the list of past research runs in a single JSON file. The whole file
//! is rewritten on every new entry; concurrent writers are not coordinated.

use crate::agents::Phase;
use crate::models::PipelineRun;
use crate::types::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Summary of one finished research run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchEntry {
    pub id: u64,
    pub topic: String,
    pub focus_areas: Vec<String>,
    pub date: String,
    pub final_report: String,
    #[serde(default = "unknown_model")]
    pub model_name: String,
    /// Phases whose completion call failed and were saved as empty text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_phases: Vec<Phase>,
}

fn unknown_model() -> String {
    "Unknown".to_string()
}

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<ResearchEntry>,
}

impl HistoryStore {
    /// Load history from `path`. A missing, unreadable or corrupt file is
    /// treated as empty history.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Vec<ResearchEntry>>(&content) {
                Ok(entries) => {
                    info!(count = entries.len(), path = ?path, "Loaded research history");
                    entries
                }
                Err(e) => {
                    warn!(error = %e, path = ?path, "Ignoring unreadable research history");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = ?path, "No research history found");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, path = ?path, "Failed to read research history");
                Vec::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ResearchEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> AppResult<&ResearchEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound(format!("research #{}", id)))
    }

    /// Record a finished run and rewrite the history file.
    pub async fn append(&mut self, focus_areas: Vec<String>, run: &PipelineRun) -> AppResult<&ResearchEntry> {
        let entry = ResearchEntry {
            id: self.entries.len() as u64 + 1,
            topic: run.topic.clone(),
            focus_areas,
            date: chrono::Local::now().format(DATE_FORMAT).to_string(),
            final_report: run.final_report.clone(),
            model_name: run.model_name.clone(),
            failed_phases: run.failed_phases(),
        };

        self.entries.push(entry);
        self.save().await?;

        let entry = &self.entries[self.entries.len() - 1];
        info!(id = entry.id, topic = %entry.topic, "Saved research entry");
        Ok(entry)
    }

    async fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{ExperimentPlan, ExperimentResults, LiteratureReview};
    use chrono::Utc;
    use tempfile::TempDir;

    fn run(topic: &str, report: &str) -> PipelineRun {
        let review = LiteratureReview {
            topic: topic.to_string(),
            review: "REVIEW".to_string(),
            failure: None,
        };
        PipelineRun {
            run_id: uuid::Uuid::new_v4(),
            topic: topic.to_string(),
            literature_review: review.clone(),
            experiment_results: ExperimentResults {
                plan: ExperimentPlan::new(topic, review, None),
                results: "EXPERIMENTS".to_string(),
                failure: None,
            },
            final_report: report.to_string(),
            report_failure: None,
            model_name: "o1-preview".to_string(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = HistoryStore::load(temp_dir.path().join("research_results.json")).await;
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_history() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("research_results.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = HistoryStore::load(&path).await;
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_append_assigns_sequential_ids_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history").join("research_results.json");

        let mut store = HistoryStore::load(&path).await;
        let first = store
            .append(vec!["a".to_string()], &run("first topic", "REPORT 1"))
            .await
            .unwrap()
            .clone();
        let second = store
            .append(vec!["b".to_string(), "c".to_string()], &run("second topic", "REPORT 2"))
            .await
            .unwrap()
            .clone();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.model_name, "o1-preview");
        assert!(chrono::NaiveDateTime::parse_from_str(&second.date, DATE_FORMAT).is_ok());

        let reloaded = HistoryStore::load(&path).await;
        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(reloaded.get(2).unwrap().final_report, "REPORT 2");
        assert!(matches!(reloaded.get(3), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_entries_without_model_name_default_to_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("research_results.json");
        std::fs::write(
            &path,
            r#"[{"id":1,"topic":"t","focus_areas":["x"],"date":"2024-01-01 10:00:00","final_report":"r"}]"#,
        )
        .unwrap();

        let store = HistoryStore::load(&path).await;
        assert_eq!(store.get(1).unwrap().model_name, "Unknown");
        assert!(store.get(1).unwrap().failed_phases.is_empty());
    }

    #[tokio::test]
    async fn test_append_records_failed_phases() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("research_results.json");

        let mut degraded = run("t", "");
        degraded.experiment_results.results = String::new();
        degraded.experiment_results.failure = Some("request timed out".to_string());
        degraded.report_failure = Some("request timed out".to_string());

        let mut store = HistoryStore::load(&path).await;
        store.append(vec![], &degraded).await.unwrap();
        store.append(vec![], &run("healthy", "r")).await.unwrap();

        let reloaded = HistoryStore::load(store.path()).await;
        assert_eq!(
            reloaded.get(1).unwrap().failed_phases,
            vec![Phase::Experimentation, Phase::ReportWriting]
        );
        assert!(reloaded.get(2).unwrap().failed_phases.is_empty());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("failed_phases").count(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail.
        let path = temp_dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let mut store = HistoryStore::load(&path).await;
        let result = store.append(vec![], &run("t", "r")).await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
