// Markdown export of a research entry

use crate::history::ResearchEntry;
use crate::types::AppResult;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

const TOPIC_CHARS_IN_FILENAME: usize = 30;

pub fn render_markdown(entry: &ResearchEntry) -> String {
    let mut content = format!("# Research #{}: {}\n\n", entry.id, entry.topic);
    content.push_str(&format!("Date: {}\n\n", entry.date));
    content.push_str(&format!("Focus Areas: {}\n\n", entry.focus_areas.join(", ")));
    content.push_str(&format!("AI Model: {}\n\n", entry.model_name));
    content.push_str("## Research Results\n\n");
    content.push_str(&entry.final_report);
    content
}

/// `research_{id}_{topic prefix}.md`, with path separators in the topic replaced.
pub fn export_filename(entry: &ResearchEntry) -> String {
    let topic: String = entry
        .topic
        .chars()
        .take(TOPIC_CHARS_IN_FILENAME)
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("research_{}_{}.md", entry.id, topic)
}

/// Write the Markdown export into `dir` and return the file path.
pub async fn export_entry(entry: &ResearchEntry, dir: &Path) -> AppResult<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(export_filename(entry));
    fs::write(&path, render_markdown(entry)).await?;
    info!(id = entry.id, path = ?path, "Exported research");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(topic: &str) -> ResearchEntry {
        ResearchEntry {
            id: 7,
            topic: topic.to_string(),
            focus_areas: vec!["spatial".to_string(), "temporal".to_string()],
            date: "2024-03-01 12:30:00".to_string(),
            final_report: "REPORT BODY".to_string(),
            model_name: "o1-preview".to_string(),
            failed_phases: vec![],
        }
    }

    #[test]
    fn test_render_markdown_layout() {
        let markdown = render_markdown(&entry("traffic"));
        assert_eq!(
            markdown,
            "# Research #7: traffic\n\n\
             Date: 2024-03-01 12:30:00\n\n\
             Focus Areas: spatial, temporal\n\n\
             AI Model: o1-preview\n\n\
             ## Research Results\n\n\
             REPORT BODY"
        );
    }

    #[test]
    fn test_filename_truncates_topic_by_characters() {
        let name = export_filename(&entry("graph neural networks for traffic prediction"));
        assert_eq!(name, "research_7_graph neural networks for traf.md");

        let name = export_filename(&entry("réseaux de neurones sur graphes appliqués"));
        assert_eq!(name, "research_7_réseaux de neurones sur graphe.md");
    }

    #[test]
    fn test_filename_replaces_path_separators() {
        assert_eq!(export_filename(&entry("a/b\\c")), "research_7_a_b_c.md");
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = export_entry(&entry("traffic"), temp_dir.path()).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "research_7_traffic.md");
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("REPORT BODY"));
    }
}
