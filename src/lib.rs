// Agent Lab - three-phase LLM research pipeline

pub mod config;
pub mod types;
pub mod models;
pub mod agents;
pub mod llm;
pub mod laboratory;
pub mod history;  // Research history persisted to a JSON file
pub mod export;   // Markdown export of history entries
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use laboratory::Laboratory;
pub use models::{PipelineRun, PipelineStage, ResearchStatus, TaskNotes};
